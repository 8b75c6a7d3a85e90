use serde::Serialize;
use serde_json::Value;

use crate::data::{ExecutorConfig, Headers, Method, Protocol, RequestDescriptor};
use crate::error::Result;

/// Apply the executor's defaults to a descriptor.
///
/// In order: the method (if given) is set; an `Authorization` header is added
/// for `token`; `User-Agent` is filled in when missing; `Cache-Control:
/// no-cache` is set for plain GETs or when absent; and the protocol is forced
/// to `https` when the config requires it and none is set.
pub fn configure_request(
    descriptor: &RequestDescriptor,
    token: Option<&str>,
    method: Option<Method>,
    config: &ExecutorConfig,
) -> RequestDescriptor {
    let mut configured = descriptor.clone();

    if let Some(method) = method {
        configured = configured.with_method(method);
    }

    if let Some(token) = token {
        configured = configured.with_header("Authorization", authorization_value(token));
    }

    if !configured.headers().contains("User-Agent") {
        configured = configured.with_header("User-Agent", config.user_agent.as_str());
    }

    if method.is_none_or(|m| m == Method::Get) || !configured.headers().contains("Cache-Control") {
        configured = configured.with_header("Cache-Control", "no-cache");
    }

    if config.require_secure_protocol && configured.protocol().is_none() {
        configured = configured.with_protocol(Protocol::Https);
    }

    configured
}

/// `Basic` credentials pass through untouched; anything else is sent as
/// `token <value>`.
pub fn authorization_value(token: &str) -> String {
    if token.starts_with("Basic") {
        token.to_string()
    } else {
        format!("token {token}")
    }
}

/// Encode `payload` as the JSON body of a POST.
///
/// Content-Type and Content-Length are derived from the encoded bytes and
/// override whatever the descriptor carried.
pub fn with_json_payload<P: Serialize + ?Sized>(
    descriptor: &RequestDescriptor,
    payload: &P,
) -> Result<(RequestDescriptor, Vec<u8>)> {
    let body = serde_json::to_vec(payload)?;
    let descriptor = descriptor
        .clone()
        .with_method(Method::Post)
        .with_header("Content-Type", "application/json")
        .with_header("Content-Length", body.len().to_string());
    Ok((descriptor, body))
}

/// Pretty JSON rendering of a descriptor for debug logs. The authorization
/// value is replaced by `<skipped>`.
pub fn dump_request(descriptor: &RequestDescriptor) -> String {
    let mut value = match serde_json::to_value(descriptor) {
        Ok(value) => value,
        Err(err) => return format!("<unserializable request: {err}>"),
    };

    if let Some(Value::Object(headers)) = value.get_mut("headers") {
        for (name, header) in headers.iter_mut() {
            if name.eq_ignore_ascii_case("authorization") {
                *header = Value::String("<skipped>".to_string());
            }
        }
    }

    serde_json::to_string_pretty(&value).unwrap_or_default()
}

/// Render response headers for debug logs.
pub fn dump_headers(headers: &Headers) -> String { serde_json::to_string_pretty(headers).unwrap_or_default() }
