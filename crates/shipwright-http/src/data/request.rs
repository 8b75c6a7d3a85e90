use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use super::headers::Headers;
use crate::error::{Error, Result};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// URL scheme of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
        }
    }

    /// Parse a protocol from a URL scheme.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "http" => Some(Protocol::Http),
            "https" => Some(Protocol::Https),
            _ => None,
        }
    }
}

/// Immutable description of a request target.
///
/// Every adjustment returns a new descriptor, so one descriptor can be shared
/// between concurrent requests without aliasing surprises.
///
/// When no protocol is set the request goes out over `https`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    protocol: Option<Protocol>,
    hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    port:     Option<u16>,
    path:     String,
    method:   Method,
    headers:  Headers,
}

impl RequestDescriptor {
    pub fn new(hostname: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            protocol: None,
            hostname: hostname.into(),
            port:     None,
            path:     normalize_path(path.into()),
            method:   Method::Get,
            headers:  Headers::new(),
        }
    }

    /// Build a descriptor from an absolute `http`/`https` URL.
    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        Self::from_url(&url)
    }

    pub fn from_url(url: &Url) -> Result<Self> {
        let protocol = Protocol::from_scheme(url.scheme())
            .ok_or_else(|| Error::UnsupportedProtocol(url.scheme().to_string()))?;
        let hostname = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(url::ParseError::EmptyHost))?;

        Ok(Self {
            protocol: Some(protocol),
            hostname: hostname.to_string(),
            port:     url.port(),
            path:     path_and_query(url),
            method:   Method::Get,
            headers:  Headers::new(),
        })
    }

    pub fn protocol(&self) -> Option<Protocol> { self.protocol }

    /// Protocol the request is actually sent with.
    pub fn effective_protocol(&self) -> Protocol { self.protocol.unwrap_or(Protocol::Https) }

    pub fn hostname(&self) -> &str { &self.hostname }

    pub fn port(&self) -> Option<u16> { self.port }

    /// Path including the query string.
    pub fn path(&self) -> &str { &self.path }

    /// Path without the query string.
    pub fn pathname(&self) -> &str { self.path.split(['?', '#']).next().unwrap_or_default() }

    pub fn method(&self) -> Method { self.method }

    pub fn headers(&self) -> &Headers { &self.headers }

    /// Render the target as an absolute URL.
    pub fn to_url(&self) -> String {
        let protocol = self.effective_protocol();
        match self.port {
            Some(port) if port != protocol.default_port() => {
                format!("{}://{}:{}{}", protocol.as_str(), self.hostname, port, self.path)
            }
            _ => format!("{}://{}{}", protocol.as_str(), self.hostname, self.path),
        }
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = normalize_path(path.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: &Headers) -> Self {
        self.headers = self.headers.merged(headers);
        self
    }

    /// Follow a `Location` header: the new URL, resolved against the current
    /// one, replaces protocol, host, port and path. Method and headers carry
    /// over.
    pub fn redirect_to(&self, location: &str) -> Result<Self> {
        let target = self.resolve(location)?;
        let next = Self::from_url(&target)?;
        Ok(Self {
            method: self.method,
            headers: self.headers.clone(),
            ..next
        })
    }

    /// Like [`RequestDescriptor::redirect_to`] but only host, port and path
    /// move; the protocol stays as it was.
    pub fn redirect_keeping_protocol(&self, location: &str) -> Result<Self> {
        let target = self.resolve(location)?;
        let next = Self::from_url(&target)?;
        Ok(Self {
            protocol: self.protocol,
            method: self.method,
            headers: self.headers.clone(),
            ..next
        })
    }

    fn resolve(&self, location: &str) -> Result<Url> {
        let base = Url::parse(&self.to_url())?;
        Ok(base.join(location)?)
    }
}

fn normalize_path(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Body sent with a request.
///
/// Bodies are cheap to clone so a request can be re-sent after a redirect;
/// file bodies are reopened for every attempt.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Bytes(Bytes),
    File { path: PathBuf, len: u64 },
}

impl RequestBody {
    /// Body length, when it is known up front.
    pub fn len(&self) -> u64 {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(bytes) => bytes.len() as u64,
            RequestBody::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Stream a file from disk, reading its length from metadata.
    pub async fn file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let len = tokio::fs::metadata(&path).await?.len();
        Ok(RequestBody::File { path, len })
    }
}
