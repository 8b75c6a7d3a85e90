use shipwright_http::RequestDescriptor;

use crate::error::{ReleaseError, Result};

pub const USERNAME_ENV: &str = "RELEASE_SERVER_USERNAME";
pub const PASSWORD_ENV: &str = "RELEASE_SERVER_PASSWORD";

/// Where the release server lives and how to log in.
///
/// `url` is either a bare host (`releases.example.com`) or a full
/// `https://host:port` address.
#[derive(Debug, Clone, Default)]
pub struct ReleaseServerOptions {
    pub url:      String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Username and password after environment fallback.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<skipped>")
            .finish()
    }
}

impl ReleaseServerOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Resolve credentials, falling back to the process environment.
    pub fn credentials(&self) -> Result<Credentials> { self.credentials_with(|name| std::env::var(name).ok()) }

    /// Resolve credentials with a custom variable lookup. Blank values count
    /// as unset.
    pub fn credentials_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        let username = non_blank(self.username.clone())
            .or_else(|| non_blank(lookup(USERNAME_ENV)))
            .ok_or(ReleaseError::MissingCredential {
                field:    "username",
                variable: USERNAME_ENV,
            })?;
        let password = non_blank(self.password.clone())
            .or_else(|| non_blank(lookup(PASSWORD_ENV)))
            .ok_or(ReleaseError::MissingCredential {
                field:    "password",
                variable: PASSWORD_ENV,
            })?;
        Ok(Credentials { username, password })
    }

    /// Descriptor for an API path on this server.
    pub fn endpoint(&self, path: &str) -> Result<RequestDescriptor> {
        if self.url.contains("://") {
            let base = RequestDescriptor::parse(&self.url)
                .map_err(|err| ReleaseError::InvalidServer(err.into()))?;
            Ok(base.with_path(path))
        } else {
            Ok(RequestDescriptor::new(self.url.trim_end_matches('/'), path))
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> { value.filter(|v| !v.trim().is_empty()) }
