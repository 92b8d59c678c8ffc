//! Transport session with optional catalogue login.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::transport::{HttpRequest, Transport};

use super::ProviderError;

const LOGIN_PATH: &str = "subscenter/accounts/login/";
const LOGOUT_PATH: &str = "subscenter/accounts/logout/";
const CSRF_COOKIE: &str = "csrftoken";

/// Account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both halves or neither; anything else is a configuration error.
    pub fn from_parts(
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Option<Self>, ProviderError> {
        match (username, password) {
            (Some(username), Some(password)) => Ok(Some(Self {
                username: username.to_string(),
                password: password.to_string(),
            })),
            (None, None) => Ok(None),
            _ => Err(ProviderError::Configuration(
                "username and password must be specified together".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An open transport session.
///
/// Close it with [`Session::close`] to log out; dropping a logged-in session
/// leaves the remote session open.
pub struct Session {
    transport: Arc<dyn Transport>,
    base_url: String,
    logged_in_as: Option<String>,
}

impl Session {
    /// Open a session, logging in when credentials are given.
    ///
    /// Login fetches the login page for its CSRF cookie, then posts the
    /// credentials without following redirects. Only a 302 counts as success.
    pub async fn open(
        transport: Arc<dyn Transport>,
        base_url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Self, ProviderError> {
        let mut session = Self {
            transport,
            base_url: base_url.to_string(),
            logged_in_as: None,
        };

        if let Some(credentials) = credentials {
            session.login(credentials).await?;
        }

        Ok(session)
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<(), ProviderError> {
        debug!(username = %credentials.username, "Logging in");
        let url = format!("{}{}", self.base_url, LOGIN_PATH);

        self.transport
            .send(HttpRequest::get(&url))
            .await?
            .error_for_status(&url)?;
        let csrf_token = self
            .transport
            .cookie(&url, CSRF_COOKIE)
            .ok_or_else(|| ProviderError::Authentication(credentials.username.clone()))?;

        let request = HttpRequest::post(&url)
            .form("username", credentials.username.as_str())
            .form("password", credentials.password.as_str())
            .form("csrfmiddlewaretoken", csrf_token)
            .without_redirects();
        let response = self.transport.send(request).await?;

        if response.status != 302 {
            warn!(status = response.status, "Login rejected");
            return Err(ProviderError::Authentication(credentials.username.clone()));
        }

        info!(username = %credentials.username, "Logged in");
        self.logged_in_as = Some(credentials.username.clone());
        Ok(())
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in_as.is_some()
    }

    /// Log out if logged in, then release the session.
    pub async fn close(mut self) -> Result<(), ProviderError> {
        if let Some(username) = self.logged_in_as.take() {
            info!(username = %username, "Logging out");
            let url = format!("{}{}", self.base_url, LOGOUT_PATH);
            self.transport
                .send(HttpRequest::get(&url))
                .await?
                .error_for_status(&url)?;
            info!("Logged out");
        }
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("logged_in_as", &self.logged_in_as)
            .finish()
    }
}
