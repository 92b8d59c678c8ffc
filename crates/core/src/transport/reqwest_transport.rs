//! `reqwest` transport with a shared cookie jar.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;
use reqwest::{header, Client, Url};
use tracing::debug;

use crate::metrics::REQUEST_DURATION;

use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};

/// HTTP transport backed by two `reqwest` clients sharing one cookie jar.
///
/// reqwest fixes the redirect policy per client, so one client follows
/// redirects and the other never does.
pub struct ReqwestTransport {
    client: Client,
    no_redirect_client: Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    /// Create a new transport with the given per-request timeout and User-Agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        let no_redirect_client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .cookie_provider(Arc::clone(&jar))
            .redirect(Policy::none())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            no_redirect_client,
            jar,
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

/// Find `name` in a `Cookie` header value ("a=1; b=2").
fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = if request.follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        };

        let mut builder = match request.method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(method = request.method.as_str(), url = %request.url, "Sending request");
        let start = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                REQUEST_DURATION
                    .with_label_values(&[request.method.as_str(), "error"])
                    .observe(start.elapsed().as_secs_f64());
                return Err(map_reqwest_error(e));
            }
        };

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        REQUEST_DURATION
            .with_label_values(&[request.method.as_str(), &status.to_string()])
            .observe(start.elapsed().as_secs_f64());
        debug!(
            url = %request.url,
            status = status,
            bytes = body.len(),
            "Received response"
        );

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }

    fn cookie(&self, url: &str, name: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let header = self.jar.cookies(&url)?;
        find_cookie(header.to_str().ok()?, name)
    }
}
