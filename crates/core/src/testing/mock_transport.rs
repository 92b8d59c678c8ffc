//! Mock HTTP transport for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

type Route = (Method, String);

/// Mock implementation of the Transport trait.
///
/// Responses are routed by method and URL (without query string). Each route
/// holds a queue; the last queued outcome keeps being returned once the
/// others are consumed. Unrouted requests answer 404.
///
/// # Example
///
/// ```rust,ignore
/// use subscout_core::testing::MockTransport;
/// use subscout_core::transport::HttpResponse;
///
/// let transport = MockTransport::new();
/// transport
///     .on_get("http://example.com/he/subtitle/search/", HttpResponse::redirect("/he/subtitle/series/lost/"))
///     .await;
///
/// // ... exercise the provider ...
///
/// let requests = transport.recorded_requests().await;
/// assert_eq!(requests[0].query_param("q"), Some("Lost"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<RwLock<HashMap<Route, VecDeque<Result<HttpResponse, TransportError>>>>>,
    requests: Arc<RwLock<Vec<HttpRequest>>>,
    /// Cookies are read synchronously through `Transport::cookie`.
    cookies: Arc<std::sync::RwLock<HashMap<String, String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for `method url`.
    pub async fn on(
        &self,
        method: Method,
        url: &str,
        outcome: Result<HttpResponse, TransportError>,
    ) {
        self.routes
            .write()
            .await
            .entry((method, url.to_string()))
            .or_default()
            .push_back(outcome);
    }

    /// Queue a response for `GET url`.
    pub async fn on_get(&self, url: &str, response: HttpResponse) {
        self.on(Method::Get, url, Ok(response)).await;
    }

    /// Queue a response for `POST url`.
    pub async fn on_post(&self, url: &str, response: HttpResponse) {
        self.on(Method::Post, url, Ok(response)).await;
    }

    /// Make `GET url` fail with a transport error.
    pub async fn fail_get(&self, url: &str, error: TransportError) {
        self.on(Method::Get, url, Err(error)).await;
    }

    /// Set a session cookie visible to every URL.
    pub fn set_cookie(&self, name: &str, value: &str) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.insert(name.to_string(), value.to_string());
        }
    }

    /// Get every request sent so far, in order.
    pub async fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of requests sent.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Requests sent to `url`, in order.
    pub async fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let route = (request.method, request.url.clone());
        self.requests.write().await.push(request);

        let mut routes = self.routes.write().await;
        match routes.get_mut(&route) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, ""))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, ""))),
            None => Ok(HttpResponse::new(404, "")),
        }
    }

    fn cookie(&self, _url: &str, name: &str) -> Option<String> {
        self.cookies.read().ok()?.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_routes_queue_and_sticky_last() {
        let transport = MockTransport::new();
        transport.on_get("http://x/a/", HttpResponse::ok("one")).await;
        transport.on_get("http://x/a/", HttpResponse::ok("two")).await;

        for expected in ["one", "two", "two"] {
            let response = transport.send(HttpRequest::get("http://x/a/")).await.unwrap();
            assert_eq!(response.text(), expected);
        }
        assert_eq!(transport.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_unrouted_is_404() {
        let transport = MockTransport::new();
        let response = transport.send(HttpRequest::post("http://x/")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_cookies() {
        let transport = MockTransport::new();
        assert_eq!(transport.cookie("http://x/", "csrftoken"), None);
        transport.set_cookie("csrftoken", "abc");
        assert_eq!(transport.cookie("http://x/", "csrftoken"), Some("abc".to_string()));
    }
}
