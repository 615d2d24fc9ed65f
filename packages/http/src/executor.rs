//! Request execution behind a trait so the remote proxy can run against a
//! scripted executor in tests.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::types::{HttpRequest, HttpResponse};

pub trait HttpExecutor: Send + Sync {
    /// Execute a request. Non-2xx statuses are returned as responses, only
    /// transport failures are errors.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking executor backed by reqwest.
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self> {
        Self::new(Duration::from_secs(30))
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let method: http::Method = request.method.into();

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            headers.insert(
                HeaderName::try_from(name.as_str())?,
                HeaderValue::try_from(value.as_str())?,
            );
        }

        let mut builder = self.client.request(method, &request.url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        log::debug!("{:?} {}", request.method, request.url);
        let response = builder
            .send()
            .map_err(|e| Error::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let mut resp_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                resp_headers.insert(name.to_string(), v.to_string());
            }
        }
        let body = response.text()?;

        Ok(HttpResponse {
            status,
            headers: resp_headers,
            body,
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::types::Method;

    /// Scripted executor. Responses are keyed by method and URL, unmatched
    /// requests get a 404.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        responses: Arc<Mutex<HashMap<(Method, String), HttpResponse>>>,
        recorded_requests: Arc<Mutex<Vec<HttpRequest>>>,
        error_message: Arc<Mutex<Option<String>>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(
            self,
            method: Method,
            url: impl Into<String>,
            response: HttpResponse,
        ) -> Self {
            self.set_response(method, url, response);
            self
        }

        pub fn with_json(self, url: impl Into<String>, body: serde_json::Value) -> Self {
            self.with_response(Method::GET, url, Self::success_response(body))
        }

        /// Replace a response after the executor has been handed out.
        pub fn set_response(&self, method: Method, url: impl Into<String>, response: HttpResponse) {
            self.responses
                .lock()
                .unwrap()
                .insert((method, url.into()), response);
        }

        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.error_message.lock().unwrap() = Some(message.into());
            self
        }

        pub fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// Number of requests sent with this method to this URL.
        pub fn count(&self, method: Method, url: &str) -> usize {
            self.recorded_requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method && r.url == url)
                .count()
        }

        pub fn clear_recorded(&self) {
            self.recorded_requests.lock().unwrap().clear();
        }

        pub fn success_response(body: serde_json::Value) -> HttpResponse {
            HttpResponse::new(200, body.to_string())
        }

        pub fn text_response(status: u16, body: &str) -> HttpResponse {
            HttpResponse::new(status, body)
        }

        pub fn not_found() -> HttpResponse {
            HttpResponse::new(404, "Not Found")
        }
    }

    impl HttpExecutor for MockExecutor {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.recorded_requests.lock().unwrap().push(request.clone());

            if let Some(message) = self.error_message.lock().unwrap().clone() {
                return Err(Error::transport(message));
            }

            let responses = self.responses.lock().unwrap();
            Ok(responses
                .get(&(request.method, request.url.clone()))
                .cloned()
                .unwrap_or_else(Self::not_found))
        }
    }
}
