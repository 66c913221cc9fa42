//! Scripted HTTP transport for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::errors::TransportError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

/// What a scripted route answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// A response (any status).
    Respond(HttpResponse),
    /// A transport error.
    Fail(TransportError),
}

impl MockReply {
    /// A JSON response.
    #[must_use]
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::Respond(
            HttpResponse::new(status, body.to_string())
                .with_header("content-type", "application/json"),
        )
    }

    /// A raw text response.
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        Self::Respond(HttpResponse::new(status, body))
    }

    /// A timeout.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Fail(TransportError::Timeout("scripted timeout".to_string()))
    }

    /// A refused connection.
    #[must_use]
    pub fn connect_error() -> Self {
        Self::Fail(TransportError::Connect("connection refused".to_string()))
    }

    /// Adds a response header. No effect on error replies.
    #[must_use]
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            Self::Respond(response) => Self::Respond(response.with_header(name, value)),
            fail => fail,
        }
    }
}

#[derive(Debug)]
struct Route {
    suffix: String,
    method: Option<HttpMethod>,
    replies: VecDeque<MockReply>,
}

impl Route {
    fn matches(&self, request: &HttpRequest) -> bool {
        request.path().ends_with(&self.suffix)
            && self.method.map_or(true, |m| m == request.method)
    }

    /// Pops the next reply; the last one repeats.
    fn next_reply(&mut self) -> Option<MockReply> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

/// An [`HttpTransport`] that answers from scripted routes and records
/// every request it sees.
///
/// Routes match on URL path suffix, first match wins. Requests with no
/// matching route get a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers requests whose path ends with `suffix`.
    #[must_use]
    pub fn route(self, suffix: impl Into<String>, reply: MockReply) -> Self {
        self.push_route(suffix.into(), None, vec![reply])
    }

    /// Like [`route`](Self::route), limited to one method.
    #[must_use]
    pub fn route_method(self, method: HttpMethod, suffix: impl Into<String>, reply: MockReply) -> Self {
        self.push_route(suffix.into(), Some(method), vec![reply])
    }

    /// Answers successive requests with `replies` in order, repeating the
    /// last.
    #[must_use]
    pub fn route_sequence(self, suffix: impl Into<String>, replies: Vec<MockReply>) -> Self {
        self.push_route(suffix.into(), None, replies)
    }

    fn push_route(mut self, suffix: String, method: Option<HttpMethod>, replies: Vec<MockReply>) -> Self {
        self.routes.get_mut().push(Route {
            suffix,
            method,
            replies: replies.into(),
        });
        self
    }

    /// Every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Paths of every request received, in order.
    #[must_use]
    pub fn request_paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.path().to_string())
            .collect()
    }

    /// Number of requests whose path ends with `suffix`.
    #[must_use]
    pub fn calls_to(&self, suffix: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path().ends_with(suffix))
            .count()
    }

    /// The first request whose path ends with `suffix`.
    #[must_use]
    pub fn request_to(&self, suffix: &str) -> Option<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .find(|r| r.path().ends_with(suffix))
            .cloned()
    }

    /// Clears recorded requests.
    pub fn reset(&self) {
        self.requests.lock().clear();
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = self
            .routes
            .lock()
            .iter_mut()
            .find(|route| route.matches(&request))
            .and_then(Route::next_reply);
        self.requests.lock().push(request);

        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(error)) => Err(error),
            None => Ok(HttpResponse::new(404, "no scripted route")),
        }
    }
}
