//! In-process transport for unit tests.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use http::StatusCode;

use crate::{
    error::{ClientError, ClientResult},
    transport::{HttpRequest, HttpResponse, HttpTransport},
};

type Handler = Arc<dyn Fn(&HttpRequest) -> ClientResult<HttpResponse> + Send + Sync>;

/// Answers requests from a replaceable handler and records every request.
pub struct ScriptedTransport {
    handler: Mutex<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("requests", &self.requests.lock().map(|r| r.len()).unwrap_or(0))
            .finish_non_exhaustive()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            handler: Mutex::new(Arc::new(|_| Ok(HttpResponse::new(StatusCode::NOT_FOUND, "")))),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn route<F>(&self, handler: F)
    where
        F: Fn(&HttpRequest) -> ClientResult<HttpResponse> + Send + Sync + 'static,
    {
        *self.handler.lock().unwrap() = Arc::new(handler);
    }

    pub fn respond(&self, status: StatusCode, body: &str) {
        let body = body.to_string();
        self.route(move |_| Ok(HttpResponse::new(status, body.clone())));
    }

    pub fn fail(&self, error: ClientError) {
        self.route(move |_| Err(error.clone()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Requests whose path (without the `/api` prefix) equals `path`.
    pub fn count(&self, method: &http::Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.url.path().trim_start_matches("/api") == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let handler = self.handler.lock().unwrap().clone();
        self.requests.lock().unwrap().push(request.clone());
        tokio::task::yield_now().await;
        handler(&request)
    }
}
