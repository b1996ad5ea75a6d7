//! Test utilities for standing up a local upstream server.
//!
//! One server plays both the GitHub REST API and the completion endpoint.
//! Every request is buffered and recorded before the handler sees it, so
//! tests can assert on paths, headers and JSON payloads afterwards.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode, body::Incoming, service::service_fn};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use serde_json::Value;
use std::io::ErrorKind;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// Shared handler type invoked for each incoming request.
pub type Handler = Arc<Mutex<Box<dyn FnMut(&Request<Bytes>) -> Response<Full<Bytes>> + Send>>>;

/// Request as seen by the upstream server.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub body: Bytes,
}

impl Captured {
    fn from_request(req: &Request<Bytes>) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        Self {
            method: req.method().to_string(),
            path: req.uri().path().to_owned(),
            authorization: header("authorization"),
            user_agent: header("user-agent"),
            accept: header("accept"),
            body: req.body().clone(),
        }
    }

    /// Parse the recorded body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[allow(dead_code, reason = "helper used in some tests only")]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// Handle returned by [`start_upstream`] for shutting down the server.
pub struct ShutdownHandle {
    join: JoinHandle<()>,
    stop: oneshot::Sender<()>,
}

impl ShutdownHandle {
    /// Signal the server to stop and await shutdown.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        let _ = self.join.await;
    }
}

/// Running upstream server.
pub struct Upstream {
    pub addr: SocketAddr,
    handler: Handler,
    requests: Arc<Mutex<Vec<Captured>>>,
    shutdown: ShutdownHandle,
}

impl Upstream {
    /// Base URL of the server, without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Replace the request handler.
    ///
    /// # Panics
    ///
    /// Panics if the handler mutex is poisoned.
    pub fn respond_with<F>(&self, handler: F)
    where
        F: FnMut(&Request<Bytes>) -> Response<Full<Bytes>> + Send + 'static,
    {
        *self.handler.lock().expect("lock handler") = Box::new(handler);
    }

    /// Requests received so far, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if the request log mutex is poisoned.
    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().expect("lock requests").clone()
    }

    /// Stop the server.
    pub async fn shutdown(self) {
        self.shutdown.shutdown().await;
    }
}

/// Build a response with a JSON content type.
///
/// # Panics
///
/// Panics if the response cannot be constructed.
pub fn json_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::from(body.into()))
        .expect("build response")
}

/// Start an HTTP server that records requests and forwards them to a shared
/// handler.
///
/// Until [`Upstream::respond_with`] is called every request receives 404.
///
/// # Errors
///
/// Returns an error if the server fails to bind to a local port.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! uses % internally"
)]
pub async fn start_upstream() -> Result<Upstream, std::io::Error> {
    let handler: Handler = Arc::new(Mutex::new(Box::new(|_req| {
        json_response(StatusCode::NOT_FOUND, r#"{"message":"No handler"}"#)
    })));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler_clone = handler.clone();
    let requests_clone = requests.clone();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, mut rx) = oneshot::channel();

    let join = tokio::spawn(async move {
        let builder = auto::Builder::new(TokioExecutor::new());
        loop {
            tokio::select! {
                res = listener.accept() => match res {
                    Ok((stream, _)) => {
                        let io = TokioIo::new(stream);
                        let h = handler_clone.clone();
                        let log = requests_clone.clone();
                        let service = service_fn(move |req: Request<Incoming>| {
                            let h = h.clone();
                            let log = log.clone();
                            async move {
                                let (parts, body) = req.into_parts();
                                let bytes = body.collect().await.unwrap_or_default().to_bytes();
                                let req = Request::from_parts(parts, bytes);
                                log.lock()
                                    .expect("lock requests")
                                    .push(Captured::from_request(&req));
                                let mut f = h.lock().expect("lock handler in service");
                                let resp = (f)(&req);
                                Ok::<_, std::convert::Infallible>(resp)
                            }
                        });
                        let builder = builder.clone();
                        tokio::spawn(async move {
                            let _ = builder.serve_connection(io, service).await;
                        });
                    }
                    Err(e) => {
                        eprintln!("accept error: {e}");
                        match e.kind() {
                            ErrorKind::ConnectionAborted
                            | ErrorKind::ConnectionReset
                            | ErrorKind::Interrupted
                            | ErrorKind::WouldBlock => {}
                            _ => break,
                        }
                    }
                },
                _ = &mut rx => break,
            }
        }
    });

    Ok(Upstream {
        addr,
        handler,
        requests,
        shutdown: ShutdownHandle { join, stop: tx },
    })
}
