//! Shared fixtures for the integration tests: a scripted in-memory backend
//! and JSON builders for backend responses.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobboard_stores::{ApiClient, ApiError, ApiFuture};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

/// Route store logs to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One request seen by a [`ScriptedClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

type Handler = Box<dyn Fn(&Call) -> Result<Value, ApiError> + Send + Sync>;

struct Hold {
    fragment: String,
    entered: Option<oneshot::Sender<()>>,
    release: oneshot::Receiver<()>,
}

/// Lets a test observe that a held request is in flight and decide when it
/// completes.
pub struct Gate {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

/// [`ApiClient`] that answers from a closure and records every call.
pub struct ScriptedClient {
    handler: Handler,
    calls: Mutex<Vec<Call>>,
    holds: Mutex<Vec<Hold>>,
}

impl ScriptedClient {
    pub fn new(
        handler: impl Fn(&Call) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        init_tracing();
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            holds: Mutex::new(Vec::new()),
        })
    }

    /// Hold the next request whose path contains `fragment` until the
    /// returned gate is released.
    pub fn hold(&self, fragment: &str) -> Gate {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.holds.lock().unwrap().push(Hold {
            fragment: fragment.to_string(),
            entered: Some(entered_tx),
            release: release_rx,
        });
        Gate {
            entered: entered_rx,
            release: release_tx,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths of every `GET`, in order.
    pub fn gets(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "GET")
            .map(|c| c.path)
            .collect()
    }

    fn respond(&self, method: &'static str, path: &str, body: Option<Value>) -> ApiFuture<'_, Value> {
        let call = Call {
            method,
            path: path.to_string(),
            body,
        };
        self.calls.lock().unwrap().push(call.clone());
        let hold = {
            let mut holds = self.holds.lock().unwrap();
            holds
                .iter()
                .position(|h| call.path.contains(&h.fragment))
                .map(|idx| holds.remove(idx))
        };
        let result = (self.handler)(&call);
        Box::pin(async move {
            if let Some(mut hold) = hold {
                if let Some(entered) = hold.entered.take() {
                    let _ = entered.send(());
                }
                let _ = (&mut hold.release).await;
            }
            result
        })
    }
}

impl ApiClient for ScriptedClient {
    fn get<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Value> {
        self.respond("GET", path, None)
    }

    fn add<'a>(&'a self, path: &'a str, body: Value) -> ApiFuture<'a, Value> {
        self.respond("POST", path, Some(body))
    }

    fn update<'a>(&'a self, path: &'a str, body: Value) -> ApiFuture<'a, Value> {
        self.respond("PATCH", path, Some(body))
    }

    fn delete<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Value> {
        self.respond("DELETE", path, None)
    }
}

/// A backend page body.
pub fn page(result: Vec<Value>, current: u32, page_size: u32, total: u64) -> Value {
    let pages = if page_size == 0 {
        0
    } else {
        total.div_ceil(u64::from(page_size))
    };
    json!({
        "result": result,
        "meta": { "current": current, "pageSize": page_size, "pages": pages, "total": total }
    })
}

/// A job body.
pub fn job(id: &str, salary: f64) -> Value {
    json!({
        "_id": id,
        "name": format!("job {id}"),
        "skills": ["RUST"],
        "location": "HANOI",
        "salary": salary,
        "level": "SENIOR",
        "companyId": { "_id": "c1", "name": "Acme" },
        "isActive": true
    })
}

pub fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 400,
        message: message.to_string(),
    }
}

/// Poll `check` until it returns `true`, failing the test after two seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
