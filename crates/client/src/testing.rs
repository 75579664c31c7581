use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::backend::{ApiRequest, ApiResponse, Backend, TransportError};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

/// In-memory backend that records requests and answers from a closure.
pub(crate) struct ScriptedBackend {
    requests: Mutex<Vec<ApiRequest>>,
    handler: Box<Handler>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl ScriptedBackend {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Self { requests: Mutex::new(Vec::new()), handler: Box::new(handler), gates: Mutex::default() }
    }

    pub(crate) fn always(status: u16, body: Value) -> Self {
        Self::new(move |_| Ok(ApiResponse::json_body(status, &body)))
    }

    pub(crate) fn failing(error: TransportError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    /// Holds back the answer to the request for `page` until the sender fires.
    pub(crate) fn gate_page(&self, page: u32) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().expect("gates").insert(page.to_string(), receiver);
        sender
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("requests").clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().expect("requests").push(request.clone());
        let gate = request
            .query_value("page")
            .and_then(|page| self.gates.lock().expect("gates").remove(page));
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        (self.handler)(&request)
    }
}

/// Twelve parts served five per page, as the backend list route does.
pub(crate) fn piece_catalog(request: &ApiRequest) -> Result<ApiResponse, TransportError> {
    const TOTAL: u32 = 12;
    let page: u32 = request.query_value("page").and_then(|value| value.parse().ok()).unwrap_or(1);
    let limit: u32 = request.query_value("limit").and_then(|value| value.parse().ok()).unwrap_or(5);
    let start = page.saturating_sub(1) * limit + 1;
    let end = (start + limit).min(TOTAL + 1);
    let results: Vec<Value> = (start..end)
        .map(|index| {
            json!({
                "_id": format!("p-{index}"),
                "nom": format!("Roulement {index}"),
                "quantite": index,
                "etat": if index % 3 == 0 { "Non Disponible" } else { "Disponible" },
            })
        })
        .collect();

    Ok(ApiResponse::json_body(
        200,
        &json!({
            "results": results,
            "totalPages": TOTAL.div_ceil(limit),
            "totalPieces": TOTAL,
        }),
    ))
}

pub(crate) fn shared<B: Backend + 'static>(backend: B) -> (Arc<B>, Arc<dyn Backend>) {
    let backend = Arc::new(backend);
    let erased: Arc<dyn Backend> = backend.clone();
    (backend, erased)
}
