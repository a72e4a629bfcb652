//! HTTP boundary for the reconciliation engine
//!
//! | Endpoint  | Method | Description                                  |
//! |-----------|--------|----------------------------------------------|
//! | `/upload` | POST   | Consolidate two parsed document field maps   |
//! | `/save`   | POST   | Persist a finalized canonical record         |
//! | `/health` | GET    | Liveness check                               |
//!
//! The `/upload` response shape is load-bearing for the consuming form
//! layer: `consolidated_details[key]` is a scalar for agreed or one-sided
//! fields and a `{document_1, document_2}` object for conflicts, and the
//! renderer dispatches on that shape. Resolution itself is client-side;
//! the server is stateless between the two calls.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::catalog::{FieldCatalog, FieldKey};
use crate::consolidate::{consolidate, DocumentFields};
use crate::persistence::CanonicalRecordStore;
use crate::resolution::CanonicalRecord;

/// Shared state: the configured catalog and the persistence collaborator.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<FieldCatalog>,
    pub store: Arc<dyn CanonicalRecordStore>,
}

impl AppState {
    pub fn new(catalog: FieldCatalog, store: Arc<dyn CanonicalRecordStore>) -> Self {
        AppState {
            catalog: Arc::new(catalog),
            store,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload_documents))
        .route("/save", post(save_record))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

#[derive(Deserialize)]
pub struct UploadRequest {
    /// Field mapping produced by the external parsing collaborator for
    /// document 1. JSON null marks a field the parser could not read.
    pub document_1: HashMap<String, Value>,
    pub document_2: HashMap<String, Value>,
}

#[derive(Serialize)]
struct UploadResponse {
    document_1_details: Value,
    document_2_details: Value,
    consolidated_details: Value,
    similarity_percentage: Option<u8>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    detail: String,
}

/// Coerce a parsed JSON field mapping into document fields. Scalars are
/// stringified the way the upstream parser's loosely typed output expects
/// (ages arrive as numbers, signature flags as booleans); null and
/// structured values count as absent.
fn to_document_fields(raw: &HashMap<String, Value>) -> DocumentFields {
    let mut fields = DocumentFields::new();
    for (key, value) in raw {
        let text = match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            Value::Array(_) | Value::Object(_) => {
                debug!(field = %key, "ignoring structured value in document mapping");
                None
            }
        };
        if let Some(text) = text {
            fields.insert(FieldKey::new(key.clone()), text);
        }
    }
    fields
}

async fn health_check() -> Json<Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Consolidate two parsed documents into the reconciliation view.
async fn upload_documents(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, (StatusCode, Json<ErrorBody>)> {
    let doc1 = to_document_fields(&request.document_1);
    let doc2 = to_document_fields(&request.document_2);

    let result = consolidate(&doc1, &doc2, &state.catalog);

    let consolidated_details = serde_json::to_value(&result.details()).map_err(|e| {
        warn!("failed to serialize consolidation: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Processing failed".to_string(),
                detail: e.to_string(),
            }),
        )
    })?;

    Ok(Json(UploadResponse {
        document_1_details: Value::Object(request.document_1.into_iter().collect()),
        document_2_details: Value::Object(request.document_2.into_iter().collect()),
        consolidated_details,
        similarity_percentage: result.similarity(),
    }))
}

/// Persist a finalized canonical record via the store collaborator.
///
/// Extra keys in the payload are ignored (the catalog is authoritative);
/// store failures surface as 500 with the collaborator's message.
async fn save_record(
    State(state): State<AppState>,
    Json(payload): Json<HashMap<String, Option<String>>>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let record = CanonicalRecord::from_values(
        payload
            .into_iter()
            .map(|(key, value)| (FieldKey::new(key), value)),
        &state.catalog,
    );

    match state.store.save(&record).await {
        Ok(()) => Ok(Json(serde_json::json!({"status": "success"}))),
        Err(e) => {
            warn!("failed to persist canonical record: {e:#}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Failed to save".to_string(),
                    detail: e.to_string(),
                }),
            ))
        }
    }
}
