//! JSON-over-HTTP transport for the draft service.

use crate::draft::{
    DraftError, ErrorCategory, Item, Participant, ParticipantId, SessionId, SessionSettings,
    StatusSnapshot,
};
use crate::service::DraftService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

/// Request for creating a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    /// Explicit id; a passphrase is generated when absent.
    #[serde(default)]
    pub id: Option<SessionId>,
    /// Free-text description.
    pub description: String,
    /// Owner identity.
    pub owner: ParticipantId,
    /// Items dealt into each hand.
    pub initial_hand_size: usize,
    /// Picks each participant keeps.
    pub final_bank_size: usize,
}

/// Response to a created draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftResponse {
    /// Id of the new draft.
    pub id: SessionId,
}

/// Request identifying the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerRequest {
    /// Who is asking.
    pub caller: ParticipantId,
}

/// Request for changing hand and bank sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRequest {
    /// Who is asking.
    pub caller: ParticipantId,
    /// Items dealt into each hand.
    pub initial_hand_size: usize,
    /// Picks each participant keeps.
    pub final_bank_size: usize,
}

/// Request for replacing the item pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsRequest {
    /// Who is asking.
    pub caller: ParticipantId,
    /// Flat objects, one per item, fields in display order.
    pub items: Vec<Map<String, Value>>,
}

/// Request for replacing the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantsRequest {
    /// Who is asking.
    pub caller: ParticipantId,
    /// Roster in seat order.
    pub participants: Vec<Participant>,
}

/// Request for submitting a pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickRequest {
    /// Who is picking.
    pub participant: ParticipantId,
    /// Index into the participant's current hand.
    pub index: usize,
}

/// Count of accepted records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Records accepted.
    pub count: usize,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Message safe to show to users.
    pub error: String,
    /// Error class.
    pub category: String,
}

impl IntoResponse for DraftError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::State => StatusCode::CONFLICT,
            ErrorCategory::Authorization => StatusCode::FORBIDDEN,
            ErrorCategory::Lookup => StatusCode::NOT_FOUND,
            ErrorCategory::Range => StatusCode::BAD_REQUEST,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = %status, error = %self, "Request rejected");
        let body = ErrorResponse {
            error: self.user_message(),
            category: self.category().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the router.
#[instrument(skip(service))]
pub fn router(service: DraftService) -> Router {
    info!("Building draft router");
    Router::new()
        .route("/drafts", get(list_drafts).post(create_draft))
        .route("/drafts/{id}", get(draft_status))
        .route("/drafts/{id}/settings", put(configure_draft))
        .route("/drafts/{id}/items", put(set_items))
        .route("/drafts/{id}/participants", put(set_participants))
        .route("/drafts/{id}/start", post(start_draft))
        .route("/drafts/{id}/picks", post(submit_pick))
        .route("/drafts/{id}/cancel", post(cancel_draft))
        .with_state(service)
}

async fn list_drafts(State(service): State<DraftService>) -> Result<Json<Vec<SessionId>>, DraftError> {
    service.list_sessions().map(Json)
}

#[instrument(skip_all, fields(owner = %req.owner))]
async fn create_draft(
    State(service): State<DraftService>,
    Json(req): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<CreateDraftResponse>), DraftError> {
    let settings = SessionSettings::new(req.initial_hand_size, req.final_bank_size);
    let handle = service.create_session(req.id, req.description, req.owner, settings)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateDraftResponse {
            id: handle.id().to_string(),
        }),
    ))
}

async fn draft_status(
    State(service): State<DraftService>,
    Path(id): Path<SessionId>,
) -> Result<Json<StatusSnapshot>, DraftError> {
    service.get_status(&id).map(Json)
}

async fn configure_draft(
    State(service): State<DraftService>,
    Path(id): Path<SessionId>,
    Json(req): Json<SettingsRequest>,
) -> Result<StatusCode, DraftError> {
    let settings = SessionSettings::new(req.initial_hand_size, req.final_bank_size);
    service.configure_session(&id, &req.caller, settings)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(session_id = %id, count = req.items.len()))]
async fn set_items(
    State(service): State<DraftService>,
    Path(id): Path<SessionId>,
    Json(req): Json<ItemsRequest>,
) -> Result<Response, DraftError> {
    let items = match req
        .items
        .iter()
        .map(Item::from_json_object)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(items) => items,
        Err(e) => {
            let body = ErrorResponse {
                error: e.message,
                category: ErrorCategory::Validation.to_string(),
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response());
        }
    };
    let count = service.set_items(&id, &req.caller, items)?;
    Ok(Json(CountResponse { count }).into_response())
}

async fn set_participants(
    State(service): State<DraftService>,
    Path(id): Path<SessionId>,
    Json(req): Json<ParticipantsRequest>,
) -> Result<Json<CountResponse>, DraftError> {
    let count = service.set_participants(&id, &req.caller, req.participants)?;
    Ok(Json(CountResponse { count }))
}

async fn start_draft(
    State(service): State<DraftService>,
    Path(id): Path<SessionId>,
    Json(req): Json<CallerRequest>,
) -> Result<StatusCode, DraftError> {
    service.start_session(&id, &req.caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_pick(
    State(service): State<DraftService>,
    Path(id): Path<SessionId>,
    Json(req): Json<PickRequest>,
) -> Result<Json<Item>, DraftError> {
    service
        .submit_pick(&id, &req.participant, req.index)
        .await
        .map(Json)
}

async fn cancel_draft(
    State(service): State<DraftService>,
    Path(id): Path<SessionId>,
    Json(req): Json<CallerRequest>,
) -> Result<StatusCode, DraftError> {
    service.cancel_session(&id, &req.caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
