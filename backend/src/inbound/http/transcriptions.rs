//! Transcription handlers.
//!
//! ```text
//! POST /api/v1/transcriptions       multipart/form-data with an `audio` file
//! GET  /api/v1/transcriptions
//! GET  /api/v1/transcriptions/{id}
//! ```
//!
//! Every route requires a bearer token; see [`AuthenticatedUser`].

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::AudioUpload;
use crate::domain::{Error, Transcription, TranscriptionId, TranscriptionStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Multipart field carrying the audio file.
pub const AUDIO_FIELD: &str = "audio";

/// Largest accepted upload, matching the provider's own limit.
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Transcription record as returned to clients.
///
/// Field names are snake_case on the wire, unlike the auth payloads.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TranscriptionDto {
    #[schema(example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
    pub id: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
    #[schema(example = "hello world")]
    pub text: String,
    #[schema(value_type = String, example = "completed")]
    pub status: TranscriptionStatus,
    /// Audio length in seconds.
    #[schema(example = 1.5)]
    pub duration: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&Transcription> for TranscriptionDto {
    fn from(value: &Transcription) -> Self {
        Self {
            id: value.id().to_string(),
            user_id: value.user_id().to_string(),
            text: value.text().to_owned(),
            status: value.status(),
            duration: value.duration_seconds(),
            created_at: value.created_at(),
        }
    }
}

/// Upload form accepted by `POST /api/v1/transcriptions`.
#[derive(utoipa::ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AudioUploadForm {
    /// Audio file in any format the provider accepts.
    #[schema(value_type = String, format = Binary)]
    audio: Vec<u8>,
}

fn multipart_error(error: MultipartError) -> Error {
    debug!(%error, "rejected multipart payload");
    Error::invalid_request("Invalid multipart payload")
}

fn too_large() -> Error {
    Error::invalid_request("Audio file exceeds the 25 MiB limit")
        .with_details(json!({ "field": AUDIO_FIELD, "maxBytes": MAX_AUDIO_BYTES }))
}

async fn read_field(field: &mut Field) -> ApiResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(multipart_error)?;
        if bytes.len() + chunk.len() > MAX_AUDIO_BYTES {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Pull the `audio` file out of the form, ignoring any other fields.
async fn read_audio(mut payload: Multipart) -> ApiResult<AudioUpload> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .unwrap_or(AudioUpload::DEFAULT_FILE_NAME)
            .to_owned();
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = read_field(&mut field).await?;
        if bytes.is_empty() {
            break;
        }
        return Ok(AudioUpload::new(file_name, content_type, bytes));
    }

    Err(Error::invalid_request("Audio file is required")
        .with_details(json!({ "field": AUDIO_FIELD })))
}

/// Transcribe an uploaded audio file.
///
/// Blocks until the provider answers or times out. The returned record is
/// always terminal.
#[utoipa::path(
    post,
    path = "/api/v1/transcriptions",
    request_body(content = AudioUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcription completed", body = TranscriptionDto),
        (status = 400, description = "Missing, empty or oversized audio", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 500, description = "Transcription failed", body = ErrorSchema),
        (status = 503, description = "Provider not configured or unavailable", body = ErrorSchema)
    ),
    tags = ["transcriptions"],
    operation_id = "createTranscription",
    security(("bearer" = []))
)]
#[post("/transcriptions")]
pub async fn create_transcription(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<web::Json<TranscriptionDto>> {
    let audio = read_audio(payload).await?;
    let transcription = state
        .transcriptions
        .transcribe(user.user_id(), audio)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(TranscriptionDto::from(&transcription)))
}

/// List the caller's transcriptions, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/transcriptions",
    responses(
        (status = 200, description = "Caller's transcriptions", body = [TranscriptionDto]),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transcriptions"],
    operation_id = "listTranscriptions",
    security(("bearer" = []))
)]
#[get("/transcriptions")]
pub async fn list_transcriptions(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<TranscriptionDto>>> {
    let records = state
        .transcriptions
        .get_user_transcriptions(user.user_id())
        .await
        .map_err(Error::from)?;
    Ok(web::Json(
        records.iter().map(TranscriptionDto::from).collect(),
    ))
}

/// Fetch one transcription owned by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/transcriptions/{id}",
    params(("id" = String, Path, description = "Transcription UUID")),
    responses(
        (status = 200, description = "Transcription", body = TranscriptionDto),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 403, description = "Owned by another user", body = ErrorSchema),
        (status = 404, description = "Unknown id", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transcriptions"],
    operation_id = "getTranscription",
    security(("bearer" = []))
)]
#[get("/transcriptions/{id}")]
pub async fn get_transcription(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TranscriptionDto>> {
    let id: TranscriptionId = path.into_inner().parse().map_err(|_| {
        Error::invalid_request("Invalid transcription ID").with_details(json!({ "field": "id" }))
    })?;
    let transcription = state
        .transcriptions
        .get_transcription(&id, user.user_id())
        .await
        .map_err(Error::from)?;
    Ok(web::Json(TranscriptionDto::from(&transcription)))
}
