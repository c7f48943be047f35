//! # Webhook Handlers
//!
//! Public receivers for CallRail and Twilio call webhooks. Providers post
//! either JSON or form data; both go through the shared intake pipeline.

use axum::{
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorType};
use crate::intake;
use crate::server::AppState;

/// Path parameter for provider slug with OpenAPI support
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProviderPathParam {
    /// Provider slug ("callrail" or "twilio")
    #[param(min_length = 1, example = "twilio")]
    pub provider: String,
}

/// Webhook accept response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAcceptResponse {
    /// Always "success"
    pub status: String,
}

impl WebhookAcceptResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Receive a call webhook and store it in the call log
#[utoipa::path(
    post,
    path = "/webhooks/{provider}",
    params(ProviderPathParam),
    request_body(
        content = serde_json::Value,
        description = "CallRail JSON body or Twilio form body",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Call stored", body = WebhookAcceptResponse),
        (status = 400, description = "Undecodable body or missing required field", body = ApiError),
        (status = 404, description = "Unknown provider", body = ApiError),
        (status = 413, description = "Body exceeds the configured limit", body = ApiError),
        (status = 500, description = "Audit log or storage failure", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "webhooks"
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(params): Path<ProviderPathParam>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<WebhookAcceptResponse>, ApiError> {
    let adapter = state.registry.get(&params.provider).map_err(|err| {
        tracing::debug!(provider = %params.provider, "Webhook for unknown provider");
        ApiError::new(
            ErrorType::NotFound.status_code(),
            ErrorType::NotFound.error_code(),
            err.to_string(),
        )
    })?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let body = body.map_err(|rejection| {
        tracing::warn!(
            provider = %params.provider,
            error = %rejection.body_text(),
            "Failed to read webhook body"
        );
        body_read_error(rejection.status(), state.config.max_body_bytes())
    })?;

    intake::ingest(
        &state.db,
        state.audit_log.as_ref(),
        adapter.as_ref(),
        &body,
        content_type,
    )
    .await?;

    Ok(Json(WebhookAcceptResponse::success()))
}

/// 413 when the body exceeded `limit`; any other read failure is the client's.
fn body_read_error(status: StatusCode, limit: usize) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::from(ErrorType::PayloadTooLarge).with_details(serde_json::json!({
            "max_body_bytes": limit,
        }))
    } else {
        ApiError::new(
            ErrorType::BadRequest.status_code(),
            ErrorType::BadRequest.error_code(),
            "Failed to read request body",
        )
    }
}
