//! HTTP endpoints of the Pix checkout server.
//!
//! The admin panel edits the merchant configuration through `/pix/config` and
//! `/pix/detect`; the storefront asks `/pix/payload` for the code to show at
//! checkout. `/pix/verify` decodes a BR Code and checks its CRC16.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pix_types::amount::TransactionAmount;
use pix_types::config::PixConfig;
use pix_types::key::{KeyType, detect_key_type, normalize_key};
use pix_types::payload::BrCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

use crate::state::{CheckoutError, CheckoutState, PixConfigUpdate};

type SharedState = Arc<CheckoutState>;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/pix/config", get(get_config).put(put_config))
        .route("/pix/detect", post(post_detect))
        .route("/pix/payload", get(get_payload_info).post(post_payload))
        .route("/pix/verify", post(post_verify))
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct PixConfigResponse {
    pub configured: bool,
    #[serde(flatten)]
    pub config: PixConfig,
}

impl From<PixConfig> for PixConfigResponse {
    fn from(config: PixConfig) -> Self {
        Self {
            configured: config.is_configured(),
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub key_type: Option<KeyType>,
    pub normalized: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayloadRequest {
    pub amount: TransactionAmount,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub payload: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brcode: Option<BrCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /pix/config`: The merchant configuration currently in effect.
#[instrument(skip_all)]
pub async fn get_config(State(state): State<SharedState>) -> impl IntoResponse {
    Json(PixConfigResponse::from(state.pix_config().await))
}

/// `PUT /pix/config`: Partial update of the merchant configuration.
///
/// Requires `Authorization: Bearer <admin token>`; answers `401` otherwise.
/// A new key has its type detected; an explicit `key_type` overrides detection.
#[instrument(skip_all)]
pub async fn put_config(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<PixConfigUpdate>,
) -> impl IntoResponse {
    if let Err(error) = state.admin_token().authorize(headers.get(header::AUTHORIZATION)) {
        tracing::warn!(error = %error, "Rejected configuration edit");
        return (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
            .into_response();
    }
    let config = state.update_pix_config(body).await;
    (StatusCode::OK, Json(PixConfigResponse::from(config))).into_response()
}

/// `POST /pix/detect`: Suggests a key type for a raw key as the administrator types it.
#[instrument(skip_all)]
pub async fn post_detect(Json(body): Json<DetectRequest>) -> impl IntoResponse {
    let key_type = detect_key_type(&body.key);
    let normalized = key_type.map(|key_type| normalize_key(&body.key, key_type));
    Json(DetectResponse {
        key_type,
        normalized,
    })
}

/// `GET /pix/payload`: Returns a machine-readable description of the `/pix/payload` endpoint.
#[instrument(skip_all)]
pub async fn get_payload_info() -> impl IntoResponse {
    Json(json!({
        "endpoint": "/pix/payload",
        "description": "POST to generate a Pix BR Code for an order total",
        "body": {
            "amount": "decimal, as string or number, e.g. \"19.90\"",
        }
    }))
}

/// `POST /pix/payload`: Generates the copy-and-paste code and QR image link for an order.
///
/// Responds `503` when no payment key is configured, so the storefront can tell the
/// customer to contact the store.
#[instrument(skip_all)]
pub async fn post_payload(
    State(state): State<SharedState>,
    Json(body): Json<PayloadRequest>,
) -> impl IntoResponse {
    match state.checkout(&body.amount).await {
        Ok(checkout) => (StatusCode::OK, Json(checkout)).into_response(),
        Err(error) => {
            tracing::warn!(error = %error, amount = %body.amount, "Checkout unavailable");
            let status = match error {
                CheckoutError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            };
            (
                status,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// `POST /pix/verify`: Decodes a BR Code and verifies its checksum.
#[instrument(skip_all)]
pub async fn post_verify(Json(body): Json<VerifyRequest>) -> impl IntoResponse {
    let response = match BrCode::parse(body.payload.trim()) {
        Ok(brcode) => VerifyResponse {
            valid: true,
            brcode: Some(brcode),
            error: None,
        },
        Err(error) => {
            tracing::debug!(error = %error, "Rejected BR Code");
            VerifyResponse {
                valid: false,
                brcode: None,
                error: Some(error.to_string()),
            }
        }
    };
    Json(response)
}
