use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use image_store::record::ImageRecord;

use crate::{middleware::Identity, state::AppState, types::AppError};

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Optional time-to-live in seconds - max 30 days, authenticated only
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: String,
    pub owner: String,
    pub url: String,
    pub ttl_secs: Option<u64>,
    pub created_at: String, // ISO-8601 UTC
}

impl ImageResponse {
    fn from_record(record: &ImageRecord) -> Self {
        Self {
            id: record.id.clone(),
            owner: record.owner.clone().unwrap_or_default(),
            url: content_url(&record.id),
            ttl_secs: record.ttl.map(|ttl| ttl.as_secs()),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Anonymous objects expose their access link only
#[derive(Debug, Serialize)]
pub struct AnonymousImageResponse {
    pub url: String,
}

fn content_url(id: &str) -> String {
    format!("/v1/images/{id}/content")
}

#[instrument(skip(state, identity, body), fields(size = body.len()))]
pub async fn upload(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Response, AppError> {
    match identity {
        Identity::Owner(owner) => {
            let ttl = params.ttl_secs.map(Duration::from_secs);
            let record = state
                .lifecycle
                .create_authenticated(&owner, body.to_vec(), ttl)
                .await?;
            info!(id = %record.id, owner, "stored authenticated upload");
            Ok((
                StatusCode::CREATED,
                Json(ImageResponse::from_record(&record)),
            )
                .into_response())
        }
        Identity::Anonymous => {
            // The anonymous pool has no expiry; a ttl parameter is ignored.
            let record = state.lifecycle.create_anonymous(body.to_vec()).await?;
            info!(id = %record.id, "stored anonymous upload");
            Ok((
                StatusCode::CREATED,
                Json(AnonymousImageResponse {
                    url: content_url(&record.id),
                }),
            )
                .into_response())
        }
    }
}

#[instrument(skip(state, identity))]
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Response, AppError> {
    let records = state.lifecycle.list(identity.owner()).await?;
    match identity {
        Identity::Owner(_) => {
            let rows: Vec<ImageResponse> = records.iter().map(ImageResponse::from_record).collect();
            Ok(Json(rows).into_response())
        }
        Identity::Anonymous => {
            let rows: Vec<AnonymousImageResponse> = records
                .iter()
                .map(|record| AnonymousImageResponse {
                    url: content_url(&record.id),
                })
                .collect();
            Ok(Json(rows).into_response())
        }
    }
}

#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let owner = identity.require_owner()?;
    state.lifecycle.delete(&id, owner).await?;
    info!(id, owner, "deleted image");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (record, bytes) = state.lifecycle.serve(&id).await?;
    let mime = mime_guess::from_path(record.served_path()).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.as_ref())], bytes).into_response())
}
