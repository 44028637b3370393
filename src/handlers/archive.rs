use axum::{
    extract::State,
    http::{HeaderMap, header::HOST},
};
use std::sync::Arc;
use tracing::info;

use crate::extract::Json;
use crate::middleware::auth::AuthUser;
use crate::router::PortalState;
use crate::service::archive_builder::{self, archive_file_name};
use crate::types::archive::ArchiveResponse;
use crate::types::stations::StationRangeRequest;
use crate::PortalError;

/// POST /api/download/ -> fetches matching files from the data host and
/// publishes them as one tar.gz under `/media`.
pub async fn download_archive_handler(
    State(state): State<PortalState>,
    user: Option<AuthUser>,
    headers: HeaderMap,
    Json(req): Json<StationRangeRequest>,
) -> Result<Json<ArchiveResponse>, PortalError> {
    if state.config.archive.require_active_user && user.is_none() {
        return Err(PortalError::Unauthorized(
            "Authentication credentials were not provided.".to_string(),
        ));
    }

    let (start, end) = req.parse_range()?;
    if start > end {
        return Err(PortalError::BadRequest(
            "Start date cannot be later than end date".to_string(),
        ));
    }

    if let Some(limiter) = state.archive_limiter.as_ref()
        && limiter.check().is_err()
    {
        return Err(PortalError::RateLimited);
    }

    let planned = archive_builder::plan(&state.storage, &req.stations, start, end).await?;
    info!(
        stations = ?req.stations,
        %start,
        %end,
        planned = planned.len(),
        "building archive"
    );

    let archive_name = archive_file_name(start, end);
    let remote = Arc::clone(&state.remote);
    let media_root = state.config.server.media_root.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        archive_builder::build_archive(remote.as_ref(), &planned, &media_root, &archive_name)
    })
    .await??;

    let Some(outcome) = outcome else {
        return Err(PortalError::NotFound(
            "No files found or failed to copy".to_string(),
        ));
    };

    Ok(Json(ArchiveResponse {
        success: true,
        download_url: download_url(&state, &headers, &outcome.archive_name),
        file_count: outcome.file_count,
        archive_name: outcome.archive_name,
        stations: req.stations,
        period: format!("{start} - {end}"),
    }))
}

fn download_url(state: &PortalState, headers: &HeaderMap, archive_name: &str) -> String {
    let base = match state.config.server.public_url.as_ref() {
        Some(url) => url.as_str().trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    };
    format!("{base}/media/{archive_name}")
}
