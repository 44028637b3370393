use axum::extract::State;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use crate::db::PortalStorage;
use crate::extract::Json;
use crate::router::PortalState;
use crate::types::stations::{FileRecord, StationFiles, StationRangeRequest, StationRecord};
use crate::PortalError;

/// GET /api/stations/ -> every station record.
pub async fn list_stations_handler(
    State(state): State<PortalState>,
) -> Result<Json<Vec<StationRecord>>, PortalError> {
    let stations = state.storage.list_stations().await?;
    Ok(Json(stations.into_iter().map(StationRecord::from).collect()))
}

/// POST /api/stations/ -> file records per requested station, keyed by the
/// name as sent. A failing station does not affect the others.
pub async fn station_files_handler(
    State(state): State<PortalState>,
    Json(req): Json<StationRangeRequest>,
) -> Result<Json<Map<String, Value>>, PortalError> {
    let (start, end) = req.parse_range()?;

    let mut result = Map::new();
    for name in &req.stations {
        let entry = station_files(&state.storage, name, start, end).await;
        result.insert(name.clone(), serde_json::to_value(entry)?);
    }
    Ok(Json(result))
}

async fn station_files(
    storage: &PortalStorage,
    name: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> StationFiles {
    match collect_files(storage, name, start, end).await {
        Ok(Some(files)) => StationFiles::Files(files),
        Ok(None) => StationFiles::Error {
            error: format!("Station '{name}' not found"),
        },
        Err(e) => {
            warn!(station = %name, error = %e, "station lookup failed");
            StationFiles::Error {
                error: format!("Error processing station: {e}"),
            }
        }
    }
}

/// `None` when no station carries this name.
async fn collect_files(
    storage: &PortalStorage,
    name: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Option<Vec<FileRecord>>, PortalError> {
    let stations = storage.stations_by_name(name).await?;
    if stations.is_empty() {
        return Ok(None);
    }
    let mut files = Vec::new();
    for station in stations {
        let rows = storage.files_in_range(station.staid, start, end).await?;
        files.extend(rows.into_iter().map(FileRecord::from));
    }
    Ok(Some(files))
}
