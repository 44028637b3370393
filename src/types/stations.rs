use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::models::{DbFile, DbStation};
use crate::error::PortalError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body shared by the metadata query and the archive request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationRangeRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stations: Vec<String>,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
}

impl StationRangeRequest {
    /// Presence checks followed by strict `YYYY-MM-DD` parsing. Order matters:
    /// an empty station list is reported before missing dates.
    pub fn parse_range(&self) -> Result<(NaiveDate, NaiveDate), PortalError> {
        if self.stations.is_empty() {
            return Err(PortalError::BadRequest("No stations selected".to_string()));
        }
        let (Some(start), Some(end)) = (
            self.start_date.as_deref().filter(|s| !s.is_empty()),
            self.end_date.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(PortalError::BadRequest(
                "Provide both start and end dates".to_string(),
            ));
        };
        Ok((parse_date(start)?, parse_date(end)?))
    }
}

/// `null` reads as an empty list.
fn null_as_empty<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, PortalError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        PortalError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string())
    })
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StaidInfo {
    pub staid: i64,
    pub staname: String,
}

/// Wire form of a file row; `staid_info` embeds the owning station.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    pub date: NaiveDate,
    pub period: Option<String>,
    pub filetype: Option<String>,
    pub path: String,
    pub staid_info: Option<StaidInfo>,
    pub fullness: Option<f64>,
}

impl From<DbFile> for FileRecord {
    fn from(f: DbFile) -> Self {
        let staid_info = match (f.staid, f.staname) {
            (Some(staid), Some(staname)) => Some(StaidInfo { staid, staname }),
            _ => None,
        };
        Self {
            id: f.id,
            filename: f.filename,
            date: f.date,
            period: f.period,
            filetype: f.filetype,
            path: f.path,
            staid_info,
            fullness: f.fullness,
        }
    }
}

/// Per-station entry of the metadata response: a file list or an error object.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StationFiles {
    Files(Vec<FileRecord>),
    Error { error: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StationRecord {
    pub staid: i64,
    pub staname: String,
    pub longstaname: Option<String>,
    pub network: Option<String>,
    pub agency: Option<String>,
    pub country: Option<String>,
    pub receiver: Option<String>,
    pub recvers: Option<String>,
    pub recnum: Option<String>,
    pub antenna: Option<String>,
    pub antnum: Option<String>,
    pub deltan: Option<f64>,
    pub deltae: Option<f64>,
    pub deltah: Option<f64>,
    pub startdate: Option<NaiveDate>,
    pub enddate: Option<NaiveDate>,
    pub sta_daterange: Option<String>,
}

impl From<DbStation> for StationRecord {
    fn from(s: DbStation) -> Self {
        Self {
            staid: s.staid,
            staname: s.staname,
            longstaname: s.longstaname,
            network: s.network,
            agency: s.agency,
            country: s.country,
            receiver: s.receiver,
            recvers: s.recvers,
            recnum: s.recnum,
            antenna: s.antenna,
            antnum: s.antnum,
            deltan: s.deltan,
            deltae: s.deltae,
            deltah: s.deltah,
            startdate: s.startdate,
            enddate: s.enddate,
            sta_daterange: s.sta_daterange,
        }
    }
}
