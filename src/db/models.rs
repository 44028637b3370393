use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct DbStation {
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

/// A `files` row joined with the name of its owning station.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbFile {
    pub id: i64,
    pub staid: Option<i64>,
    pub staname: Option<String>,
    pub filename: String,
    pub date: NaiveDate,
    pub period: Option<String>,
    pub filetype: Option<String>,
    pub path: String,
    pub fullness: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFile {
    pub staid: Option<i64>,
    pub filename: String,
    pub date: NaiveDate,
    pub period: Option<String>,
    pub filetype: Option<String>,
    pub path: String,
    pub fullness: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub email: String,
    pub user_name: String,
    pub organization: Option<String>,
    pub password_hash: String,
    pub start_date: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub user_name: String,
    pub organization: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}
