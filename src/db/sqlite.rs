use crate::db::models::{DbFile, DbStation, DbUser, NewFile, NewUser};
use crate::db::schema::SQLITE_INIT;
use crate::error::PortalError;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

const STATION_COLUMNS: &str = "staid, staname, longstaname, network, agency, country, \
     receiver, recvers, recnum, antenna, antnum, deltan, deltae, deltah, \
     startdate, enddate, sta_daterange";

const USER_COLUMNS: &str = "id, email, user_name, organization, password_hash, start_date, \
     last_login, is_active, is_staff, is_superuser";

#[derive(Clone)]
pub struct PortalStorage {
    pool: SqlitePool,
}

impl PortalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, PortalError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), PortalError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- stations ----

    pub async fn list_stations(&self) -> Result<Vec<DbStation>, PortalError> {
        let sql = format!("SELECT {STATION_COLUMNS} FROM stations ORDER BY staname, staid");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    /// Case-insensitive exact match on `staname`. Several rows may share a name.
    pub async fn stations_by_name(&self, name: &str) -> Result<Vec<DbStation>, PortalError> {
        let sql = format!(
            "SELECT {STATION_COLUMNS} FROM stations WHERE staname = ? COLLATE NOCASE ORDER BY staid"
        );
        Ok(sqlx::query_as(&sql).bind(name).fetch_all(&self.pool).await?)
    }

    pub async fn insert_station(&self, station: &DbStation) -> Result<i64, PortalError> {
        let sql = format!(
            "INSERT INTO stations ({STATION_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        let res = sqlx::query(&sql)
            .bind(station.staid)
            .bind(&station.staname)
            .bind(&station.longstaname)
            .bind(&station.network)
            .bind(&station.agency)
            .bind(&station.country)
            .bind(&station.receiver)
            .bind(&station.recvers)
            .bind(&station.recnum)
            .bind(&station.antenna)
            .bind(&station.antnum)
            .bind(station.deltan)
            .bind(station.deltae)
            .bind(station.deltah)
            .bind(station.startdate)
            .bind(station.enddate)
            .bind(&station.sta_daterange)
            .execute(&self.pool)
            .await?;
        Ok(res.last_insert_rowid())
    }

    // ---- files ----

    /// Files of one station with `start <= date <= end`, oldest first.
    pub async fn files_in_range(
        &self,
        staid: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DbFile>, PortalError> {
        let rows = sqlx::query_as(
            r#"SELECT f.id, f.staid, s.staname, f.filename, f.date, f.period,
                      f.filetype, f.path, f.fullness
               FROM files f LEFT JOIN stations s ON s.staid = f.staid
               WHERE f.staid = ? AND f.date >= ? AND f.date <= ?
               ORDER BY f.date, f.id"#,
        )
        .bind(staid)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_file(&self, file: &NewFile) -> Result<i64, PortalError> {
        let res = sqlx::query(
            r#"INSERT INTO files (staid, filename, date, period, filetype, path, fullness)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(file.staid)
        .bind(&file.filename)
        .bind(file.date)
        .bind(&file.period)
        .bind(&file.filetype)
        .bind(&file.path)
        .bind(file.fullness)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    // ---- users ----

    /// Insert a user. Email and user name collisions surface as `BadRequest`.
    pub async fn create_user(&self, user: NewUser) -> Result<DbUser, PortalError> {
        if self.user_by_email(&user.email).await?.is_some() {
            return Err(PortalError::BadRequest(
                "user with this email address already exists.".to_string(),
            ));
        }
        let taken: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE user_name = ?")
            .bind(&user.user_name)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(PortalError::BadRequest(
                "user with this user name already exists.".to_string(),
            ));
        }

        let res = sqlx::query(
            r#"INSERT INTO users (
                   email, user_name, organization, password_hash, start_date,
                   is_active, is_staff, is_superuser
               ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&user.email)
        .bind(&user.user_name)
        .bind(&user.organization)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortalError::BadRequest("user with these credentials already exists.".to_string())
            }
            other => other.into(),
        })?;

        self.user_by_id(res.last_insert_rowid())
            .await?
            .ok_or_else(|| PortalError::Internal("inserted user vanished".to_string()))
    }

    pub async fn user_by_id(&self, id: i64) -> Result<Option<DbUser>, PortalError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<DbUser>, PortalError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        Ok(sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_users(&self) -> Result<Vec<DbUser>, PortalError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY email");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    /// Update the admin-editable flags. `None` leaves a flag untouched.
    pub async fn update_user_flags(
        &self,
        id: i64,
        is_active: Option<bool>,
        is_staff: Option<bool>,
    ) -> Result<Option<DbUser>, PortalError> {
        sqlx::query(
            r#"UPDATE users SET
                is_active = COALESCE(?, is_active),
                is_staff = COALESCE(?, is_staff)
              WHERE id = ?"#,
        )
        .bind(is_active)
        .bind(is_staff)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.user_by_id(id).await
    }

    pub async fn touch_last_login(&self, id: i64) -> Result<(), PortalError> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
