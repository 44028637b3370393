#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
};
use chrono::NaiveDate;
use gnss_portal::{
    Config, PortalError,
    api::{FetchError, RemoteConnector, RemoteSession},
    db::{DbStation, NewFile, NewUser, PortalStorage},
    router::{PortalState, portal_router},
    service::password::hash_password,
};
use serde_json::Value;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Serves "remote" files from a local directory; absolute remote paths are
/// resolved beneath `root`.
pub struct LocalConnector {
    root: PathBuf,
    connects: AtomicUsize,
    refuse: AtomicBool,
    failing: Mutex<Vec<PathBuf>>,
}

impl LocalConnector {
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Place a file so that `remote_path` resolves to it.
    pub fn put(&self, remote_path: &str, contents: &[u8]) {
        let local = self.root.join(remote_path.trim_start_matches('/'));
        fs::create_dir_all(local.parent().unwrap()).unwrap();
        fs::write(local, contents).unwrap();
    }

    /// Make every later `connect` fail as if the host were down.
    pub fn refuse_connections(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    /// Make fetching `remote_path` fail mid-transfer even though it exists.
    pub fn fail_transfer(&self, remote_path: &str) {
        self.failing.lock().unwrap().push(PathBuf::from(remote_path));
    }
}

impl RemoteConnector for LocalConnector {
    fn connect(&self) -> Result<Box<dyn RemoteSession>, PortalError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
            return Err(refused.into());
        }
        Ok(Box::new(LocalSession {
            root: self.root.clone(),
            failing: self.failing.lock().unwrap().clone(),
        }))
    }
}

struct LocalSession {
    root: PathBuf,
    failing: Vec<PathBuf>,
}

impl RemoteSession for LocalSession {
    fn fetch(&mut self, remote: &Path, local: &Path) -> Result<u64, FetchError> {
        let src = self.root.join(remote.strip_prefix("/").unwrap_or(remote));
        if !src.is_file() {
            return Err(FetchError::NotFound(remote.to_path_buf()));
        }
        if self.failing.iter().any(|p| p == remote) {
            return Err(FetchError::Transfer {
                path: remote.to_path_buf(),
                reason: "channel closed".to_string(),
            });
        }
        fs::copy(&src, local).map_err(|e| FetchError::Transfer {
            path: remote.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn close(&mut self) {}
}

pub struct TestApp {
    pub app: Router,
    pub storage: PortalStorage,
    pub remote: Arc<LocalConnector>,
    pub media_root: PathBuf,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut cfg = Config::default();
    cfg.database.url = format!("sqlite://{}", dir.path().join("portal.sqlite").display());
    cfg.server.media_root = dir.path().join("media");
    cfg.auth.secret_key = "integration-secret".to_string();
    cfg.archive.max_builds_per_minute = 0;
    tweak(&mut cfg);

    fs::create_dir_all(&cfg.server.media_root).unwrap();
    let remote_root = dir.path().join("remote");
    fs::create_dir_all(&remote_root).unwrap();

    let storage = PortalStorage::connect(&cfg.database.url)
        .await
        .expect("database");
    let remote = Arc::new(LocalConnector {
        root: remote_root,
        connects: AtomicUsize::new(0),
        refuse: AtomicBool::new(false),
        failing: Mutex::new(Vec::new()),
    });
    let media_root = cfg.server.media_root.clone();
    let state = PortalState::new(storage.clone(), Arc::new(cfg), remote.clone());

    TestApp {
        app: portal_router(state),
        storage,
        remote,
        media_root,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("request failed")
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("host", "portal.test")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let resp = self
            .send(builder.body(Body::from(body.to_string())).unwrap())
            .await;
        into_json(resp).await
    }

    /// POST a body verbatim, for payloads that are not valid JSON.
    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("host", "portal.test")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        into_json(self.send(req).await).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("PATCH")
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap();
        into_json(self.send(req).await).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        into_json(self.send(builder.body(Body::empty()).unwrap()).await).await
    }

    pub async fn add_station(&self, staid: i64, staname: &str) {
        self.storage
            .insert_station(&DbStation {
                staid,
                staname: staname.to_string(),
                network: Some("TEST".to_string()),
                ..Default::default()
            })
            .await
            .expect("insert station");
    }

    pub async fn add_file(&self, staid: i64, filename: &str, date: NaiveDate, path: &str) -> i64 {
        self.storage
            .insert_file(&NewFile {
                staid: Some(staid),
                filename: filename.to_string(),
                date,
                period: Some("30s".to_string()),
                filetype: Some("rinex".to_string()),
                path: path.to_string(),
                fullness: Some(0.98),
            })
            .await
            .expect("insert file")
    }

    /// Create an account directly in storage and return `(id, access token)`.
    pub async fn user_with_token(&self, email: &str, staff: bool) -> (i64, String) {
        let password = "s3cret-pass";
        let user = self
            .storage
            .create_user(NewUser {
                email: email.to_string(),
                user_name: email.split('@').next().unwrap().to_string(),
                organization: None,
                password_hash: hash_password(password).unwrap(),
                is_active: true,
                is_staff: staff,
                is_superuser: staff,
            })
            .await
            .expect("create user");
        let (status, body) = self
            .post_json(
                "/api/token/",
                serde_json::json!({"email": email, "password": password}),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "token request failed: {body}");
        (user.id, body["access"].as_str().unwrap().to_string())
    }

    pub fn media_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.media_root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub async fn into_json(resp: Response<Body>) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, value)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
