use axum::{
    Router,
    routing::{get, post},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::api::remote::RemoteConnector;
use crate::config::Config;
use crate::db::PortalStorage;
use crate::handlers::{archive, stations, token, users};
use crate::service::tokens::TokenService;

#[derive(Clone)]
pub struct PortalState {
    pub storage: PortalStorage,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub remote: Arc<dyn RemoteConnector>,
    /// `None` when archive builds are unlimited.
    pub archive_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl PortalState {
    pub fn new(
        storage: PortalStorage,
        config: Arc<Config>,
        remote: Arc<dyn RemoteConnector>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.auth));
        let archive_limiter = NonZeroU32::new(config.archive.max_builds_per_minute)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        Self {
            storage,
            config,
            tokens,
            remote,
            archive_limiter,
        }
    }
}

pub fn portal_router(state: PortalState) -> Router {
    let media = ServeDir::new(&state.config.server.media_root);

    let users = Router::new()
        .route("/register/", post(users::register_handler))
        .route("/me/", get(users::me_handler))
        .route("/users/", get(users::list_users_handler))
        .route(
            "/users/{id}/",
            get(users::user_detail_handler).patch(users::update_user_handler),
        );

    Router::new()
        .nest("/api/users", users)
        .route("/api/token/", post(token::obtain_token_handler))
        .route("/api/token/refresh/", post(token::refresh_token_handler))
        .route(
            "/api/stations/",
            get(stations::list_stations_handler).post(stations::station_files_handler),
        )
        .route("/api/download/", post(archive::download_archive_handler))
        .nest_service("/media", media)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
