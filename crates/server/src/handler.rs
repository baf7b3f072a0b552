//! Proxy server state and router.
//!
//! State is immutable configuration plus the two upstream clients; every
//! request is handled independently.

use axum::Router;
use axum::http::{Method, header::CONTENT_TYPE};
use axum::routing::{get, post};
use rumahsubsidi_client::{PkpClient, SikumbangClient};
use rumahsubsidi_core::{AppConfig, Error};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::routes;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pkp: Arc<PkpClient>,
    pub sikumbang: Arc<SikumbangClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let pkp = PkpClient::new(&config.pkp, &config.http)?;
        let sikumbang = SikumbangClient::new(&config.sikumbang, &config.http)?;
        Ok(Self { config: Arc::new(config), pkp: Arc::new(pkp), sikumbang: Arc::new(sikumbang) })
    }
}

/// Build the proxy router: health check, eligibility and listing detail, with open CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    tracing::debug!(
        detail_path = %state.config.sikumbang.detail_path,
        data_global = %state.config.sikumbang.data_global,
        "routes ready"
    );

    Router::new()
        .route("/", get(routes::health::health))
        .route(routes::CEK_SUBSIDI, post(routes::cek_subsidi::cek_subsidi))
        .route(routes::DETAIL_PERUMAHAN, get(routes::detail::missing_id))
        .route(&format!("{}/", routes::DETAIL_PERUMAHAN), get(routes::detail::missing_id))
        .route(&format!("{}/:id", routes::DETAIL_PERUMAHAN), get(routes::detail::detail_perumahan))
        .layer(cors)
        .with_state(state)
}
