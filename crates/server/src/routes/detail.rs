//! `GET /api/detail-perumahan/:id`: listing data embedded in a Sikumbang page.

use axum::Json;
use axum::extract::{Path, State};
use rumahsubsidi_client::Upstream;
use rumahsubsidi_core::Error;
use rumahsubsidi_core::model::DetailResponse;

use crate::error::ProxyError;
use crate::handler::AppState;

pub async fn detail_perumahan(
    State(state): State<AppState>, Path(id): Path<String>,
) -> Result<Json<DetailResponse>, ProxyError> {
    let data = state
        .sikumbang
        .detail(&id)
        .await
        .map_err(|e| ProxyError::new(Upstream::Sikumbang, e))?;

    Ok(Json(DetailResponse::new(data)))
}

/// The detail route without an id.
pub async fn missing_id() -> ProxyError {
    ProxyError::new(Upstream::Sikumbang, Error::InvalidInput("ID perumahan is required".into()))
}
