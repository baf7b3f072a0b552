//! `POST /api/cek-subsidi`: forward a NIK to the PKP eligibility service.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Html;
use rumahsubsidi_client::Upstream;
use rumahsubsidi_core::Error;
use rumahsubsidi_core::model::Nik;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProxyError;
use crate::handler::AppState;

/// Request body. `nik` stays raw so a mistyped value is rejected by NIK
/// validation instead of a deserializer message that would echo it.
#[derive(Debug, Deserialize)]
pub struct CekSubsidiRequest {
    #[serde(default)]
    pub nik: Option<Value>,
}

impl CekSubsidiRequest {
    fn nik(&self) -> Result<Nik, Error> {
        match &self.nik {
            None | Some(Value::Null) => Nik::parse(""),
            Some(Value::String(raw)) => Nik::parse(raw),
            Some(_) => Err(Error::InvalidInput("NIK must be 16 digits".into())),
        }
    }
}

/// Validate the NIK, forward it, and answer with PKP's HTML verbatim.
///
/// Validation failures never reach PKP.
pub async fn cek_subsidi(
    State(state): State<AppState>, payload: Result<Json<CekSubsidiRequest>, JsonRejection>,
) -> Result<Html<String>, ProxyError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), "rejected request body");
        ProxyError::new(Upstream::Pkp, Error::InvalidInput("Invalid request body".into()))
    })?;
    let nik = request.nik().map_err(|e| ProxyError::new(Upstream::Pkp, e))?;

    let html = state
        .pkp
        .check(&nik)
        .await
        .map_err(|e| ProxyError::new(Upstream::Pkp, e))?;

    Ok(Html(html))
}
