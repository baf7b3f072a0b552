use axum::Json;
use serde_json::{Value, json};

use super::{CEK_SUBSIDI, DETAIL_PERUMAHAN};

/// `GET /`: liveness and endpoint listing.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "running",
        "message": "Proxy server for PKP API and Sikumbang is running",
        "endpoints": {
            "cekSubsidi": format!("POST {CEK_SUBSIDI}"),
            "detailPerumahan": format!("GET {DETAIL_PERUMAHAN}/:id"),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["endpoints"]["cekSubsidi"], "POST /api/cek-subsidi");
        assert_eq!(body["endpoints"]["detailPerumahan"], "GET /api/detail-perumahan/:id");
    }
}
