//! Shared HTTP response checks for the predictor client.

use crate::error::PredictorError;

/// Check an HTTP response for error statuses.
///
/// Returns the response unchanged on success. 503 maps to
/// [`PredictorError::Unavailable`], any other non-success status to
/// [`PredictorError::Api`] with the response body.
pub async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, PredictorError> {
    if resp.status() == 503 {
        return Err(PredictorError::Unavailable(
            "predictor returned 503 Service Unavailable".into(),
        ));
    }
    if !resp.status().is_success() {
        return Err(PredictorError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn service_unavailable_maps_to_unavailable() {
        let err = check_response(mock_response(503, "")).await.unwrap_err();
        assert!(matches!(err, PredictorError::Unavailable(_)));
    }

    #[tokio::test]
    async fn server_error_keeps_body() {
        let err = check_response(mock_response(500, "model not loaded"))
            .await
            .unwrap_err();
        match err {
            PredictorError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model not loaded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_passes_through() {
        assert!(check_response(mock_response(200, "{}")).await.is_ok());
    }
}
