//! # cm-predictor
//!
//! Client for the external emissions forecasting oracle.
//!
//! The oracle is an untrusted, possibly unavailable remote service:
//! `POST {sector, trailing_series, employee_count}` answers
//! `{predicted_value, confidence?, scope_split?}`. Every call carries an
//! explicit client-side timeout and every failure is a [`PredictorError`]
//! the caller is expected to recover from.
//!
//! - [`HttpPredictor`]: reqwest client for a configured endpoint
//! - [`OfflinePredictor`]: always unavailable, for runs without an oracle
//! - [`Predictor`]: the seam the forecast filler is generic over

mod error;
mod http;

pub use error::PredictorError;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::check_response;

// ── Types ──────────────────────────────────────────────────────────

/// Body sent to the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub sector: String,
    /// Daily real totals in tCO2e, oldest first.
    pub trailing_series: Vec<f64>,
    pub employee_count: Option<i64>,
}

/// Split of a daily total across scopes 1, 2 and 3.
///
/// Accepted as an object (`{"scope1": .., "scope2": .., "scope3": ..}`) or
/// a three-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeSplit {
    Named { scope1: f64, scope2: f64, scope3: f64 },
    Ordered([f64; 3]),
}

impl ScopeSplit {
    #[must_use]
    pub const fn shares(self) -> [f64; 3] {
        match self {
            Self::Named {
                scope1,
                scope2,
                scope3,
            } => [scope1, scope2, scope3],
            Self::Ordered(shares) => shares,
        }
    }

    /// Shares rescaled to sum to 1, or `None` if any is negative or non-finite
    /// or they sum to zero.
    #[must_use]
    pub fn normalized(self) -> Option<[f64; 3]> {
        let shares = self.shares();
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return None;
        }
        let sum: f64 = shares.iter().sum();
        if sum <= 0.0 {
            return None;
        }
        Some(shares.map(|s| s / sum))
    }
}

/// The oracle's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted daily total, tCO2e.
    pub predicted_value: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub scope_split: Option<ScopeSplit>,
}

impl Prediction {
    /// Reject values the filler must not write.
    ///
    /// # Errors
    ///
    /// Returns [`PredictorError::InvalidPrediction`] for negative or
    /// non-finite predicted values.
    pub fn validate(self) -> Result<Self, PredictorError> {
        if !self.predicted_value.is_finite() || self.predicted_value < 0.0 {
            return Err(PredictorError::InvalidPrediction(format!(
                "predicted_value must be a non-negative number, got {}",
                self.predicted_value
            )));
        }
        Ok(self)
    }
}

// ── Trait ──────────────────────────────────────────────────────────

/// A source of daily emission forecasts.
pub trait Predictor: Send + Sync {
    /// One call per fill batch.
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<Prediction, PredictorError>> + Send;
}

// ── Clients ────────────────────────────────────────────────────────

/// HTTP client for a configured oracle endpoint.
pub struct HttpPredictor {
    http: reqwest::Client,
    url: Option<String>,
}

impl HttpPredictor {
    /// Build a client for `url` with a request timeout.
    ///
    /// A blank `url` yields a client that always reports
    /// [`PredictorError::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`PredictorError::Http`] if the underlying client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, PredictorError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("carbonmeter/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        let url = Some(url.trim().to_string()).filter(|u| !u.is_empty());
        Ok(Self { http, url })
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

impl Predictor for HttpPredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, PredictorError> {
        let Some(url) = self.url.as_deref() else {
            return Err(PredictorError::Unavailable("no predictor url configured".into()));
        };

        tracing::debug!(
            url,
            sector = %request.sector,
            points = request.trailing_series.len(),
            "requesting forecast"
        );
        let resp = check_response(self.http.post(url).json(request).send().await?).await?;
        let body = resp.text().await?;
        let prediction: Prediction =
            serde_json::from_str(&body).map_err(|e| PredictorError::Parse(e.to_string()))?;
        prediction.validate()
    }
}

/// A predictor that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflinePredictor;

impl Predictor for OfflinePredictor {
    async fn predict(&self, _request: &PredictionRequest) -> Result<Prediction, PredictorError> {
        Err(PredictorError::Unavailable("running offline".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURE: &str = r#"{
        "predicted_value": 4.25,
        "confidence": 0.82,
        "scope_split": {"scope1": 0.2, "scope2": 0.5, "scope3": 0.3}
    }"#;

    fn request() -> PredictionRequest {
        PredictionRequest {
            sector: "IT".into(),
            trailing_series: vec![3.0, 4.0, 5.0],
            employee_count: Some(120),
        }
    }

    /// A server answering every POST to `/predict` with `response`.
    async fn oracle(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    fn client(server: &MockServer, timeout: Duration) -> HttpPredictor {
        HttpPredictor::new(&format!("{}/predict", server.uri()), timeout).unwrap()
    }

    #[test]
    fn fixture_parses_named_split() {
        let prediction: Prediction = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(prediction.predicted_value, 4.25);
        assert_eq!(prediction.confidence, Some(0.82));
        assert_eq!(
            prediction.scope_split.map(ScopeSplit::shares),
            Some([0.2, 0.5, 0.3])
        );
    }

    #[test]
    fn array_split_and_missing_fields_parse() {
        let prediction: Prediction =
            serde_json::from_str(r#"{"predicted_value": 2.0, "scope_split": [1, 1, 2]}"#).unwrap();
        assert_eq!(prediction.confidence, None);
        assert_eq!(
            prediction.scope_split.and_then(ScopeSplit::normalized),
            Some([0.25, 0.25, 0.5])
        );
    }

    #[test]
    fn degenerate_split_is_rejected() {
        assert_eq!(ScopeSplit::Ordered([0.0, 0.0, 0.0]).normalized(), None);
        assert_eq!(ScopeSplit::Ordered([-1.0, 1.0, 1.0]).normalized(), None);
    }

    #[test]
    fn negative_prediction_is_invalid() {
        let prediction = Prediction {
            predicted_value: -1.0,
            confidence: None,
            scope_split: None,
        };
        assert!(matches!(
            prediction.validate(),
            Err(PredictorError::InvalidPrediction(_))
        ));
    }

    #[tokio::test]
    async fn blank_url_is_unavailable() {
        let predictor = HttpPredictor::new("  ", Duration::from_secs(1)).unwrap();
        assert!(!predictor.is_configured());
        let err = predictor.predict(&request()).await.unwrap_err();
        assert!(matches!(err, PredictorError::Unavailable(_)));
    }

    #[tokio::test]
    async fn offline_is_unavailable() {
        let err = OfflinePredictor.predict(&request()).await.unwrap_err();
        assert!(matches!(err, PredictorError::Unavailable(_)));
    }

    #[tokio::test]
    async fn request_body_carries_sector_series_and_headcount() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "sector": "IT",
                "trailing_series": [3.0, 4.0, 5.0],
                "employee_count": 120
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(FIXTURE, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let prediction = client(&server, Duration::from_secs(5))
            .predict(&request())
            .await
            .unwrap();
        assert_eq!(prediction.predicted_value, 4.25);
        assert_eq!(prediction.confidence, Some(0.82));
    }

    #[tokio::test]
    async fn missing_headcount_is_sent_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "sector": "Retail",
                "trailing_series": [],
                "employee_count": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predicted_value": 1.5})))
            .expect(1)
            .mount(&server)
            .await;

        let body = PredictionRequest {
            sector: "Retail".into(),
            trailing_series: Vec::new(),
            employee_count: None,
        };
        let prediction = client(&server, Duration::from_secs(5))
            .predict(&body)
            .await
            .unwrap();
        assert_eq!(prediction.predicted_value, 1.5);
        assert_eq!(prediction.scope_split, None);
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server =
            oracle(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"}))).await;
        let err = client(&server, Duration::from_secs(5))
            .predict(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn garbage_body_is_parse_error() {
        let server = oracle(ResponseTemplate::new(200).set_body_string("not json")).await;
        let err = client(&server, Duration::from_secs(5))
            .predict(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::Parse(_)));
    }

    #[tokio::test]
    async fn negative_answer_is_invalid() {
        let answer = json!({"predicted_value": -3.0});
        let server = oracle(ResponseTemplate::new(200).set_body_json(answer)).await;
        let err = client(&server, Duration::from_secs(5))
            .predict(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::InvalidPrediction(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let predictor =
            HttpPredictor::new(&format!("http://{addr}/predict"), Duration::from_secs(2)).unwrap();
        let err = predictor.predict(&request()).await.unwrap_err();
        assert!(matches!(err, PredictorError::Http(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let server = oracle(
            ResponseTemplate::new(200)
                .set_body_raw(FIXTURE, "application/json")
                .set_delay(Duration::from_secs(30)),
        )
        .await;
        let err = client(&server, Duration::from_millis(200))
            .predict(&request())
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
    }
}
