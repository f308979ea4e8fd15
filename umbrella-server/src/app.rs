//! HTTP layer: routes, response shapes and error-to-status mapping.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use umbrella_core::{ReportError, ReportProvider, UmbrellaReport};

pub const APP_NAME: &str = "MyUmbrella";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state handed to every request. The provider is bound once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    provider: Option<Arc<dyn ReportProvider>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ReportProvider>) -> Self {
        info!("Umbrella report provider is now set to {provider:?}");
        Self { provider: Some(provider) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(view_root))
        .route("/myumbrella", get(view_umbrella))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(bind: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {bind}"))?;

    info!("{APP_NAME} v.{APP_VERSION} listening on http://{bind}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Body of `GET /myumbrella`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyUmbrellaResponse {
    pub city: String,
    pub state: String,
    pub country: String,
    pub weather: String,
    pub umbrella_needed: bool,
}

impl From<UmbrellaReport> for MyUmbrellaResponse {
    fn from(report: UmbrellaReport) -> Self {
        // Unknown weather: better carry an umbrella for nothing than get wet.
        let umbrella_needed = report.umbrella_needed().unwrap_or_else(|err| {
            warn!("{err} -> umbrella_needed set to true");
            true
        });

        let location = report.location;
        Self {
            city: location.city,
            state: location.state,
            country: location.country,
            weather: report.weather.to_string(),
            umbrella_needed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UmbrellaQuery {
    city: String,
}

async fn view_root() -> String {
    format!("Welcome to {APP_NAME} v.{APP_VERSION}!")
}

async fn view_umbrella(
    State(state): State<AppState>,
    Query(query): Query<UmbrellaQuery>,
) -> Result<Json<MyUmbrellaResponse>, ApiError> {
    let provider = state.provider.as_ref().ok_or(ApiError::ProviderNotConfigured)?;

    info!("Getting umbrella report for city: {}", query.city);
    let report = provider.get_report(&query.city).await?;

    Ok(Json(MyUmbrellaResponse::from(report)))
}

#[derive(Debug)]
enum ApiError {
    ProviderNotConfigured,
    Report(ReportError),
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Report(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::ProviderNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Report(ReportError::LocationNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Report(ReportError::Timeout(_) | ReportError::Unreachable(_)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ApiError::Report(ReportError::BadResponse(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::ProviderNotConfigured => {
                "UmbrellaReportProvider has no provider!".to_string()
            }
            ApiError::Report(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            error!("{status}: {detail}");
        } else {
            warn!("{status}: {detail}");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::collections::HashMap;
    use tower::ServiceExt;
    use umbrella_core::{Location, WeatherState};

    #[derive(Debug)]
    struct FakeProvider {
        reports: HashMap<String, UmbrellaReport>,
    }

    impl FakeProvider {
        fn with(reports: Vec<UmbrellaReport>) -> Arc<dyn ReportProvider> {
            let reports = reports
                .into_iter()
                .map(|r| (r.location.city.clone(), r))
                .collect();
            Arc::new(Self { reports })
        }
    }

    #[async_trait]
    impl ReportProvider for FakeProvider {
        async fn get_report(&self, place: &str) -> Result<UmbrellaReport, ReportError> {
            self.reports
                .get(place)
                .cloned()
                .ok_or_else(|| ReportError::LocationNotFound(place.to_string()))
        }
    }

    #[derive(Debug)]
    struct FailingProvider(fn() -> ReportError);

    #[async_trait]
    impl ReportProvider for FailingProvider {
        async fn get_report(&self, _place: &str) -> Result<UmbrellaReport, ReportError> {
            Err((self.0)())
        }
    }

    fn test_report(weather: WeatherState) -> UmbrellaReport {
        UmbrellaReport::new(
            Location {
                city: "testcity".to_string(),
                state: "teststate".to_string(),
                country: "testcountry".to_string(),
                ..Location::default()
            },
            weather,
        )
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(state, uri).await;
        (status, serde_json::from_slice(&body).expect("JSON body"))
    }

    #[tokio::test]
    async fn root_welcomes_with_name_and_version() {
        let (status, body) = get(AppState::default(), "/").await;
        let text = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(text.contains(APP_NAME));
        assert!(text.contains(APP_VERSION));
    }

    #[tokio::test]
    async fn myumbrella_returns_report() {
        let state = AppState::new(FakeProvider::with(vec![test_report(WeatherState::Clear)]));

        let (status, body) = get_json(state, "/myumbrella?city=testcity").await;

        assert_eq!(status, StatusCode::OK);
        let response: MyUmbrellaResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            response,
            MyUmbrellaResponse {
                city: "testcity".to_string(),
                state: "teststate".to_string(),
                country: "testcountry".to_string(),
                weather: "Clear".to_string(),
                umbrella_needed: false,
            }
        );
    }

    #[tokio::test]
    async fn myumbrella_needs_umbrella_in_rain() {
        let state = AppState::new(FakeProvider::with(vec![test_report(WeatherState::Rain)]));

        let (status, body) = get_json(state, "/myumbrella?city=testcity").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weather"], "Rain");
        assert_eq!(body["umbrella_needed"], true);
    }

    #[tokio::test]
    async fn myumbrella_assumes_umbrella_on_unknown_weather() {
        let state = AppState::new(FakeProvider::with(vec![test_report(WeatherState::Unknown)]));

        let (status, body) = get_json(state, "/myumbrella?city=testcity").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weather"], "Unknown");
        assert_eq!(body["umbrella_needed"], true);
    }

    #[tokio::test]
    async fn myumbrella_unknown_city_is_not_found() {
        let state = AppState::new(FakeProvider::with(vec![]));

        let (status, body) = get_json(state, "/myumbrella?city=atlantis").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["detail"],
            ReportError::LocationNotFound("atlantis".to_string()).to_string()
        );
    }

    #[tokio::test]
    async fn myumbrella_timeout_is_gateway_timeout() {
        let state = AppState::new(Arc::new(FailingProvider(|| {
            ReportError::Timeout("OpenWeather API is unreachable".to_string())
        })));

        let (status, body) = get_json(state, "/myumbrella?city=timeoutcity").await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body["detail"].as_str().unwrap().contains("OpenWeather API is unreachable"));
    }

    #[tokio::test]
    async fn myumbrella_unreachable_is_gateway_timeout() {
        let state = AppState::new(Arc::new(FailingProvider(|| {
            ReportError::Unreachable("connection refused".to_string())
        })));

        let (status, _) = get_json(state, "/myumbrella?city=x").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn myumbrella_bad_upstream_answer_is_bad_gateway() {
        let state = AppState::new(Arc::new(FailingProvider(|| {
            ReportError::BadResponse("garbage".to_string())
        })));

        let (status, _) = get_json(state, "/myumbrella?city=x").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn myumbrella_without_provider_is_internal_error() {
        let (status, body) = get_json(AppState::default(), "/myumbrella?city=testcity").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "UmbrellaReportProvider has no provider!");
    }

    #[tokio::test]
    async fn myumbrella_requires_city() {
        let state = AppState::new(FakeProvider::with(vec![]));

        let (status, _) = get(state, "/myumbrella").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
