//! HTTP handler functions for the dashboard API.

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use income_crime_analytics::{AnalyticsError, DEFAULT_PREVIEW_ROWS, DashboardSession};
use income_crime_dataset::DatasetError;
use income_crime_server_models::{ApiError, ApiHealth, ApiRecords, FilterQueryParams};
use serde::Serialize;

use crate::AppState;

/// Answers an unparseable query string with a JSON `400`.
pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected query: {err}");
    let response = HttpResponse::BadRequest().json(ApiError {
        error: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

fn bad_request(e: &AnalyticsError) -> HttpResponse {
    log::warn!("Rejected filter: {e}");
    HttpResponse::BadRequest().json(ApiError {
        error: e.to_string(),
    })
}

fn unavailable(e: &DatasetError) -> HttpResponse {
    log::error!("Dataset unavailable: {e}");
    HttpResponse::ServiceUnavailable().json(ApiError {
        error: e.to_string(),
    })
}

/// Builds a session whose filters are the defaults overlaid with `params`.
fn session_for(
    state: &AppState,
    params: &FilterQueryParams,
) -> Result<DashboardSession, HttpResponse> {
    let dataset = state.dataset().map_err(|e| unavailable(&e))?;
    let mut session = DashboardSession::new(dataset);
    let filters = params.to_state(session.defaults());
    session.apply_state(filters).map_err(|e| bad_request(&e))?;
    Ok(session)
}

fn page_response<T: Serialize>(
    state: &AppState,
    params: &FilterQueryParams,
    page: impl FnOnce(&DashboardSession) -> T,
) -> HttpResponse {
    match session_for(state, params) {
        Ok(session) => HttpResponse::Ok().json(page(&session)),
        Err(response) => response,
    }
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.dataset() {
        Ok(dataset) => HttpResponse::Ok().json(ApiHealth {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            records: dataset.len(),
        }),
        Err(e) => unavailable(&e),
    }
}

/// `GET /api/filters`
///
/// Returns the filter control bounds, options and defaults.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    match state.dataset() {
        Ok(dataset) => HttpResponse::Ok().json(DashboardSession::new(dataset).filter_options()),
        Err(e) => unavailable(&e),
    }
}

/// `GET /api/records`
///
/// Returns the first `limit` filtered records (five by default).
pub async fn records(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let limit = params.limit.unwrap_or(DEFAULT_PREVIEW_ROWS);
    page_response(&state, &params, |session| ApiRecords {
        matched: session.filtered().len(),
        records: session.preview(limit),
    })
}

/// `GET /api/key-insights`
pub async fn key_insights(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    page_response(&state, &params, DashboardSession::key_insights)
}

/// `GET /api/crime`
pub async fn crime(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    page_response(&state, &params, DashboardSession::crime_page)
}

/// `GET /api/income`
pub async fn income(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    page_response(&state, &params, DashboardSession::income_page)
}

/// `GET /api/heatmaps`
pub async fn heatmaps(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    page_response(&state, &params, DashboardSession::heatmaps_page)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::http::StatusCode;
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{App, test};
    use income_crime_dataset::progress::{ProgressCallback, null_progress};
    use income_crime_dataset::{DataSource, DatasetCache};
    use income_crime_dataset_models::{BRACKET_COUNT, Record};
    use serde_json::Value;

    use super::*;
    use crate::configure;

    fn record(city: &str, year: i32, month: u8, category: &str, total_crimes: u64) -> Record {
        Record {
            city: city.to_string(),
            year,
            month,
            zip: format!("{city}-1"),
            latitude: 41.9,
            longitude: -87.6,
            offense_category: category.to_string(),
            total_crimes,
            households: 1_000.0,
            median_income: 55_000.0,
            brackets: [10.0; BRACKET_COUNT],
        }
    }

    /// Serves a fixed record list and counts how often it is read.
    struct FixedSource {
        records: Vec<Record>,
        loads: Arc<AtomicUsize>,
    }

    impl DataSource for FixedSource {
        fn describe(&self) -> String {
            "fixed".to_string()
        }

        fn load_records(
            &self,
            _progress: &Arc<dyn ProgressCallback>,
        ) -> Result<Vec<Record>, DatasetError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    fn cache_with(records: Vec<Record>, loads: &Arc<AtomicUsize>) -> Arc<DatasetCache> {
        Arc::new(DatasetCache::new(Box::new(FixedSource {
            records,
            loads: Arc::clone(loads),
        })))
    }

    fn app_state() -> web::Data<AppState> {
        let records = vec![
            record("Chicago", 2017, 3, "Theft", 4),
            record("Chicago", 2018, 3, "Theft", 5),
            record("Chicago", 2018, 8, "Assault", 2),
            record("Seattle", 2018, 5, "Theft", 7),
            record("Seattle", 2018, 9, "Assault", 1),
            record("Seattle", 2018, 11, "Theft", 3),
            record("Seattle", 2018, 12, "Theft", 6),
        ];
        let cache = cache_with(records, &Arc::new(AtomicUsize::new(0)));
        cache.get_or_load(&null_progress()).unwrap();
        web::Data::new(AppState { cache })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn health_reports_record_count() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["records"], 7);
    }

    #[actix_web::test]
    async fn filters_expose_bounds_and_defaults() {
        let (status, body) = get_json("/api/filters").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["yearBounds"], serde_json::json!([2017, 2018]));
        assert_eq!(body["offenseCategories"][0], "All Categories");
        assert_eq!(body["defaults"]["yearRange"], serde_json::json!([2018, 2018]));
        assert_eq!(body["cities"], serde_json::json!(["Chicago", "Seattle"]));
    }

    #[actix_web::test]
    async fn records_default_to_five_rows() {
        let (status, body) = get_json("/api/records").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], 6);
        assert_eq!(body["records"].as_array().unwrap().len(), 5);
        assert_eq!(body["records"][0]["city"], "Chicago");
        assert_eq!(body["records"][0]["totalCrimes"], 5);
    }

    #[actix_web::test]
    async fn records_honor_limit_and_filters() {
        let (_, body) = get_json("/api/records?cities=Seattle&category=Theft&limit=2").await;
        assert_eq!(body["matched"], 3);
        assert_eq!(body["records"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn key_insights_scenario() {
        let (status, body) =
            get_json("/api/key-insights?yearFrom=2018&yearTo=2018&cities=Chicago").await;
        assert_eq!(status, StatusCode::OK);
        let summary = body["citySummary"].as_array().unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0]["city"], "Chicago");
        assert_eq!(summary[0]["totalCrimes"], 7);
    }

    #[actix_web::test]
    async fn empty_cities_param_yields_empty_pages() {
        let (status, body) = get_json("/api/crime?cities=").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["crimeTrend"].as_array().unwrap().is_empty());
        assert!(body["categoryTable"]["cells"].as_array().unwrap().is_empty());

        let (_, body) = get_json("/api/heatmaps?cities=").await;
        assert!(body["cities"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn income_page_lists_ten_brackets_per_city() {
        let (status, body) = get_json("/api/income?cities=Seattle").await;
        assert_eq!(status, StatusCode::OK);
        let shares = body["bracketDistribution"].as_array().unwrap();
        assert_eq!(shares.len(), BRACKET_COUNT);
        assert_eq!(shares[0]["bracket"], "<10K");
    }

    #[actix_web::test]
    async fn heatmaps_include_map_view() {
        let (_, body) = get_json("/api/heatmaps?cities=Chicago").await;
        let city = &body["cities"][0];
        assert_eq!(city["city"], "Chicago");
        assert!(city["view"]["zoom"].is_number());
        assert_eq!(city["crimePoints"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn reversed_range_is_bad_request() {
        let (status, body) = get_json("/api/crime?monthFrom=9&monthTo=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("month range"));
    }

    #[actix_web::test]
    async fn unknown_category_is_bad_request() {
        let (status, _) = get_json("/api/income?category=Arson").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unparseable_query_is_json_bad_request() {
        let app = test::init_service(App::new().app_data(app_state()).configure(configure)).await;

        for uri in [
            "/api/crime?monthFrom=abc",
            "/api/crime?monthFrom=300",
            "/api/records?limit=-1",
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            assert_eq!(content_type.as_deref(), Some("application/json"), "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{uri}");
        }
    }

    #[actix_web::test]
    async fn requests_share_one_cached_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = cache_with(vec![record("Chicago", 2018, 1, "Theft", 2)], &loads);
        let state = web::Data::new(AppState { cache });
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        for uri in ["/api/health", "/api/crime", "/api/income"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn failing_source_is_service_unavailable() {
        let cache = cache_with(Vec::new(), &Arc::new(AtomicUsize::new(0)));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { cache }))
                .configure(configure),
        )
        .await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/api/crime").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("no rows"));
    }
}
