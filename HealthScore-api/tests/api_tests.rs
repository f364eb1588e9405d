use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Once;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use health_score_api::api::create_application;
use health_score_api::config::AppConfig;
use health_score_domain::models::ScoringProfile;

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn app_with(config: AppConfig) -> Router {
    initialize();
    create_application(config).expect("application should start")
}

fn app() -> Router {
    app_with(AppConfig::default())
}

/// A panel with every biomarker inside its reference range
fn healthy_panel(sex: &str) -> Value {
    json!({
        "glucose": 88.0,
        "hba1c": 5.0,
        "systolic_bp": 110.0,
        "diastolic_bp": 70.0,
        "ldl": 80.0,
        "hdl": 60.0,
        "triglycerides": 100.0,
        "haemoglobin": 14.0,
        "mcv": 90.0,
        "sex": sex,
    })
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn is_flagged(body: &Value, biomarker: &str) -> bool {
    body["flagged"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b == biomarker)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["scoring_profile"]["status"], "ok");
}

#[tokio::test]
async fn test_healthy_panel_scores_maximum() {
    let (status, body) = post(app(), "/api/v1/health-score", healthy_panel("female")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_score"], 100.0);
    assert_eq!(body["risk_tier"], "Low");
    assert_eq!(body["profile_version"], "v1");
    assert_eq!(body["sub_scores"]["diabetes"], 100.0);
    assert_eq!(body["sub_scores"]["cardiovascular"], 100.0);
    assert_eq!(body["sub_scores"]["anemia"], 100.0);
    assert_eq!(body["biomarkers"].as_array().unwrap().len(), 9);
    assert!(body["flagged"].as_array().unwrap().is_empty());
    assert!(body["assessment_id"].is_string());
}

#[tokio::test]
async fn test_hdl_range_depends_on_sex() {
    let mut female = healthy_panel("female");
    female["hdl"] = json!(45.0);
    let (status, body) = post(app(), "/api/v1/health-score", female).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!is_flagged(&body, "hdl"));

    let mut male = healthy_panel("male");
    male["hdl"] = json!(45.0);
    let (status, body) = post(app(), "/api/v1/health-score", male).await;
    assert_eq!(status, StatusCode::OK);
    assert!(is_flagged(&body, "hdl"));
    assert!(body["overall_score"].as_f64().unwrap() < 100.0);
}

#[tokio::test]
async fn test_glucose_boundary() {
    let mut at_limit = healthy_panel("male");
    at_limit["glucose"] = json!(99.0);
    let (_, body) = post(app(), "/api/v1/health-score", at_limit).await;
    assert!(!is_flagged(&body, "glucose"));

    let mut above = healthy_panel("male");
    above["glucose"] = json!(100.0);
    let (_, body) = post(app(), "/api/v1/health-score", above).await;
    assert!(is_flagged(&body, "glucose"));
}

#[tokio::test]
async fn test_worse_values_lower_the_score() {
    let mut previous = f64::MAX;
    for glucose in [95.0, 110.0, 130.0, 160.0, 250.0] {
        let mut panel = healthy_panel("female");
        panel["glucose"] = json!(glucose);
        let (_, body) = post(app(), "/api/v1/health-score", panel).await;
        let score = body["overall_score"].as_f64().unwrap();
        assert!(score <= previous, "score rose from {} to {} at glucose {}", previous, score, glucose);
        previous = score;
    }
}

#[tokio::test]
async fn test_missing_field_is_rejected() {
    let mut panel = healthy_panel("female");
    panel.as_object_mut().unwrap().remove("glucose");

    let (status, body) = post(app(), "/api/v1/health-score", panel).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"]["field"], "glucose");
}

#[tokio::test]
async fn test_negative_field_is_rejected() {
    let mut panel = healthy_panel("female");
    panel["ldl"] = json!(-5.0);

    let (status, body) = post(app(), "/api/v1/health-score", panel).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "ldl");
    assert_eq!(body["details"]["reason"], "value must not be negative");
}

#[tokio::test]
async fn test_unrecognized_sex_is_rejected() {
    let (status, body) = post(app(), "/api/v1/health-score", healthy_panel("unknown")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "sex");
}

#[tokio::test]
async fn test_non_numeric_value_is_bad_request() {
    let mut panel = healthy_panel("female");
    panel["glucose"] = json!("high");

    let (status, body) = post(app(), "/api/v1/health-score", panel).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_batch_scores_each_record_independently() {
    let mut bad = healthy_panel("male");
    bad["mcv"] = json!(-1.0);

    let request = json!({ "records": [healthy_panel("female"), bad, healthy_panel("male")] });
    let (status, body) = post(app(), "/api/v1/health-score/batch", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], 3);
    assert_eq!(body["scored_records"], 2);
    assert_eq!(body["failed_records"], 1);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["result"]["overall_score"], 100.0);
    assert_eq!(results[1]["index"], 1);
    assert_eq!(results[1]["error"]["field"], "mcv");
    assert!(results[1].get("result").is_none());
    assert_eq!(results[2]["result"]["risk_tier"], "Low");
}

#[tokio::test]
async fn test_batch_imputation_fills_missing_values() {
    let mut incomplete = healthy_panel("female");
    incomplete.as_object_mut().unwrap().remove("hba1c");

    let request = json!({
        "records": [healthy_panel("female"), incomplete, healthy_panel("male")],
        "impute_missing": true,
    });
    let (status, body) = post(app(), "/api/v1/health-score/batch", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imputed_values"], 1);
    assert_eq!(body["failed_records"], 0);
}

#[tokio::test]
async fn test_batch_winsorizing_keeps_negative_record_rejected() {
    let mut records: Vec<Value> = (0..10).map(|_| healthy_panel("male")).collect();
    records[0]["mcv"] = json!(-1.0);

    let request = json!({
        "records": records,
        "winsorize": { "lower": 0.1, "upper": 0.9 },
    });
    let (status, body) = post(app(), "/api/v1/health-score/batch", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failed_records"], 1);
    assert_eq!(body["winsorized_values"], 0);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["error"]["field"], "mcv");
    assert!(results[0].get("result").is_none());
}

#[tokio::test]
async fn test_batch_echoes_condition_labels() {
    let mut labelled = healthy_panel("female");
    labelled["condition"] = json!(" type 2 diabetes");

    let request = json!({ "records": [labelled, healthy_panel("male")] });
    let (status, body) = post(app(), "/api/v1/health-score/batch", request).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["condition"], "Type 2 Diabetes");
    assert!(results[1].get("condition").is_none());
}

#[tokio::test]
async fn test_batch_rejects_invalid_winsorize_limits() {
    let request = json!({
        "records": [healthy_panel("female")],
        "winsorize": { "lower": 0.9, "upper": 0.1 },
    });
    let (status, body) = post(app(), "/api/v1/health-score/batch", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let (status, body) = post(app(), "/api/v1/health-score/batch", json!({ "records": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_batch_size_limit() {
    let config = AppConfig {
        max_batch_size: 2,
        ..AppConfig::default()
    };
    let records: Vec<Value> = (0..3).map(|_| healthy_panel("female")).collect();

    let (status, body) = post(app_with(config), "/api/v1/health-score/batch", json!({ "records": records })).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "payload_too_large");
}

#[tokio::test]
async fn test_data_quality_report() {
    let mut sparse = healthy_panel("female");
    sparse.as_object_mut().unwrap().remove("ldl");
    sparse.as_object_mut().unwrap().remove("hdl");

    let mut implausible = healthy_panel("male");
    implausible["glucose"] = json!(900.0);

    let request = json!({ "records": [healthy_panel("female"), sparse, implausible] });
    let (status, body) = post(app(), "/api/v1/data-quality", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], 3);

    let records = body["records"].as_array().unwrap();
    assert_eq!(records[0]["quality_score"], 100);
    assert_eq!(records[1]["missing_values"], 2);
    assert_eq!(records[1]["quality_score"], 90);
    assert_eq!(records[2]["implausible_values"], 1);

    let biomarkers = body["biomarkers"].as_array().unwrap();
    assert_eq!(biomarkers.len(), 9);
    assert_eq!(biomarkers[0]["biomarker"], "glucose");
    assert_eq!(biomarkers[0]["implausible_count"], 1);
}

#[tokio::test]
async fn test_data_quality_reports_condition_labels() {
    let mut anemic = healthy_panel("female");
    anemic["condition"] = json!("ANEMIA ");
    let mut blank = healthy_panel("male");
    blank["condition"] = json!("");

    let request = json!({ "records": [anemic, blank, healthy_panel("male"), healthy_panel("female")] });
    let (status, body) = post(app(), "/api/v1/data-quality", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["condition_missing_percentage"], 75.0);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records[0]["condition"], "Anemia");
    assert_eq!(records[0]["quality_score"], 100);
    assert!(records[1].get("condition").is_none());
}

#[tokio::test]
async fn test_reference_ranges() {
    let (status, body) = get(app(), "/api/v1/reference-ranges?sex=female").await;
    assert_eq!(status, StatusCode::OK);
    let ranges = body["ranges"].as_array().unwrap();
    assert_eq!(ranges.len(), 9);
    let hdl = ranges.iter().find(|r| r["biomarker"] == "hdl").unwrap();
    assert_eq!(hdl["lower"], 40.0);

    let (status, body) = get(app(), "/api/v1/reference-ranges").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ranges"].as_array().unwrap().len(), 11);

    let (status, _) = get(app(), "/api/v1/reference-ranges?sex=other").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scoring_profile_endpoint() {
    let (status, body) = get(app(), "/api/v1/scoring-profile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "v1");
    assert_eq!(body["clip_bound"], 1.0);
    assert_eq!(body["conditions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_profile_file_is_activated() {
    let mut profile = ScoringProfile::default();
    profile.version = "v2-integration".to_string();
    profile.clip_bound = 2.0;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&profile).unwrap().as_bytes()).unwrap();

    let config = AppConfig {
        scoring_profile_path: Some(file.path().to_path_buf()),
        ..AppConfig::default()
    };
    let app = app_with(config);

    let (_, body) = get(app.clone(), "/api/v1/scoring-profile").await;
    assert_eq!(body["version"], "v2-integration");

    let (_, body) = post(app, "/api/v1/health-score", healthy_panel("male")).await;
    assert_eq!(body["profile_version"], "v2-integration");
}

#[tokio::test]
async fn test_profile_file_conflicting_with_builtin_version_fails_startup() {
    initialize();
    let mut profile = ScoringProfile::default();
    profile.clip_bound = 3.0;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&profile).unwrap().as_bytes()).unwrap();

    let config = AppConfig {
        scoring_profile_path: Some(file.path().to_path_buf()),
        ..AppConfig::default()
    };
    assert!(create_application(config).is_err());
}

#[tokio::test]
async fn test_missing_profile_file_fails_startup() {
    initialize();
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        scoring_profile_path: Some(dir.path().join("no_such_profile.json")),
        ..AppConfig::default()
    };
    assert!(create_application(config).is_err());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = get(app(), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/health-score"].is_object());
}
