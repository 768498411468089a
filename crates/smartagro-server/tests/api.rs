use std::io::{Cursor, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use clap::Parser;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use smartagro_ai::{AiError, CropHealthLabels, ImageTensor, LeafClassifier, ModelRegistry, TabularModel};
use smartagro_core::{LEAF_CLASSES, NUM_LEAF_CLASSES, RawTelemetryRow};
use smartagro_server::{AppState, Config, app};
use smartagro_store::{CsvTelemetry, StoreError, TelemetrySource};
use tower::ServiceExt;

const BOUNDARY: &str = "smartagro-test-boundary";

struct Winner {
    index: usize,
    confidence: f32,
    calls: Arc<AtomicUsize>,
}

impl LeafClassifier for Winner {
    fn predict(&self, _input: &ImageTensor) -> Result<Vec<f32>, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rest = (1.0 - self.confidence) / (NUM_LEAF_CLASSES as f32 - 1.0);
        let mut scores = vec![rest; NUM_LEAF_CLASSES];
        scores[self.index] = self.confidence;
        Ok(scores)
    }
}

struct Fixed(f64);

impl TabularModel for Fixed {
    fn predict(&self, _features: &[f32]) -> Result<f64, AiError> {
        Ok(self.0)
    }
}

struct StaticRow(RawTelemetryRow);

impl TelemetrySource for StaticRow {
    fn sample(&self) -> Result<RawTelemetryRow, StoreError> {
        Ok(self.0.clone())
    }
}

fn stressed_row() -> RawTelemetryRow {
    RawTelemetryRow::new()
        .with("Soil Moisture (%)", 25.0)
        .with("Soil Temp (°C)", 45.0)
        .with("Humidity (%)", 85.0)
        .with("Solar Irradiance (W/m²)", 250.0)
        .with("Light (Lux)", 5000.0)
}

fn full_registry(leaf_index: usize, calls: Arc<AtomicUsize>) -> ModelRegistry {
    ModelRegistry::new()
        .with_leaf_classifier(Winner {
            index: leaf_index,
            confidence: 0.9,
            calls,
        })
        .with_irrigation(Fixed(1.0))
        .with_solar_output(Fixed(412.3456))
        .with_crop_health(Fixed(0.8))
        .with_crop_labels(CropHealthLabels::new(vec!["Good".into(), "Poor".into()]))
}

fn config(args: &[&str]) -> Config {
    Config::parse_from(std::iter::once("smartagro").chain(args.iter().copied()))
}

fn router(registry: ModelRegistry, telemetry: impl TelemetrySource + 'static) -> Router {
    router_with(config(&[]), registry, telemetry)
}

fn router_with(
    config: Config,
    registry: ModelRegistry,
    telemetry: impl TelemetrySource + 'static,
) -> Router {
    app(Arc::new(AppState::new(config, registry, telemetry))).unwrap()
}

fn png() -> Vec<u8> {
    let img = RgbImage::from_pixel(160, 120, Rgb([60, 150, 70]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn multipart(field: &str, filename: Option<&str>, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    write!(body, "--{BOUNDARY}\r\n").unwrap();
    match filename {
        Some(name) => write!(
            body,
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .unwrap(),
        None => write!(body, "Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").unwrap(),
    }
    body.extend_from_slice(content);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn analyze_diagnoses_a_leaf() {
    let idx = LEAF_CLASSES
        .iter()
        .position(|c| *c == "Tomato___Bacterial_spot")
        .unwrap();
    let app = router(full_registry(idx, Arc::default()), StaticRow(stressed_row()));

    let (status, body) = send(app, multipart("image", Some("leaf.png"), &png())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Tomato___Bacterial_spot");
    assert_eq!(body["diseaseRisk"], 90);
    assert_eq!(body["growthStage"], "Vegetative");
    assert_eq!(body["affectedStage"], "Leaves");
    assert_eq!(body["message"], "Analysis complete");
    assert!((body["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-5);
}

#[tokio::test]
async fn analyze_without_classifier_is_a_server_error() {
    let app = router(ModelRegistry::new(), StaticRow(stressed_row()));
    let (status, body) = send(app, multipart("image", Some("leaf.png"), &png())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Model not available, server configuration issue");
}

#[tokio::test]
async fn analyze_rejects_bad_uploads() {
    let cases = [
        (multipart("photo", Some("leaf.png"), &png()), "No image file part in the request"),
        (multipart("image", None, b"not a file"), "No image file part in the request"),
        (multipart("image", Some(""), &png()), "No selected file"),
        (multipart("image", Some("leaf.gif"), &png()), "Invalid file type."),
        (
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .body(Body::empty())
                .unwrap(),
            "No image file part in the request",
        ),
    ];

    for (request, expected) in cases {
        let app = router(full_registry(0, Arc::default()), StaticRow(stressed_row()));
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(body["error"], expected);
    }
}

#[tokio::test]
async fn undecodable_image_never_reaches_the_classifier() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = router(full_registry(0, calls.clone()), StaticRow(stressed_row()));

    let (status, body) = send(app, multipart("image", Some("leaf.jpg"), b"plain text")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "An unexpected error occurred during image processing"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let app = router_with(
        config(&["--max-upload-bytes", "1024"]),
        full_registry(0, Arc::default()),
        StaticRow(stressed_row()),
    );
    let (status, _) = send(app, multipart("image", Some("leaf.png"), &[0u8; 8192])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn analyze_data_reports_predictions_and_advice() {
    let app = router(full_registry(0, Arc::default()), StaticRow(stressed_row()));
    let (status, body) = send(app, empty("POST", "/api/analyze-data")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["soil"], 25.0);
    assert_eq!(body["temperature"], 45.0);
    assert_eq!(body["humidity"], 85.0);
    assert_eq!(body["irradiance"], 250.0);
    assert_eq!(body["light"], 5000.0);
    assert_eq!(body["irrigation"], "Yes");
    assert_eq!(body["irrigation_needed"], "Yes");
    assert_eq!(body["solar_output"], 412.35);
    assert_eq!(body["crop_health"], "Poor");

    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 6);
    assert_eq!(
        suggestions[0],
        "💧 Soil moisture is low. Irrigation recommended."
    );
    assert_eq!(suggestions[5], "💧 Model predicts irrigation is required.");
}

#[tokio::test]
async fn analyze_datas_omits_suggestions() {
    let app = router(full_registry(0, Arc::default()), StaticRow(stressed_row()));
    let (status, body) = send(app, empty("GET", "/api/analyze-datas")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["irrigation"], "Yes");
    assert!(body.get("suggestions").is_none());
    assert!(body.get("irrigation_needed").is_none());
}

#[tokio::test]
async fn analyze_data_reads_the_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        "Soil Moisture (%),Soil Temp (°C),Humidity (%),Solar Irradiance (W/m²),Light (Lux)\n\
         55,22,50,500,40000\n"
            .as_bytes(),
    )
    .unwrap();
    let registry = full_registry(0, Arc::default()).with_irrigation(Fixed(0.0));
    let app = router(registry, CsvTelemetry::new(file.path()));

    let (status, body) = send(app, empty("POST", "/api/analyze-data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["soil"], 55.0);
    assert_eq!(body["irrigation"], "No");
    assert!(body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn analyze_data_failures_use_message_key() {
    let app = router(
        full_registry(0, Arc::default()),
        CsvTelemetry::new("/nonexistent/telemetry.csv"),
    );
    let (status, body) = send(app, empty("POST", "/api/analyze-data")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().starts_with("Error: "));

    let app = router(ModelRegistry::new(), StaticRow(stressed_row()));
    let (status, body) = send(app, empty("GET", "/api/analyze-datas")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not available"));
}

#[tokio::test]
async fn health_reports_model_availability() {
    let registry = ModelRegistry::new().with_irrigation(Fixed(0.0));
    let app = router(registry, StaticRow(stressed_row()));
    let (status, body) = send(app, empty("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models"]["irrigation"], true);
    assert_eq!(body["models"]["leaf_classifier"], false);
    assert_eq!(body["models"]["crop_health_labels"], false);
}

#[tokio::test]
async fn cors_allows_the_front_end_with_credentials() {
    let app = router(ModelRegistry::new(), StaticRow(stressed_row()));
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
