use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use lottie_motion::MotionDefaults;
use lottie_motion_cli::server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const DOT_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 40">
  <circle id="dot" cx="20" cy="20" r="8" fill="#3366ff"/>
</svg>"##;

fn app() -> Router {
    router(AppState::new(MotionDefaults::default()))
}

fn payload() -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        BASE64_STANDARD.encode(DOT_SVG)
    )
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_convert(body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/convert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(request).await
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Request::builder().uri(uri).body(Body::empty()).expect("request")).await
}

#[tokio::test]
async fn test_health_and_types() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "SVG to Animated Lottie Converter API");

    let (status, body) = get("/animation-types").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default"], "fade_in");
    let types = body["available_types"].as_array().unwrap();
    assert_eq!(types.len(), 6);
    assert!(types.contains(&json!("complex")));
}

#[tokio::test]
async fn test_unknown_route_lists_endpoints() {
    let (status, body) = get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["available_endpoints"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_convert_template() {
    let (status, body) = post_convert(json!({
        "base64_svg": payload(),
        "animation_type": "rotate",
        "fps": 24,
        "duration": 48
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fr"], 24.0);
    assert_eq!(body["op"], 48.0);
    assert_eq!(body["w"], 40);
    let rotation = &body["layers"][0]["ks"]["r"];
    assert_eq!(rotation["a"], 1);
    assert_eq!(rotation["k"][1]["t"], 48.0);
    assert_eq!(rotation["k"][1]["s"], json!([360.0]));
}

#[tokio::test]
async fn test_convert_complex_effects() {
    let (status, body) = post_convert(json!({
        "base64_svg": payload(),
        "animation_type": "complex",
        "custom_effects": {
            "appear": { "effect": "fade_in", "start": 0, "end": 20 },
            "grow": { "effect": "scale_up", "start": 10, "end": 40 }
        }
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["op"], 40.0);
    let ks = &body["layers"][0]["ks"];
    assert_eq!(ks["o"]["a"], 1);
    assert_eq!(ks["s"]["a"], 1);
    assert_eq!(ks["r"]["a"], 0);
}

#[tokio::test]
async fn test_convert_rejects_bad_input() {
    let (status, body) = post_convert(json!({ "animation_type": "fade_in" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field");

    let (status, body) = post_convert(json!({
        "base64_svg": payload(),
        "animation_type": "spin"
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid animation type");
    assert_eq!(body["provided"], "spin");

    let (status, body) = post_convert(json!({ "base64_svg": payload(), "fps": -5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid fps value");

    let (status, body) = post_convert(json!({ "base64_svg": "%%%" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input data");
    assert_eq!(body["kind"], "invalid_svg");

    let request = Request::builder()
        .method("POST")
        .uri("/convert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .expect("request");
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No JSON data provided");
}

#[tokio::test]
async fn test_convert_conflicting_effects_is_unprocessable() {
    let (status, body) = post_convert(json!({
        "base64_svg": payload(),
        "animation_type": "complex",
        "custom_effects": {
            "appear": { "effect": "fade_in", "start": 0, "end": 30 },
            "reappear": { "effect": "fade_in", "start": 20, "end": 50 }
        }
    }))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Conversion failed");
    assert_eq!(body["kind"], "conflicting_effect_window");

    let (status, body) = post_convert(json!({
        "base64_svg": payload(),
        "animation_type": "complex"
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "missing_custom_effects");
}
