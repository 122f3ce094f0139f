use std::time::{Duration, Instant};

use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, Device, Launch};
use tower::ServiceExt;

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post(uri: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- keypress ---

#[tokio::test]
async fn keypress_named_key_is_recorded() {
    let device = Device::new();
    let resp = router(device.clone())
        .oneshot(post("/keypress/Home"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(device.snapshot().await.presses, vec!["Home"]);
}

#[tokio::test]
async fn keypress_literal_is_percent_decoded() {
    let device = Device::new();
    let resp = router(device.clone())
        .oneshot(post("/keypress/Lit_%20"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(device.snapshot().await.presses, vec!["Lit_ "]);
}

#[tokio::test]
async fn keypress_unknown_key_returns_400() {
    let device = Device::new();
    let resp = router(device.clone())
        .oneshot(post("/keypress/Teleport"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(device.snapshot().await.presses.is_empty());
}

#[tokio::test]
async fn keypress_requires_post() {
    let resp = app().oneshot(get("/keypress/Home")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- launch ---

#[tokio::test]
async fn launch_known_app_sets_active_app() {
    let device = Device::new();
    let resp = router(device.clone())
        .oneshot(post("/launch/12?contentId=abc%20123&mediaType=movie"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let state = device.snapshot().await;
    assert_eq!(state.active_app.as_deref(), Some("12"));
    assert_eq!(
        state.launches,
        vec![Launch {
            app_id: "12".to_string(),
            query: Some("contentId=abc%20123&mediaType=movie".to_string()),
        }]
    );
}

#[tokio::test]
async fn launch_unknown_app_returns_404() {
    let device = Device::new();
    let resp = router(device.clone())
        .oneshot(post("/launch/99999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(device.snapshot().await.launches.is_empty());
}

// --- query ---

#[tokio::test]
async fn device_info_is_xml() {
    let resp = app().oneshot(get("/query/device-info")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/xml; charset=utf-8"
    );
    let body = body_text(resp).await;
    assert!(body.contains("<device-info>"));
    assert!(body.contains("<model-name>Mock Player</model-name>"));
}

#[tokio::test]
async fn apps_lists_every_installed_app() {
    let device = Device::new();
    let resp = router(device.clone())
        .oneshot(get("/query/apps"))
        .await
        .unwrap();

    let body = body_text(resp).await;
    for app in device.apps() {
        assert!(body.contains(&format!(">{}</app>", app.name)), "missing {}", app.name);
    }
}

#[tokio::test]
async fn active_app_defaults_to_home() {
    let resp = app().oneshot(get("/query/active-app")).await.unwrap();
    let body = body_text(resp).await;
    assert!(body.contains("<app>Home</app>"));
}

// --- delay ---

#[tokio::test]
async fn delay_holds_the_response() {
    let device = Device::new();
    device.set_delay(Duration::from_millis(50));
    let started = Instant::now();
    let resp = router(device).oneshot(get("/query/apps")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(50));
}

// --- full remote session ---

#[tokio::test]
async fn launch_then_type_then_query_active_app() {
    use tower::Service;

    let device = Device::new();
    let mut svc = router(device.clone()).into_service();

    for uri in ["/launch/837", "/keypress/Lit_4", "/keypress/Lit_2", "/keypress/Select"] {
        let resp = ServiceExt::ready(&mut svc)
            .await
            .unwrap()
            .call(post(uri))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let resp = ServiceExt::ready(&mut svc)
        .await
        .unwrap()
        .call(get("/query/active-app"))
        .await
        .unwrap();
    let body = body_text(resp).await;
    assert!(body.contains("YouTube"));

    let state = device.snapshot().await;
    assert_eq!(state.presses, vec!["Lit_4", "Lit_2", "Select"]);
}
