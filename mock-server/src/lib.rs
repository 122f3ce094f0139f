//! In-process mock of a remote-control device.
//!
//! Serves the keypress, launch, and query endpoints, records every accepted
//! keypress and launch in order, and can hold each response for a
//! configurable delay to exercise client timeouts.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

/// Keys the mock accepts by name, in addition to `Lit_<char>`.
pub const NAMED_KEYS: &[&str] = &[
    "Home",
    "Rev",
    "Fwd",
    "Play",
    "Select",
    "Left",
    "Right",
    "Down",
    "Up",
    "Back",
    "InstantReplay",
    "Info",
    "Backspace",
    "Search",
    "Enter",
    "VolumeDown",
    "VolumeUp",
    "VolumeMute",
    "PowerOff",
];

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct App {
    pub id: String,
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Launch {
    pub app_id: String,
    pub query: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DeviceState {
    pub presses: Vec<String>,
    pub launches: Vec<Launch>,
    pub active_app: Option<String>,
}

struct Inner {
    apps: Vec<App>,
    state: RwLock<DeviceState>,
    delay_ms: AtomicU64,
}

/// Shared handle to the mock's state. Clones observe the same device.
#[derive(Clone)]
pub struct Device {
    inner: Arc<Inner>,
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl Device {
    pub fn new() -> Self {
        let apps = vec![
            App {
                id: "12".to_string(),
                name: "Netflix".to_string(),
                version: "4.1.218".to_string(),
            },
            App {
                id: "837".to_string(),
                name: "YouTube".to_string(),
                version: "2.19.7".to_string(),
            },
            App {
                id: "dev".to_string(),
                name: "Dev Channel".to_string(),
                version: "1.0.1".to_string(),
            },
        ];
        Self {
            inner: Arc::new(Inner {
                apps,
                state: RwLock::new(DeviceState::default()),
                delay_ms: AtomicU64::new(0),
            }),
        }
    }

    /// Hold every response for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.inner
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn apps(&self) -> &[App] {
        &self.inner.apps
    }

    pub async fn snapshot(&self) -> DeviceState {
        self.inner.state.read().await.clone()
    }

    /// Snapshot from outside an async context.
    pub fn snapshot_blocking(&self) -> DeviceState {
        self.inner.state.blocking_read().clone()
    }

    async fn pause(&self) {
        let ms = self.inner.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

pub fn is_valid_key(key: &str) -> bool {
    if let Some(rest) = key.strip_prefix("Lit_") {
        return rest.chars().count() == 1;
    }
    NAMED_KEYS.contains(&key)
}

/// Router over a fresh device.
pub fn app() -> Router {
    router(Device::new())
}

pub fn router(device: Device) -> Router {
    Router::new()
        .route("/keypress/{key}", post(keypress))
        .route("/launch/{app_id}", post(launch))
        .route("/query/device-info", get(device_info))
        .route("/query/apps", get(apps))
        .route("/query/active-app", get(active_app))
        .with_state(device)
}

pub async fn run(listener: TcpListener, device: Device) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock device listening");
    }
    axum::serve(listener, router(device)).await
}

fn xml(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], body)
}

async fn keypress(State(device): State<Device>, Path(key): Path<String>) -> StatusCode {
    device.pause().await;
    if !is_valid_key(&key) {
        debug!(%key, "rejected keypress");
        return StatusCode::BAD_REQUEST;
    }
    debug!(%key, "keypress");
    device.inner.state.write().await.presses.push(key);
    StatusCode::OK
}

async fn launch(
    State(device): State<Device>,
    Path(app_id): Path<String>,
    RawQuery(query): RawQuery,
) -> StatusCode {
    device.pause().await;
    if !device.apps().iter().any(|a| a.id == app_id) {
        return StatusCode::NOT_FOUND;
    }
    let mut state = device.inner.state.write().await;
    state.active_app = Some(app_id.clone());
    state.launches.push(Launch { app_id, query });
    StatusCode::OK
}

async fn device_info(State(device): State<Device>) -> impl IntoResponse {
    device.pause().await;
    xml(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n",
        "<device-info>\n",
        "  <udn>00000000-0000-0000-0000-000000000000</udn>\n",
        "  <vendor-name>Mock</vendor-name>\n",
        "  <model-name>Mock Player</model-name>\n",
        "  <friendly-device-name>Living Room</friendly-device-name>\n",
        "  <power-mode>PowerOn</power-mode>\n",
        "</device-info>\n"
    )
    .to_string())
}

async fn apps(State(device): State<Device>) -> impl IntoResponse {
    device.pause().await;
    xml(render_apps(device.apps()))
}

async fn active_app(State(device): State<Device>) -> impl IntoResponse {
    device.pause().await;
    let active = device.inner.state.read().await.active_app.clone();
    let current = active.and_then(|id| device.apps().iter().find(|a| a.id == id).cloned());
    let inner = match current {
        Some(app) => app_element(&app),
        None => "  <app>Home</app>\n".to_string(),
    };
    xml(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<active-app>\n{inner}</active-app>\n"
    ))
}

fn app_element(app: &App) -> String {
    format!(
        "  <app id=\"{}\" version=\"{}\">{}</app>\n",
        app.id, app.version, app.name
    )
}

fn render_apps(apps: &[App]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<apps>\n");
    for app in apps {
        out.push_str(&app_element(app));
    }
    out.push_str("</apps>\n");
    out
}
