mod server_config;
mod error;

use server_config::AppConfig;
use error::ServerError;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use log::info;

use asset_transfer::{host, AssetService, Function, JsonStore, MemoryStore};

const SERVER_CONFIG: &str = "resources/server.toml";

struct AppState {
    service: AssetService,
    world_state: Mutex<MemoryStore>,
    store: JsonStore,
    next_tx: AtomicU64
}

type SharedState = Arc<AppState>;

impl AppState {
    /// Runs one invocation. Writes reach the shared world state only after
    /// they have been saved to the state file.
    fn invoke(&self, function: Function, args: &[String]) -> Result<Vec<u8>, ServerError> {
        let tx_id = format!("srv-{}", self.next_tx.fetch_add(1, Ordering::Relaxed));
        let mut world_state = self.world_state.lock()
            .map_err(|_| anyhow!("world state lock poisoned"))?;

        let outcome = host::invoke_and_persist(&self.service, &mut *world_state, &tx_id, function, args,
            |staged| self.store.save(staged))?;
        Ok(outcome.payload)
    }
}

/// Invocation arguments: a JSON array of strings. An empty body means no
/// arguments.
fn parse_args(body: &[u8]) -> Result<Vec<String>, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body)
        .map_err(|err| ServerError::BadRequest(format!("arguments must be a JSON array of strings: {}", err)))
}

async fn index() -> &'static str {
    "asset-transfer"
}

async fn list_functions() -> Json<Vec<&'static str>> {
    Json(Function::ALL.iter().map(Function::name).collect())
}

async fn invoke(
    State(app): State<SharedState>,
    Path(function): Path<String>,
    body: Bytes
) -> Result<Vec<u8>, ServerError> {
    let function: Function = function.parse()?;
    let args = parse_args(&body)?;

    tokio::task::spawn_blocking(move || app.invoke(function, &args))
        .await
        .map_err(|err| anyhow!("invocation task failed: {}", err))?
}

fn app(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/functions", get(list_functions))
        .route("/invoke/:function", post(invoke))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| SERVER_CONFIG.to_string());
    let config = AppConfig::read(&config_path)
        .with_context(|| format!("failed to read app configuration from {}", config_path))?;

    let store = JsonStore::new(&config.state_file);
    let mut world_state = store.read()
        .with_context(|| "failed to load world state")?;

    let service = AssetService::new();
    if config.seed_on_start && world_state.is_empty() {
        host::invoke_and_persist(&service, &mut world_state, "startup", Function::InitLedger, &[],
            |staged| store.save(staged))?;
    }
    info!("loaded {} assets from {}", world_state.len(), config.state_file.display());

    let state = Arc::new(AppState {
        service,
        world_state: Mutex::new(world_state),
        store,
        next_tx: AtomicU64::new(0)
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("listening on {}", config.bind);
    axum::serve(listener, app(state)).await?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::{app, AppState, SharedState};

    use std::path::PathBuf;
    use std::sync::atomic::AtomicU64;
    use std::sync::{Arc, Mutex};

    use asset_transfer::{AssetService, JsonStore, MemoryStore};
    use axum::{body::{self, Body}, http::{Request, StatusCode}, Router};
    use rstest::{fixture, rstest};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        dir: TempDir,
        state: SharedState
    }

    #[fixture]
    fn test_app() -> TestApp {
        let dir = TempDir::new().unwrap();
        let state = app_with_state_file(dir.path().join("state.json"));
        TestApp { dir, state }
    }

    fn app_with_state_file(state_file: PathBuf) -> SharedState {
        Arc::new(AppState {
            service: AssetService::new(),
            world_state: Mutex::new(MemoryStore::new()),
            store: JsonStore::new(state_file),
            next_tx: AtomicU64::new(0)
        })
    }

    async fn call(router: Router, function: &str, args: Value) -> (StatusCode, Vec<u8>) {
        send(router, function, args.to_string()).await
    }

    async fn send(router: Router, function: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
        let request = Request::post(format!("/invoke/{}", function))
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[rstest]
    #[tokio::test]
    async fn seed_and_list(test_app: TestApp) {
        let (status, _) = call(app(test_app.state.clone()), "InitLedger", json!([])).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(app(test_app.state.clone()), "GetAllAssets", json!([])).await;
        assert_eq!(status, StatusCode::OK);
        let entries: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(entries.len(), 10);

        // committed writes are persisted
        let on_disk = JsonStore::new(test_app.dir.path().join("state.json")).read().unwrap();
        assert_eq!(on_disk.len(), 10);
    }

    #[rstest]
    #[tokio::test]
    async fn error_statuses(test_app: TestApp) {
        let (status, _) = call(app(test_app.state.clone()), "ReadAsset", json!(["missing"])).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(app(test_app.state.clone()), "CreateAsset", json!(["{\"name\":\"X\"}"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(app(test_app.state.clone()), "ReadAsset", json!([])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(app(test_app.state.clone()), "Nope", json!([])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // nothing was committed, so nothing was written
        assert!(!test_app.dir.path().join("state.json").exists());
    }

    #[rstest]
    #[tokio::test]
    async fn create_and_read_back(test_app: TestApp) {
        let payload = r#"{"ID":"42","name":"X"}"#;
        let (status, body) = call(app(test_app.state.clone()), "CreateAsset", json!([payload])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, payload.as_bytes());

        let (status, body) = call(app(test_app.state.clone()), "ReadAsset", json!(["42"])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, payload.as_bytes());
    }

    #[rstest]
    #[tokio::test]
    async fn failed_save_is_not_visible(test_app: TestApp) {
        let state = app_with_state_file(test_app.dir.path().join("missing_dir").join("state.json"));

        let (status, _) = call(app(state.clone()), "CreateAsset", json!(["{\"ID\":\"42\"}"])).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = call(app(state.clone()), "ReadAsset", json!(["42"])).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(state.world_state.lock().unwrap().is_empty());
    }

    #[rstest]
    #[case("{\"not\": \"an array\"}")]
    #[case("[1, 2]")]
    #[case("not json")]
    #[tokio::test]
    async fn malformed_arguments_are_rejected(test_app: TestApp, #[case] body: &'static str) {
        let (status, message) = send(app(test_app.state.clone()), "InitLedger", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&message).contains("JSON array of strings"));

        assert!(test_app.state.world_state.lock().unwrap().is_empty());
        assert!(!test_app.dir.path().join("state.json").exists());
    }

    #[rstest]
    #[tokio::test]
    async fn empty_body_means_no_arguments(test_app: TestApp) {
        let (status, _) = send(app(test_app.state.clone()), "InitLedger", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(test_app.state.world_state.lock().unwrap().len(), 10);

        let (status, message) = send(app(test_app.state.clone()), "ReadAsset", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&message).contains("takes 1 arguments, got 0"));
    }
}
