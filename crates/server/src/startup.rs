use std::{env, net::SocketAddr, path::Path};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::{images::ImageStore, meals::MealStore, runtime, vendors::VendorStore};

use crate::routes;
use crate::state::AppState;
use crate::variant::ServiceVariant;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load configuration, falling back to defaults when `config.toml` is
/// absent. Env overrides (`DATA_DIR`, `ASSETS_DIR`) apply either way.
fn load_config() -> anyhow::Result<configs::AppConfig> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(_) => {
            let mut cfg = configs::AppConfig::default();
            cfg.normalize_and_validate()?;
            Ok(cfg)
        }
    }
}

/// Bind address: config value, overridable per variant via env vars.
fn load_bind_addr(variant: ServiceVariant, cfg: &configs::AppConfig) -> anyhow::Result<SocketAddr> {
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| cfg.server.host.clone());
    let port = env::var(variant.port_env())
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or_else(|| variant.port(&cfg.server));
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app for the given variant and run the HTTP
/// server. Both variants point at the same storage directory, so the two
/// processes share one set of collections.
pub async fn run(variant: ServiceVariant) -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config()?;
    let storage = cfg.storage.clone();
    runtime::ensure_env(Path::new(&storage.assets_dir), Path::new(&storage.data_dir)).await?;

    // Collection stores; constructors create header-only files if missing
    let vendors = VendorStore::new(storage.vendor_file()).await?;
    let meals = MealStore::new(storage.meal_file(), variant.rate_policy()).await?;
    let images = ImageStore::new(storage.img_dir()).await?;
    let state = AppState {
        vendors,
        meals,
        images,
    };

    let app: Router = routes::build_router(
        state,
        variant,
        build_cors(),
        Path::new(&storage.assets_dir),
    );

    let addr = load_bind_addr(variant, &cfg)?;
    info!(%addr, ?variant, "starting lunch tracker service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
