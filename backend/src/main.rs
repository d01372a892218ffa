use std::sync::Arc;

use backend::{server, state::AppState, types::Environment};
use image_store::{lifecycle::ImageLifecycle, resize::PixelResizer, store::ObjectStore};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON format for staging/production log shipping, regular format for
    // development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let store = ObjectStore::open(environment.store_config())?;
    let lifecycle = Arc::new(ImageLifecycle::new(store, Arc::new(PixelResizer::new())));

    let state = AppState {
        lifecycle,
        api_keys: Arc::new(environment.api_keys()),
    };

    server::start(state).await
}
