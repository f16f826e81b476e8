//! Microbiome Viewer - binary entry point.

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use microbiome_viewer::infrastructure::platform::desktop;

    // Load environment from repo root.
    desktop::load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microbiome_viewer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Microbiome Viewer");

    let config = microbiome_viewer::ViewerConfig::from_env()?;
    tracing::info!("Server: {}", config.ws_url);

    desktop::run_headless(config).await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    tracing::info!("Starting Microbiome Viewer");

    if let Err(e) = microbiome_viewer::infrastructure::platform::web::mount("viewer") {
        tracing::error!("Failed to mount viewer: {:?}", e);
    }
}
