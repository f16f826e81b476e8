//! Headless desktop viewer
//!
//! Draws every frame into a [`RecordingContext`] and logs what it painted.
//! Useful for watching a simulation server from a terminal.

use std::sync::Arc;

use anyhow::Context;

use crate::config::ViewerConfig;
use crate::infrastructure::render::{RecordingContext, RenderSurface, StaticContainer, StaticDisplay};
use crate::infrastructure::websocket::{ConnectionManager, PlatformScheduler, PlatformTransport};
use crate::session::Session;

/// Load `.env.local` then `.env` from the repository root, if present.
///
/// Variables already set in the environment win.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

/// Start a headless session from `config`.
///
/// Must be called inside a tokio runtime.
pub fn start_headless(config: &ViewerConfig) -> anyhow::Result<Session<RecordingContext>> {
    let mut surface = RenderSurface::new(Box::new(StaticDisplay::new(config.pixel_density)));
    surface
        .bind(
            &StaticContainer::new(config.width, config.height),
            RecordingContext::new(),
        )
        .context("Failed to bind headless surface")?;

    let connection = ConnectionManager::new(
        config.ws_url.clone(),
        config.reconnect,
        Arc::new(PlatformTransport::new()),
        Arc::new(PlatformScheduler::new()),
    );
    connection.set_on_issue(|issue| {
        if issue.is_terminal() {
            tracing::error!("Giving up on the server; restart the viewer to try again");
        }
    });

    let session = Session::start(connection, surface);
    session.connection().connect();
    Ok(session)
}

/// Run a headless session until Ctrl-C.
pub async fn run_headless(config: ViewerConfig) -> anyhow::Result<()> {
    let session = start_headless(&config)?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down");
    session.end();
    Ok(())
}
