//! Session wiring
//!
//! Connects one [`ConnectionManager`] to one [`RenderSurface`]: every
//! `"state"` frame is drawn as it arrives, and container resizes rescale the
//! surface.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use microbiome_protocol::{FrameData, STATE_EVENT};

use crate::error::RenderError;
use crate::infrastructure::render::RenderSurface;
use crate::infrastructure::websocket::ConnectionManager;
use crate::ports::outbound::{ContainerPort, DrawingContextPort};

pub struct Session<C>
where
    C: DrawingContextPort + Send + 'static,
{
    connection: ConnectionManager,
    surface: Arc<Mutex<RenderSurface<C>>>,
    frames_drawn: Arc<AtomicU64>,
}

impl<C> Session<C>
where
    C: DrawingContextPort + Send + 'static,
{
    /// Route `"state"` frames from `connection` onto `surface`.
    ///
    /// Render failures are logged; they never reach the connection.
    pub fn start(connection: ConnectionManager, surface: RenderSurface<C>) -> Self {
        let surface = Arc::new(Mutex::new(surface));
        let frames_drawn = Arc::new(AtomicU64::new(0));

        let handler_surface = Arc::clone(&surface);
        let handler_frames = Arc::clone(&frames_drawn);
        connection.route_typed(STATE_EVENT, move |frame: FrameData| {
            let result = lock(&handler_surface).draw(&frame);
            match result {
                Ok(painted) => {
                    let n = handler_frames.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::debug!(
                        "Frame {}: {} npcs, {} food, {} painted",
                        n,
                        frame.npcs.len(),
                        frame.food.len(),
                        painted
                    );
                }
                Err(e) => tracing::error!("Failed to draw frame: {}", e),
            }
        });

        Self {
            connection,
            surface,
            frames_drawn,
        }
    }

    /// Rescale the surface to the container's current size.
    pub fn resize(&self, container: &dyn ContainerPort) -> Result<(), RenderError> {
        lock(&self.surface).scale(container)
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Locked access to the surface.
    ///
    /// Frames arriving while the guard is held wait for it.
    pub fn surface(&self) -> MutexGuard<'_, RenderSurface<C>> {
        lock(&self.surface)
    }

    /// Frames drawn without error.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn.load(Ordering::Relaxed)
    }

    /// Stop drawing and close the connection.
    pub fn end(self) {
        self.connection.unroute(STATE_EVENT);
        self.connection.close();
        tracing::info!("Session ended after {} frames", self.frames_drawn());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use microbiome_protocol::Position;

    use crate::config::ReconnectConfig;
    use crate::infrastructure::messaging::ConnectionState;
    use crate::infrastructure::render::{
        FilledCircle, RecordingContext, StaticContainer, StaticDisplay,
    };
    use crate::infrastructure::testing::{FakeTransport, ManualScheduler};

    fn start(density: f64) -> (Session<RecordingContext>, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::new());
        let connection = ConnectionManager::open(
            "ws://localhost:3000/ws",
            ReconnectConfig::default(),
            transport.clone(),
            Arc::new(ManualScheduler::new()),
        );
        let mut surface = RenderSurface::new(Box::new(StaticDisplay::new(density)));
        surface
            .bind(&StaticContainer::new(500.0, 500.0), RecordingContext::new())
            .expect("bind");

        let session = Session::start(connection, surface);
        transport.accept();
        (session, transport)
    }

    fn circles(session: &Session<RecordingContext>) -> Vec<FilledCircle> {
        session
            .surface()
            .context()
            .expect("bound")
            .filled_circles()
    }

    #[test]
    fn test_state_frame_is_drawn() {
        let (session, transport) = start(1.0);
        transport.deliver(
            r#"{"event":"state","data":{
                "npcs":[],
                "food":[{"pos":[10,10],"radius":5,"color":"green","mass":1}],
                "elapsed":12.5
            }}"#,
        );

        assert_eq!(session.frames_drawn(), 1);
        assert_eq!(
            circles(&session),
            vec![FilledCircle::new(Position::new(10.0, 10.0), 5.0, "green")]
        );
    }

    #[test]
    fn test_bad_frame_keeps_previous_picture() {
        let (session, transport) = start(1.0);
        transport.deliver(
            r#"{"event":"state","data":{"npcs":[{"pos":[1,2],"radius":3,"color":"red"}],"food":[]}}"#,
        );
        transport.deliver(r#"{"event":"state","data":{"npcs":[{"pos":"here"}]}}"#);

        assert_eq!(session.frames_drawn(), 1);
        assert_eq!(circles(&session).len(), 1);
        assert_eq!(session.connection().state(), ConnectionState::Connected);
    }

    #[test]
    fn test_resize_rescales_surface() {
        let (session, _transport) = start(2.0);
        session
            .resize(&StaticContainer::new(320.0, 240.0))
            .expect("resize");

        let surface = session.surface();
        assert_eq!(surface.physical_size().width, 640);
        assert_eq!(surface.physical_size().height, 480);
    }

    #[test]
    fn test_end_closes_connection() {
        let (session, transport) = start(1.0);
        let connection = session.connection().clone();
        session.end();

        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(!connection.router().contains(STATE_EVENT));
        assert_eq!(transport.close_count(), 1);
    }
}
