//! End-to-end: text frames in, circles on the surface out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use microbiome_protocol::Position;
use microbiome_viewer::infrastructure::render::{
    FilledCircle, RecordingContext, StaticContainer, StaticDisplay,
};
use microbiome_viewer::infrastructure::testing::{FakeTransport, ManualScheduler};
use microbiome_viewer::{
    ClientError, ConnectionManager, ConnectionState, ReconnectConfig, RenderSurface, Session,
};

struct Viewer {
    session: Session<RecordingContext>,
    transport: Arc<FakeTransport>,
    scheduler: Arc<ManualScheduler>,
    issues: Arc<Mutex<Vec<String>>>,
}

fn viewer(width: f64, height: f64, density: f64) -> Viewer {
    let transport = Arc::new(FakeTransport::new());
    let scheduler = Arc::new(ManualScheduler::new());
    let connection = ConnectionManager::open(
        "ws://localhost:3000/ws",
        ReconnectConfig::default(),
        transport.clone(),
        scheduler.clone(),
    );

    let issues = Arc::new(Mutex::new(Vec::new()));
    let issues_clone = Arc::clone(&issues);
    connection.set_on_issue(move |issue: &ClientError| {
        issues_clone.lock().expect("lock").push(issue.to_string());
    });

    let mut surface = RenderSurface::new(Box::new(StaticDisplay::new(density)));
    surface
        .bind(&StaticContainer::new(width, height), RecordingContext::new())
        .expect("bind");

    Viewer {
        session: Session::start(connection, surface),
        transport,
        scheduler,
        issues,
    }
}

impl Viewer {
    fn device_circles(&self) -> Vec<FilledCircle> {
        self.session
            .surface()
            .context()
            .expect("bound")
            .device_circles()
    }
}

#[test]
fn state_frame_renders_at_device_resolution() {
    let v = viewer(400.0, 300.0, 2.0);
    v.transport.accept();
    v.transport.deliver(
        r#"{"event":"state","data":{"agent":{"pos":[200,150],"radius":8,"color":"blue"},"npcs":[{"pos":[10,10],"radius":5,"color":"red","vel":[0.5,-1]}],"food":[]}}"#,
    );

    let surface = v.session.surface();
    assert_eq!(surface.physical_size().width, 800);
    assert_eq!(surface.physical_size().height, 600);
    drop(surface);

    assert_eq!(
        v.device_circles(),
        vec![FilledCircle::new(Position::new(20.0, 20.0), 10.0, "red")]
    );
    assert!(v.issues.lock().expect("lock").is_empty());
}

#[test]
fn frames_survive_a_reconnect() {
    let v = viewer(100.0, 100.0, 1.0);
    v.transport.accept();
    v.transport.deliver(
        r#"{"event":"state","data":{"npcs":[],"food":[{"pos":[1,1],"radius":1,"color":"green"}]}}"#,
    );

    v.transport.drop_connection();
    assert_eq!(
        v.session.connection().state(),
        ConnectionState::Reconnecting
    );
    assert_eq!(
        v.scheduler.scheduled_delays(),
        vec![Duration::from_millis(2_000)]
    );

    assert!(v.scheduler.fire());
    v.transport.accept();
    assert_eq!(v.session.connection().state(), ConnectionState::Connected);
    assert_eq!(v.session.connection().attempts(), 0);

    v.transport.deliver(
        r#"{"event":"state","data":{"npcs":[{"pos":[2,2],"radius":1,"color":"red"}],"food":[]}}"#,
    );
    assert_eq!(v.session.frames_drawn(), 2);
    assert_eq!(
        v.device_circles(),
        vec![FilledCircle::new(Position::new(2.0, 2.0), 1.0, "red")]
    );
}

#[test]
fn unknown_events_and_garbage_are_reported_not_fatal() {
    let v = viewer(100.0, 100.0, 1.0);
    v.transport.accept();
    v.transport.deliver(r#"{"event":"stats","data":{}}"#);
    v.transport.deliver("definitely not json");

    let issues = v.issues.lock().expect("lock").clone();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0], "No handler for event `stats`");
    assert!(issues[1].starts_with("Failed to decode message"));
    assert_eq!(v.session.connection().state(), ConnectionState::Connected);
}

#[test]
fn ending_the_session_stops_reconnecting() {
    let v = viewer(100.0, 100.0, 1.0);
    v.transport.accept();
    v.transport.drop_connection();
    assert!(v.scheduler.has_pending());

    let connection = v.session.connection().clone();
    v.session.end();

    assert!(!v.scheduler.has_pending());
    assert!(v.scheduler.fire_cancelled());
    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert_eq!(v.transport.open_count(), 1);
}

#[test]
fn gives_up_after_five_attempts() {
    let v = viewer(100.0, 100.0, 1.0);
    for _ in 0..5 {
        v.transport.drop_connection();
        assert!(v.scheduler.fire());
    }
    v.transport.drop_connection();

    assert_eq!(v.session.connection().state(), ConnectionState::Failed);
    assert!(!v.scheduler.has_pending());
    assert_eq!(
        *v.issues.lock().expect("lock"),
        vec!["Max reconnection attempts reached (5)".to_string()]
    );

    // An explicit connect starts over.
    v.session.connection().connect();
    assert_eq!(v.session.connection().state(), ConnectionState::Connecting);
    assert_eq!(v.transport.open_count(), 7);
}
