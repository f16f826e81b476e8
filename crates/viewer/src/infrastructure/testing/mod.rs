//! In-memory port implementations.
//!
//! Drive the connection manager and the render surface without a real
//! socket, timer or canvas. Used by unit tests here and by the integration
//! tests under `tests/`.

pub mod fake_transport;
pub mod manual_scheduler;

pub use fake_transport::FakeTransport;
pub use manual_scheduler::ManualScheduler;
