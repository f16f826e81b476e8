//! Desktop platform adapters using tokio

mod scheduler;
mod transport;

pub use scheduler::TokioScheduler;
pub use transport::TungsteniteTransport;
