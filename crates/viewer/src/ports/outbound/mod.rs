//! Outbound ports - Interfaces for platform services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! so the connection state machine and the render pass can be driven without a
//! real socket, timer or canvas.

pub mod scheduler_port;
pub mod surface_port;
pub mod transport_port;

pub use scheduler_port::{ReconnectJob, ReconnectSchedulerPort};
pub use surface_port::{
    ContainerPort, DisplayMetricsPort, DrawingContextPort, LogicalSize, PhysicalSize,
};
pub use transport_port::{TransportEventSink, TransportEvents, TransportPort};

#[cfg(any(test, feature = "testing"))]
pub use surface_port::{MockContainerPort, MockDisplayMetricsPort};
#[cfg(any(test, feature = "testing"))]
pub use transport_port::MockTransportPort;
