pub mod context;
pub mod gateway;
pub mod registry;
pub mod service;

pub use context::PushContext;
pub use gateway::PushGateway;
pub use registry::{PushServiceRegistry, SERVICE_TYPE_KEY};
pub use service::{DynPushService, PushService, required};

// Outbound W3C Trace Context injection — requires reqwest.
#[cfg(feature = "trace-context")]
pub mod trace_context;
#[cfg(feature = "trace-context")]
pub use trace_context::inject_trace_context;
