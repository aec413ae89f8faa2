//! Concurrent dispatch engine for Herald push services.
//!
//! [`DispatchEngine`] runs one push for any [`PushGateway`]: it checks the
//! provider's token, encodes the message once, fans sends out over a bounded
//! worker pool, and streams exactly one result per destination back to the
//! caller.
//!
//! [`PushGateway`]: herald_provider::PushGateway

pub mod batch;
pub mod config;
pub mod dispatch;

pub use batch::execute_batch;
pub use config::ExecutorConfig;
pub use dispatch::DispatchEngine;
