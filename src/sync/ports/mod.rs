//! Port contracts for the remote data service.
//!
//! Ports define infrastructure-agnostic interfaces used by sync services.

pub mod remote;
pub mod stream;

pub use remote::{RemoteError, RemoteResult, RemoteTable};
pub use stream::{ChangeSink, ChangeStream, change_channel};
