//! Domain models shared by the persistence service and the assistant.
//!
//! - [`Todo`]: the single record type the persistence service manages.
//! - [`McpRequest`] / [`McpResponse`]: the method-name RPC envelope spoken
//!   between the assistant and the persistence service.

mod rpc;
mod todo;

pub use rpc::*;
pub use todo::*;
