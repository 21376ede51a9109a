//! Remote RPC surface for the EOTS manager.
//!
//! A narrow request/response protocol mirroring [`eots_manager::EotsManager`]
//! one-for-one: length-prefixed bincode frames over TCP. The server runs one
//! tokio task per connection; the client is a blocking `TcpStream` that
//! satisfies the same `EotsManager` trait as the local manager, so callers
//! are agnostic of which side of the wire they hold.

pub mod client;
pub mod messages;
pub mod server;

pub use client::EotsManagerRpcClient;
pub use messages::{RpcRequest, RpcResponse, WireError, MAX_FRAME_SIZE};
pub use server::RpcServer;
