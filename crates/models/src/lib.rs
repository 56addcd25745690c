//! Models module - the language models behind the NPCs
//!
//! Model inference is an external collaborator. The game core produces
//! [`ModelRequest`](types::ModelRequest)s; this crate gets them answered,
//! either by a model service over TCP or by deterministic offline stand-ins.
//!
//! # Protocol Overview
//!
//! A **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome` listing
//!    the tasks it serves
//! 3. **Requests**: client sends `request`, server answers `response` or
//!    `error`, both carrying the `request_seq` they answer
//!
//! # Environment Variables
//!
//! - `BEAR_MODEL_HOST`: service host (default: "127.0.0.1")
//! - `BEAR_MODEL_PORT`: service port (default: 7878)
//! - `BEAR_MODEL_TIMEOUT_MS`: per-request timeout (default: 20000)
//! - `BEAR_MODEL_DISABLED`: set to "1" or "true" to answer everything offline
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"tui-bear","version":"0.1.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","server":"tui-bear-model-stub","tasks":["conversational","questionAnswering","fillMask","textGeneration"]}
//! Client -> Server: {"type":"request","seq":2,"ts":1700000000002,"request":{"task":"fillMask","text":"I like <mask>.","top_k":5}}
//! Server -> Client: {"type":"response","seq":2,"ts":1700000000003,"request_seq":2,"output":{"task":"fillMask","candidates":[...]}}
//! ```
//!
//! # Implementation
//!
//! - [`responder`]: the `Responder` seam every model backend implements
//! - [`offline`]: deterministic responders for all four tasks
//! - [`client`] / [`server`]: tokio TCP ends of the protocol
//! - [`runtime`]: sync/async bridge used by the game loop, falling back to
//!   the offline responders when the service fails
//!
//! # Testing
//!
//! Run `model-stub` and talk to it with netcat:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod offline;
pub mod protocol;
pub mod responder;
pub mod runtime;
pub mod server;

pub use tui_bear_core as core;
pub use tui_bear_types as types;

pub use client::ModelClient;
pub use config::ModelConfig;
pub use error::ModelError;
pub use offline::OfflineResponder;
pub use responder::Responder;
pub use runtime::{ModelReply, ModelRuntime};
pub use server::run_server;
