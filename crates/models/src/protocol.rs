//! Protocol module - JSON messages exchanged with a model service
//!
//! Line-delimited JSON: one message per line. Every message carries `type`,
//! `seq` (per-sender sequence number) and `ts` (milliseconds since the Unix
//! epoch).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ModelOutput, ModelRequest, ModelTask};

pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// First message on a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
}

/// One model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub seq: u64,
    pub ts: u64,
    pub request: ModelRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello(HelloMessage),
    Request(RequestMessage),
}

// ============== Server -> Client Messages ==============

/// Answer to `hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub server: String,
    /// Wire names of the tasks the server answers.
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub seq: u64,
    pub ts: u64,
    /// `seq` of the request being answered.
    pub request_seq: u64,
    pub output: ModelOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    InvalidRequest,
    UnsupportedTask,
    ModelFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::HandshakeRequired => "handshake_required",
            ErrorCode::ProtocolMismatch => "protocol_mismatch",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::UnsupportedTask => "unsupported_task",
            ErrorCode::ModelFailed => "model_failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_seq: Option<u64>,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome(WelcomeMessage),
    Response(ResponseMessage),
    Error(ErrorMessage),
}

// ============== Message Parsing ==============

/// Parsed client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedClientMessage {
    Known(ClientMessage),
    /// Well-formed JSON with a `type` this protocol does not define.
    Unknown { seq: u64 },
}

/// Parse a client line.
///
/// Unknown message types are not a hard error; the server answers them with
/// an `invalid_request` error carrying their `seq`.
pub fn parse_client_message(json: &str) -> Result<ParsedClientMessage, serde_json::Error> {
    match serde_json::from_str::<ClientMessage>(json) {
        Ok(msg) => Ok(ParsedClientMessage::Known(msg)),
        Err(e) => {
            #[derive(Deserialize)]
            struct Envelope {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let env = serde_json::from_str::<Envelope>(json)?;
            match env.msg_type.as_deref() {
                Some("hello") | Some("request") | None => Err(e),
                Some(_) => Ok(ParsedClientMessage::Unknown {
                    seq: env.seq.unwrap_or(0),
                }),
            }
        }
    }
}

pub fn parse_server_message(json: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(json)
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str) -> ClientMessage {
    ClientMessage::Hello(HelloMessage {
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
    })
}

pub fn create_request(seq: u64, request: ModelRequest) -> ClientMessage {
    ClientMessage::Request(RequestMessage {
        seq,
        ts: current_timestamp_ms(),
        request,
    })
}

pub fn create_welcome(seq: u64, server: &str, tasks: &[ModelTask]) -> ServerMessage {
    ServerMessage::Welcome(WelcomeMessage {
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        server: server.to_string(),
        tasks: tasks.iter().map(|t| t.as_str().to_string()).collect(),
    })
}

pub fn create_response(seq: u64, request_seq: u64, output: ModelOutput) -> ServerMessage {
    ServerMessage::Response(ResponseMessage {
        seq,
        ts: current_timestamp_ms(),
        request_seq,
        output,
    })
}

pub fn create_error(
    seq: u64,
    request_seq: Option<u64>,
    code: ErrorCode,
    message: &str,
) -> ServerMessage {
    ServerMessage::Error(ErrorMessage {
        seq,
        ts: current_timestamp_ms(),
        request_seq,
        code,
        message: message.to_string(),
    })
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
