//! TCP server answering the model protocol with any [`Responder`].
//!
//! Each connection must say `hello` before sending requests. Requests on a
//! connection are answered in order; the responder runs on a blocking
//! thread so a slow model does not stall other connections.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::protocol::{
    create_error, create_response, create_welcome, parse_client_message, ClientMessage,
    ErrorCode, ParsedClientMessage, ServerMessage, PROTOCOL_VERSION,
};
use crate::responder::Responder;

const SERVER_NAME: &str = "tui-bear-model-stub";

/// Start the TCP server.
///
/// `ready_tx` receives the bound address once the listener is up, which
/// lets tests bind port 0.
pub async fn run_server(
    config: ModelConfig,
    responder: Arc<dyn Responder>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    log::info!("model server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("client {} connected from {}", client_id, addr);

        let responder = Arc::clone(&responder);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, responder).await {
                log::warn!("client {} error: {}", client_id, e);
            }
            log::info!("client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    responder: Arc<dyn Responder>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    let mut out_seq = 0u64;
    let mut handshaken = false;
    let mut last_seq: Option<u64> = None;
    let mut buf: Vec<u8> = Vec::with_capacity(4096);

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        out_seq += 1;

        let reply: ServerMessage = match parse_client_message(trimmed) {
            Ok(ParsedClientMessage::Known(ClientMessage::Hello(hello))) => {
                if major(&hello.protocol_version) != major(PROTOCOL_VERSION) {
                    create_error(
                        out_seq,
                        None,
                        ErrorCode::ProtocolMismatch,
                        &format!("server speaks protocol {PROTOCOL_VERSION}"),
                    )
                } else {
                    log::info!(
                        "client {} is {} {}",
                        client_id,
                        hello.client.name,
                        hello.client.version
                    );
                    handshaken = true;
                    last_seq = Some(hello.seq);
                    create_welcome(out_seq, SERVER_NAME, responder.tasks())
                }
            }
            Ok(ParsedClientMessage::Known(ClientMessage::Request(req))) => {
                if !handshaken {
                    create_error(
                        out_seq,
                        Some(req.seq),
                        ErrorCode::HandshakeRequired,
                        "send hello first",
                    )
                } else if last_seq.is_some_and(|prev| req.seq <= prev) {
                    create_error(
                        out_seq,
                        Some(req.seq),
                        ErrorCode::InvalidRequest,
                        "seq must increase",
                    )
                } else if !responder.tasks().contains(&req.request.task()) {
                    last_seq = Some(req.seq);
                    create_error(
                        out_seq,
                        Some(req.seq),
                        ErrorCode::UnsupportedTask,
                        req.request.task().as_str(),
                    )
                } else {
                    last_seq = Some(req.seq);
                    let request_seq = req.seq;
                    let request = req.request;
                    log::debug!("client {} asks {}", client_id, request.task().as_str());
                    let responder = Arc::clone(&responder);
                    let result =
                        tokio::task::spawn_blocking(move || responder.respond(&request)).await?;
                    match result {
                        Ok(output) => create_response(out_seq, request_seq, output),
                        Err(e) => {
                            log::warn!(
                                "client {} request {} failed: {}",
                                client_id,
                                request_seq,
                                e
                            );
                            create_error(out_seq, Some(request_seq), code_for(&e), &e.to_string())
                        }
                    }
                }
            }
            Ok(ParsedClientMessage::Unknown { seq }) => create_error(
                out_seq,
                Some(seq),
                ErrorCode::InvalidRequest,
                "unknown message type",
            ),
            Err(e) => create_error(
                out_seq,
                None,
                ErrorCode::InvalidRequest,
                &format!("malformed message: {e}"),
            ),
        };

        buf.clear();
        serde_json::to_writer(&mut buf, &reply)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        writer.flush().await?;
    }

    Ok(())
}

fn code_for(err: &ModelError) -> ErrorCode {
    match err {
        ModelError::Unsupported(_) => ErrorCode::UnsupportedTask,
        ModelError::InvalidInput(_) => ErrorCode::InvalidRequest,
        _ => ErrorCode::ModelFailed,
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}
