//! TCP client for a model service.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::error::ModelError;
use crate::protocol::{
    create_hello, create_request, parse_server_message, ClientMessage, ServerMessage,
    WelcomeMessage,
};
use crate::types::{ModelOutput, ModelRequest};

/// One handshaken connection. Requests are answered in order.
pub struct ModelClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    seq: u64,
    timeout: Duration,
    welcome: Option<WelcomeMessage>,
    buf: Vec<u8>,
}

impl ModelClient {
    /// Connect and complete the `hello`/`welcome` handshake within `timeout`.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, ModelError> {
        let connect = async {
            let stream = TcpStream::connect((host, port)).await?;
            stream.set_nodelay(true)?;
            let (reader, writer) = stream.into_split();
            let mut client = Self {
                lines: BufReader::new(reader).lines(),
                writer,
                seq: 0,
                timeout,
                welcome: None,
                buf: Vec::with_capacity(4096),
            };
            client.handshake().await?;
            Ok(client)
        };
        tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| ModelError::Timeout(timeout))?
    }

    pub fn welcome(&self) -> Option<&WelcomeMessage> {
        self.welcome.as_ref()
    }

    /// Per-request timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Send one request and wait for its answer.
    pub async fn request(&mut self, request: ModelRequest) -> Result<ModelOutput, ModelError> {
        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.request_inner(request))
            .await
            .map_err(|_| ModelError::Timeout(timeout))?
    }

    async fn request_inner(&mut self, request: ModelRequest) -> Result<ModelOutput, ModelError> {
        let task = request.task();
        let seq = self.next_seq();
        self.send(&create_request(seq, request)).await?;

        loop {
            match self.read_message().await? {
                ServerMessage::Response(resp) if resp.request_seq == seq => {
                    if resp.output.task() != task {
                        return Err(ModelError::Protocol(format!(
                            "asked for {}, got {}",
                            task.as_str(),
                            resp.output.task().as_str()
                        )));
                    }
                    return Ok(resp.output);
                }
                ServerMessage::Error(err) if err.request_seq.map_or(true, |s| s == seq) => {
                    return Err(ModelError::Remote {
                        code: err.code,
                        message: err.message,
                    });
                }
                other => log::debug!("skipping unrelated message: {:?}", other),
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), ModelError> {
        let seq = self.next_seq();
        self.send(&create_hello(seq, "tui-bear")).await?;
        match self.read_message().await? {
            ServerMessage::Welcome(welcome) => {
                log::info!(
                    "model service {} (protocol {}) offers {:?}",
                    welcome.server,
                    welcome.protocol_version,
                    welcome.tasks
                );
                self.welcome = Some(welcome);
                Ok(())
            }
            ServerMessage::Error(err) => Err(ModelError::Remote {
                code: err.code,
                message: err.message,
            }),
            other => Err(ModelError::Protocol(format!(
                "expected welcome, got {:?}",
                other
            ))),
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<(), ModelError> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, msg)?;
        self.buf.push(b'\n');
        self.writer.write_all(&self.buf).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_message(&mut self) -> Result<ServerMessage, ModelError> {
        loop {
            let line = self.lines.next_line().await?.ok_or(ModelError::Closed)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(parse_server_message(trimmed)?);
        }
    }
}
