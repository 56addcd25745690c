use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use tui_bear::core::QA_CONTEXT;
use tui_bear::models::protocol::{create_hello, create_request, PROTOCOL_VERSION};
use tui_bear::models::{run_server, ModelClient, ModelConfig, ModelError, OfflineResponder};
use tui_bear::types::{ModelOutput, ModelRequest};

async fn start_server() -> std::net::SocketAddr {
    let config = ModelConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ModelConfig::default()
    };
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = run_server(config, Arc::new(OfflineResponder::new()), Some(ready_tx)).await;
    });
    tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped")
}

async fn connect(addr: std::net::SocketAddr) -> ModelClient {
    ModelClient::connect("127.0.0.1", addr.port(), Duration::from_secs(2))
        .await
        .expect("connect failed")
}

async fn send_line(write_half: &mut OwnedWriteHalf, line: &str) {
    write_half.write_all(line.as_bytes()).await.unwrap();
    write_half.write_all(b"\n").await.unwrap();
    write_half.flush().await.unwrap();
}

async fn read_json(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .expect("expected a line");
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn client_handshake_reports_all_tasks() {
    let addr = start_server().await;
    let client = connect(addr).await;

    let welcome = client.welcome().expect("welcome");
    assert_eq!(welcome.protocol_version, PROTOCOL_VERSION);
    for task in ["conversational", "questionAnswering", "fillMask", "textGeneration"] {
        assert!(welcome.tasks.iter().any(|t| t == task), "missing {task}");
    }
}

#[tokio::test]
async fn client_gets_answers_for_every_task() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    let chat = client
        .request(ModelRequest::Conversational {
            past_user_inputs: vec![],
            generated_responses: vec!["Hey! Wanna chat?".to_string()],
            text: "hello".to_string(),
        })
        .await
        .unwrap();
    match chat {
        ModelOutput::Conversational { generated_text } => assert!(!generated_text.is_empty()),
        other => panic!("unexpected output {other:?}"),
    }

    let qa = client
        .request(ModelRequest::QuestionAnswering {
            question: "What does NPC stand for?".to_string(),
            context: QA_CONTEXT.to_string(),
        })
        .await
        .unwrap();
    match qa {
        ModelOutput::QuestionAnswering { answer, start, end, .. } => {
            assert!(answer.contains("non-player character"), "{answer}");
            assert!(start < end);
        }
        other => panic!("unexpected output {other:?}"),
    }

    let fill = client
        .request(ModelRequest::FillMask {
            text: "The bear found a <mask> in the tree.".to_string(),
            top_k: 5,
        })
        .await
        .unwrap();
    match fill {
        ModelOutput::FillMask { candidates } => {
            assert_eq!(candidates.len(), 5);
            assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
            for c in &candidates {
                assert!(!c.sequence.contains("<mask>"));
                assert!(c.sequence.contains(&c.token_str));
            }
        }
        other => panic!("unexpected output {other:?}"),
    }

    let story = client
        .request(ModelRequest::TextGeneration {
            prompt: "Once upon a time,".to_string(),
            max_new_tokens: 35,
            seed: 42,
        })
        .await
        .unwrap();
    match story {
        ModelOutput::TextGeneration { generated_text } => {
            assert!(generated_text.starts_with("Once upon a time,"));
            assert_eq!(generated_text.split_whitespace().count(), 4 + 35);
        }
        other => panic!("unexpected output {other:?}"),
    }
}

#[tokio::test]
async fn remote_errors_surface_as_model_errors() {
    let addr = start_server().await;
    let mut client = connect(addr).await;

    let err = client
        .request(ModelRequest::FillMask {
            text: "no blank here".to_string(),
            top_k: 5,
        })
        .await
        .unwrap_err();
    match err {
        ModelError::Remote { code, .. } => assert_eq!(code.as_str(), "invalid_request"),
        other => panic!("unexpected error {other:?}"),
    }

    // The connection survives a failed request.
    let ok = client
        .request(ModelRequest::TextGeneration {
            prompt: "Once upon a time,".to_string(),
            max_new_tokens: 3,
            seed: 1,
        })
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn same_seed_same_story() {
    let addr = start_server().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    let request = ModelRequest::TextGeneration {
        prompt: "Once upon a time,".to_string(),
        max_new_tokens: 35,
        seed: 77,
    };
    let first = a.request(request.clone()).await.unwrap();
    let second = b.request(request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn raw_protocol_enforces_handshake_and_seq() {
    let addr = start_server().await;
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // request before hello
    let early = create_request(
        1,
        ModelRequest::TextGeneration {
            prompt: "x".to_string(),
            max_new_tokens: 1,
            seed: 0,
        },
    );
    send_line(&mut write_half, &serde_json::to_string(&early).unwrap()).await;
    let v = read_json(&mut lines).await;
    assert_eq!(v["type"], "error");
    assert_eq!(v["code"], "handshake_required");
    assert_eq!(v["request_seq"], 1);

    // hello
    let hello = create_hello(2, "raw-test");
    send_line(&mut write_half, &serde_json::to_string(&hello).unwrap()).await;
    let v = read_json(&mut lines).await;
    assert_eq!(v["type"], "welcome");

    // unknown message type
    send_line(&mut write_half, r#"{"type":"dance","seq":3,"ts":1}"#).await;
    let v = read_json(&mut lines).await;
    assert_eq!(v["type"], "error");
    assert_eq!(v["code"], "invalid_request");
    assert_eq!(v["request_seq"], 3);

    // seq going backwards
    let stale = create_request(
        2,
        ModelRequest::TextGeneration {
            prompt: "x".to_string(),
            max_new_tokens: 1,
            seed: 0,
        },
    );
    send_line(&mut write_half, &serde_json::to_string(&stale).unwrap()).await;
    let v = read_json(&mut lines).await;
    assert_eq!(v["code"], "invalid_request");

    // a good request
    let good = create_request(
        10,
        ModelRequest::TextGeneration {
            prompt: "x".to_string(),
            max_new_tokens: 2,
            seed: 0,
        },
    );
    send_line(&mut write_half, &serde_json::to_string(&good).unwrap()).await;
    let v = read_json(&mut lines).await;
    assert_eq!(v["type"], "response");
    assert_eq!(v["request_seq"], 10);
    assert_eq!(v["output"]["task"], "textGeneration");

    // malformed json
    send_line(&mut write_half, "{not json").await;
    let v = read_json(&mut lines).await;
    assert_eq!(v["code"], "invalid_request");
}

#[tokio::test]
async fn major_version_mismatch_is_refused() {
    let addr = start_server().await;
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    send_line(
        &mut write_half,
        r#"{"type":"hello","seq":1,"ts":1,"client":{"name":"old","version":"0.1"},"protocol_version":"2.0.0"}"#,
    )
    .await;
    let v = read_json(&mut lines).await;
    assert_eq!(v["type"], "error");
    assert_eq!(v["code"], "protocol_mismatch");
}
