use std::net::TcpListener;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tui_bear::core::GameState;
use tui_bear::models::{run_server, ModelConfig, ModelReply, ModelRuntime, OfflineResponder};
use tui_bear::types::{GameAction, ModelOutput, ModelRequest, Npc};

fn wait_for_reply(runtime: &mut ModelRuntime) -> ModelReply {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(reply) = runtime.try_recv() {
            return reply;
        }
        assert!(Instant::now() < deadline, "no reply within 10s");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn story_request(seed: u32) -> ModelRequest {
    ModelRequest::TextGeneration {
        prompt: "Once upon a time,".to_string(),
        max_new_tokens: 35,
        seed,
    }
}

/// A port nothing listens on.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn offline_runtime_answers_with_matching_ticket() {
    let mut runtime = ModelRuntime::start(ModelConfig::offline()).unwrap();
    assert!(runtime.try_recv().is_none());
    assert!(runtime.submit(7, story_request(3)));

    let reply = wait_for_reply(&mut runtime);
    assert_eq!(reply.ticket, 7);
    match reply.result {
        Ok(ModelOutput::TextGeneration { generated_text }) => {
            assert!(generated_text.starts_with("Once upon a time,"));
        }
        other => panic!("unexpected reply {other:?}"),
    }
}

#[test]
fn unreachable_service_falls_back_to_offline() {
    let config = ModelConfig {
        host: "127.0.0.1".to_string(),
        port: closed_port(),
        timeout: Duration::from_millis(500),
        disabled: false,
    };
    let mut runtime = ModelRuntime::start(config).unwrap();
    runtime.submit(1, story_request(9));
    runtime.submit(
        2,
        ModelRequest::FillMask {
            text: "I like to <mask> outside.".to_string(),
            top_k: 5,
        },
    );

    let first = wait_for_reply(&mut runtime);
    let second = wait_for_reply(&mut runtime);
    assert_eq!((first.ticket, second.ticket), (1, 2));
    assert!(first.result.is_ok());
    assert!(matches!(second.result, Ok(ModelOutput::FillMask { .. })));
}

#[test]
fn offline_errors_reach_the_game_as_strings() {
    let mut runtime = ModelRuntime::start(ModelConfig::offline()).unwrap();
    runtime.submit(
        4,
        ModelRequest::FillMask {
            text: "<mask> and <mask>".to_string(),
            top_k: 5,
        },
    );
    let reply = wait_for_reply(&mut runtime);
    assert_eq!(reply.ticket, 4);
    assert!(reply.result.is_err());
}

#[test]
fn remote_service_answers_through_runtime() {
    // The server gets its own runtime on a plain thread.
    let (addr_tx, addr_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
            let config = ModelConfig {
                port: 0,
                ..ModelConfig::default()
            };
            tokio::spawn(run_server(
                config,
                Arc::new(OfflineResponder::new()),
                Some(ready_tx),
            ));
            let addr = ready_rx.await.unwrap();
            addr_tx.send(addr).unwrap();
            std::future::pending::<()>().await;
        });
    });
    let addr = addr_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let config = ModelConfig {
        host: "127.0.0.1".to_string(),
        port: addr.port(),
        timeout: Duration::from_secs(5),
        disabled: false,
    };
    let mut runtime = ModelRuntime::start(config).unwrap();

    // Same seed through the service and offline gives the same story.
    runtime.submit(1, story_request(21));
    let remote = wait_for_reply(&mut runtime);
    let mut offline = ModelRuntime::start(ModelConfig::offline()).unwrap();
    offline.submit(1, story_request(21));
    let local = wait_for_reply(&mut offline);
    assert_eq!(remote.result, local.result);
}

#[test]
fn game_and_runtime_close_the_loop() {
    let mut runtime = ModelRuntime::start(ModelConfig::offline()).unwrap();
    let mut state = GameState::new(8);
    let robot = Npc::Robot.rect();
    state.place_player(robot.x, robot.y);
    for ch in "what does NPC stand for".chars() {
        state.apply_action(GameAction::Type(ch));
    }
    state.apply_action(GameAction::Submit);

    for job in state.take_requests() {
        assert!(runtime.submit(job.ticket, job.request));
    }
    assert!(state.has_pending());

    let reply = wait_for_reply(&mut runtime);
    assert!(state.apply_reply(reply.ticket, reply.result));
    assert!(!state.has_pending());

    let robot_line = state
        .snapshot()
        .body
        .into_iter()
        .find(|l| l.text.starts_with("Robot:"))
        .map(|l| l.text)
        .unwrap();
    assert_eq!(robot_line, "Robot: Npc stands for non-player character.");
}
