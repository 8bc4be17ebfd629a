//! Connection session behavior against an in-memory transport:
//! idempotent registration, single-match dispatch, and tolerance of
//! malformed payloads.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use common::{channel_transport, StubMode, StubReasoning};
use drone::application::{
    event_channel, BroadcastChannel, ConnectionSession, RateLimitedGateway, TaskPhaseExecutor,
};
use drone::domain::models::{AgentIdentity, Envelope, OutboundEvent};
use drone::domain::ports::ReasoningClient;

/// A session over the in-memory transport plus the handles a test needs.
struct Harness {
    run: tokio::task::JoinHandle<Result<(), drone::domain::ports::TransportError>>,
    inbound_tx: mpsc::UnboundedSender<Envelope>,
    sent_rx: mpsc::UnboundedReceiver<OutboundEvent>,
    stop: CancellationToken,
}

fn identity() -> Arc<AgentIdentity> {
    Arc::new(AgentIdentity {
        agent_id: "alex".to_string(),
        display_name: "Alex".to_string(),
        capabilities: vec!["design".to_string()],
        persona: "Test persona".to_string(),
        emblem: "🤖".to_string(),
    })
}

/// Spawn a running session over the in-memory transport, with the
/// executor and broadcast channel wired to the session's outbound
/// channel the same way the runtime wires them.
fn start_session(mode: StubMode) -> Harness {
    let (transport, inbound_tx, sent_rx) = channel_transport();
    let identity = identity();
    let stop = CancellationToken::new();
    let stub = StubReasoning::new(mode);
    let (events, outbound_rx) = event_channel();

    let gateway = Arc::new(RateLimitedGateway::new(
        stub as Arc<dyn ReasoningClient>,
        Arc::clone(&identity),
        Duration::ZERO,
    ));
    let broadcast = Arc::new(BroadcastChannel::new(
        Arc::clone(&identity),
        events.clone(),
        240,
    ));
    let executor = Arc::new(TaskPhaseExecutor::new(
        Arc::clone(&identity),
        gateway,
        Arc::clone(&broadcast),
        events,
        Duration::ZERO,
        stop.clone(),
    ));

    let mut session = ConnectionSession::new(
        transport,
        identity,
        executor,
        broadcast,
        outbound_rx,
        stop.clone(),
    );
    let run = tokio::spawn(async move { session.run().await });

    Harness {
        run,
        inbound_tx,
        sent_rx,
        stop,
    }
}

fn envelope(event: &str, data: serde_json::Value) -> Envelope {
    Envelope::new(event, data)
}

/// Collect sent events until the session run loop finishes.
async fn finish(mut harness: Harness) -> Vec<OutboundEvent> {
    drop(harness.inbound_tx);
    tokio::time::timeout(Duration::from_secs(5), harness.run)
        .await
        .expect("session should end promptly")
        .unwrap()
        .unwrap();

    let mut sent = Vec::new();
    while let Ok(event) = harness.sent_rx.try_recv() {
        sent.push(event);
    }
    sent
}

fn count_registrations(sent: &[OutboundEvent]) -> usize {
    sent.iter()
        .filter(|event| matches!(event, OutboundEvent::RegisterAgent(_)))
        .count()
}

#[tokio::test]
async fn registers_exactly_once_despite_duplicate_acknowledgments() {
    let harness = start_session(StubMode::Fixed("ok".to_string()));

    // The server acknowledges twice; the connect path already registered
    harness
        .inbound_tx
        .send(envelope("agent_registered", json!({})))
        .unwrap();
    harness
        .inbound_tx
        .send(envelope("agent_registered", json!({})))
        .unwrap();

    let sent = finish(harness).await;
    assert_eq!(count_registrations(&sent), 1);

    let OutboundEvent::RegisterAgent(registration) = &sent[0] else {
        panic!("first event must be the registration");
    };
    assert_eq!(registration.agent_id, "alex");
    assert_eq!(registration.capabilities, vec!["design".to_string()]);
}

#[tokio::test]
async fn assignment_for_self_flows_through_to_the_server() {
    let harness = start_session(StubMode::Fixed("fine".to_string()));

    harness
        .inbound_tx
        .send(envelope(
            "task_assigned",
            json!({"agentId": "alex", "task": {"id": "t1", "description": "Create wireframe"}}),
        ))
        .unwrap();

    // Wait for the pipeline (spawned off the pump) to report completion
    let mut harness = harness;
    let mut sent = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = harness.sent_rx.recv().await.expect("session alive");
            let done = matches!(
                &event,
                OutboundEvent::UpdateTaskProgress(update) if update.progress == 100
            );
            sent.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .expect("pipeline should complete");

    let progress: Vec<u8> = sent
        .iter()
        .filter_map(|event| match event {
            OutboundEvent::UpdateTaskProgress(update) => Some(update.progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![25, 50, 75, 100]);

    harness.stop.cancel();
    harness.run.await.unwrap().unwrap();
}

#[tokio::test]
async fn assignment_for_another_agent_is_ignored() {
    let harness = start_session(StubMode::Fixed("ok".to_string()));

    harness
        .inbound_tx
        .send(envelope(
            "task_assigned",
            json!({"agentId": "bob", "task": {"id": "t1", "description": "Not ours"}}),
        ))
        .unwrap();
    // Give a wrongly-started pipeline time to emit something
    tokio::time::sleep(Duration::from_millis(50)).await;

    let sent = finish(harness).await;
    assert_eq!(sent.len(), 1, "only the registration goes out");
    assert_eq!(count_registrations(&sent), 1);
}

#[tokio::test]
async fn malformed_payloads_are_dropped_without_killing_the_session() {
    let harness = start_session(StubMode::Fixed("ok".to_string()));

    // task_assigned without a task id is a protocol violation
    harness
        .inbound_tx
        .send(envelope("task_assigned", json!({"agentId": "alex"})))
        .unwrap();
    // Unknown event names are skipped as well
    harness
        .inbound_tx
        .send(envelope("agent_joined", json!({"name": "Morgan"})))
        .unwrap();
    // The session is still alive and dispatching afterwards
    harness
        .inbound_tx
        .send(envelope("agent_registered", json!({})))
        .unwrap();

    let sent = finish(harness).await;
    assert_eq!(count_registrations(&sent), 1);
    assert_eq!(sent.len(), 1);
}

#[tokio::test]
async fn own_broadcast_echo_is_not_reprocessed() {
    let harness = start_session(StubMode::Fixed("ok".to_string()));

    harness
        .inbound_tx
        .send(envelope(
            "agent_message",
            json!({"sender": "Alex", "message": "my own line", "timestamp": "2026-08-30T12:00:00"}),
        ))
        .unwrap();
    harness
        .inbound_tx
        .send(envelope(
            "agent_message",
            json!({"sender": "Morgan", "message": "peer line", "timestamp": "2026-08-30T12:00:01"}),
        ))
        .unwrap();

    // Neither echo nor peer message produces an outbound emission
    let sent = finish(harness).await;
    assert_eq!(sent.len(), 1, "only the registration goes out");
}

#[tokio::test]
async fn stop_ends_the_session_cleanly() {
    let harness = start_session(StubMode::Fixed("ok".to_string()));

    harness.stop.cancel();
    tokio::time::timeout(Duration::from_secs(5), harness.run)
        .await
        .expect("session should stop promptly")
        .unwrap()
        .unwrap();
}
