//! Tests for the shared event queue

mod common;

use common::fixture;
use outpost_core::events::{EventQueue, ServerEvent, ServerEventKind};
use outpost_core::tunnel::TunnelStatus;

#[test]
fn test_enqueue_without_consumer_does_not_panic() {
    let f = fixture("a");
    let server = f.server.clone();
    drop(f.events);

    f.tunnel.emit(TunnelStatus::Connected);

    let (queue, receiver) = EventQueue::channel();
    drop(receiver);
    queue.enqueue(ServerEvent::Disconnected(server));
}

#[test]
fn test_drain_preserves_enqueue_order() {
    let f = fixture("a");
    let (queue, mut receiver) = EventQueue::channel();

    queue.enqueue(ServerEvent::Reconnecting(f.server.clone()));
    queue.enqueue(ServerEvent::Connected(f.server.clone()));
    queue.enqueue(ServerEvent::Disconnected(f.server.clone()));

    let kinds: Vec<_> = receiver.drain().iter().map(|event| event.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ServerEventKind::Reconnecting,
            ServerEventKind::Connected,
            ServerEventKind::Disconnected,
        ]
    );
    assert!(receiver.try_recv().is_none());
}

#[tokio::test]
async fn test_recv_ends_when_producers_dropped() {
    let (queue, mut receiver) = EventQueue::channel();
    let f = fixture("a");

    queue.enqueue(ServerEvent::Connected(f.server.clone()));
    drop(queue);

    let event = receiver.recv().await.expect("expected queued event");
    assert_eq!(event.kind(), ServerEventKind::Connected);
    assert!(receiver.recv().await.is_none());
}

#[test]
fn test_event_debug_names_server() {
    let f = fixture("alpha");
    let event = ServerEvent::Reconnecting(f.server.clone());

    let debug = format!("{:?}", event);
    assert!(debug.contains("Reconnecting"));
    assert!(debug.contains("alpha"));
    assert_eq!(event.kind().to_string(), "reconnecting");
}
