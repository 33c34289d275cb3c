//! Test doubles for the tunnel and network seams

#![allow(dead_code)]

use async_trait::async_trait;
use outpost_core::error_code::ErrorCode;
use outpost_core::events::{EventQueue, EventReceiver};
use outpost_core::net::NativeNetworking;
use outpost_core::server::Server;
use outpost_core::tunnel::{StatusListener, Tunnel, TunnelFailure, TunnelStatus};
use outpost_core::types::{AccessKey, ProxyPassword};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the next tunnel operation should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    FailWithCode(i32),
    FailWithCause(String),
}

impl Outcome {
    fn into_result(self) -> Result<(), TunnelFailure> {
        match self {
            Outcome::Succeed => Ok(()),
            Outcome::FailWithCode(code) => Err(TunnelFailure::Code(ErrorCode(code))),
            Outcome::FailWithCause(message) => Err(anyhow::anyhow!(message).into()),
        }
    }
}

#[derive(Default)]
struct Inner {
    listener: Mutex<Option<StatusListener>>,
    start_outcome: Mutex<Option<Outcome>>,
    stop_outcome: Mutex<Option<Outcome>>,
    start_failure: Mutex<Option<TunnelFailure>>,
    started_with: Mutex<Vec<AccessKey>>,
    running: AtomicBool,
    stop_calls: AtomicUsize,
}

/// Tunnel whose results are scripted and whose status is pushed by the test
///
/// Clones share state, so a test keeps one clone after handing the other to
/// a server.
#[derive(Clone, Default)]
pub struct ScriptedTunnel {
    inner: Arc<Inner>,
}

impl ScriptedTunnel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `start` return this outcome
    pub fn script_start(&self, outcome: Outcome) {
        *self.inner.start_outcome.lock().unwrap() = Some(outcome);
    }

    /// Make the next `start` fail with this exact failure value
    pub fn script_start_failure(&self, failure: TunnelFailure) {
        *self.inner.start_failure.lock().unwrap() = Some(failure);
    }

    /// Make the next `stop` return this outcome
    pub fn script_stop(&self, outcome: Outcome) {
        *self.inner.stop_outcome.lock().unwrap() = Some(outcome);
    }

    pub fn set_running(&self, running: bool) {
        self.inner.running.store(running, Ordering::SeqCst);
    }

    /// Push a status to the registered listener, like a native engine would
    pub fn emit(&self, status: TunnelStatus) {
        let listener = self.inner.listener.lock().unwrap().clone();
        let listener = listener.expect("no status listener registered");
        listener(status);
    }

    pub fn has_listener(&self) -> bool {
        self.inner.listener.lock().unwrap().is_some()
    }

    pub fn started_with(&self) -> Vec<AccessKey> {
        self.inner.started_with.lock().unwrap().clone()
    }

    pub fn stop_calls(&self) -> usize {
        self.inner.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tunnel for ScriptedTunnel {
    async fn start(&self, access_key: &AccessKey) -> Result<(), TunnelFailure> {
        self.inner
            .started_with
            .lock()
            .unwrap()
            .push(access_key.clone());

        if let Some(failure) = self.inner.start_failure.lock().unwrap().take() {
            return Err(failure);
        }

        let outcome = self
            .inner
            .start_outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Outcome::Succeed);
        let result = outcome.into_result();
        if result.is_ok() {
            self.set_running(true);
        }
        result
    }

    async fn stop(&self) -> Result<(), TunnelFailure> {
        self.inner.stop_calls.fetch_add(1, Ordering::SeqCst);

        let outcome = self
            .inner
            .stop_outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Outcome::Succeed);
        let result = outcome.into_result();
        if result.is_ok() {
            self.set_running(false);
        }
        result
    }

    async fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    fn on_status_change(&self, listener: StatusListener) {
        *self.inner.listener.lock().unwrap() = Some(listener);
    }
}

/// Network probe with a fixed answer that records every call
#[derive(Default)]
pub struct StubNetworking {
    reachable: AtomicBool,
    calls: Mutex<Vec<(String, u16)>>,
}

impl StubNetworking {
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, u16)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NativeNetworking for StubNetworking {
    async fn is_server_reachable(&self, host: &str, port: u16) -> bool {
        self.calls.lock().unwrap().push((host.to_string(), port));
        self.reachable.load(Ordering::SeqCst)
    }
}

pub fn access_key(id: &str) -> AccessKey {
    AccessKey::new(
        id,
        "proxy.example.com",
        8388,
        "chacha20-ietf-poly1305",
        ProxyPassword::new("secret".to_string()),
    )
    .with_outline_server(true)
}

/// Everything a server test needs to poke at
pub struct Fixture {
    pub server: Arc<Server>,
    pub tunnel: ScriptedTunnel,
    pub net: Arc<StubNetworking>,
    pub events: EventReceiver,
}

pub fn fixture(id: &str) -> Fixture {
    let (queue, events) = EventQueue::channel();
    let tunnel = ScriptedTunnel::new();
    let net = Arc::new(StubNetworking::new(true));

    let server = Server::new(
        id,
        access_key(id),
        format!("Server {}", id),
        Box::new(tunnel.clone()),
        net.clone(),
        queue,
    );

    Fixture {
        server,
        tunnel,
        net,
        events,
    }
}
