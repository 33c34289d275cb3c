//! Tunnel backed by an external engine process
//!
//! Drives a tun2socks-style engine binary: the proxy parameters go on the
//! command line, the password goes through stdin, and the engine's exit code
//! is its native error code.

use crate::config::TunnelConfig;
use crate::error_code::ErrorCode;
use crate::tunnel::{StatusListener, Tunnel, TunnelFailure, TunnelStatus};
use crate::types::AccessKey;
use anyhow::anyhow;
use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle on a running engine process
struct RunningEngine {
    pid: u32,
    /// Kept open for the lifetime of the engine
    _stdin: Option<ChildStdin>,
    /// Waits for the process and reports DISCONNECTED when it exits
    monitor: JoinHandle<()>,
}

/// Tunnel implementation that runs the engine as a child process
pub struct ProcessTunnel {
    config: TunnelConfig,
    /// Serializes start and stop so at most one engine is ever spawned
    lifecycle: Mutex<()>,
    engine: Arc<Mutex<Option<RunningEngine>>>,
    listener: Arc<RwLock<Option<StatusListener>>>,
    /// Signal delivery, `send_signal` outside of tests
    signal: fn(u32, Signal) -> Result<bool, TunnelFailure>,
}

impl ProcessTunnel {
    /// Create a new process tunnel
    pub fn new(config: TunnelConfig) -> Self {
        Self {
            config,
            lifecycle: Mutex::new(()),
            engine: Arc::new(Mutex::new(None)),
            listener: Arc::new(RwLock::new(None)),
            signal: send_signal,
        }
    }

    /// PID of the running engine process, if any
    pub async fn pid(&self) -> Option<u32> {
        self.engine.lock().await.as_ref().map(|engine| engine.pid)
    }

    /// Spawn the engine process for the given access key
    fn spawn_process(&self, access_key: &AccessKey) -> Result<Child, TunnelFailure> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg("--proxy-host")
            .arg(access_key.host())
            .arg("--proxy-port")
            .arg(access_key.port().to_string())
            .arg("--proxy-cipher")
            .arg(access_key.cipher())
            .arg("--proxy-password-stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            // An abandoned start must not leave an orphaned engine behind
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            anyhow!(
                "Failed to spawn tunnel engine {}: {}",
                self.config.program.display(),
                e
            )
        })?;

        debug!("Tunnel engine spawned with PID: {:?}", child.id());
        Ok(child)
    }

    /// Send the proxy password to the engine via stdin
    ///
    /// Returns the stdin handle, which must stay open while the engine runs.
    /// Write failures are not fatal: an engine that died early is reported
    /// through its exit code instead.
    async fn send_password(child: &mut Child, access_key: &AccessKey) -> Option<ChildStdin> {
        let mut stdin = child.stdin.take()?;

        let written = async {
            stdin
                .write_all(access_key.password().expose().as_bytes())
                .await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await
        }
        .await;

        match written {
            Ok(()) => {
                debug!("Password sent to tunnel engine, stdin kept alive");
                Some(stdin)
            }
            Err(e) => {
                debug!("Failed to write password to tunnel engine: {}", e);
                None
            }
        }
    }

    /// Forward engine stderr into the log
    async fn monitor_stderr(stderr: ChildStderr) {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(target: "outpost::engine", "{}", line);
        }
    }

    /// Wait for the engine to exit, then clear state and report DISCONNECTED
    async fn monitor_process(
        mut child: Child,
        pid: u32,
        engine: Arc<Mutex<Option<RunningEngine>>>,
        listener: Arc<RwLock<Option<StatusListener>>>,
    ) {
        match child.wait().await {
            Ok(status) => info!(pid, %status, "Tunnel engine exited"),
            Err(e) => warn!(pid, "Failed to wait for tunnel engine: {}", e),
        }

        {
            let mut guard = engine.lock().await;
            if guard.as_ref().map(|running| running.pid) == Some(pid) {
                *guard = None;
            }
        }

        notify(&listener, TunnelStatus::Disconnected);
    }

    /// Terminate the running engine, if any
    ///
    /// Callers must hold the lifecycle lock.
    async fn stop_engine(&self) -> Result<(), TunnelFailure> {
        let Some(mut running) = self.engine.lock().await.take() else {
            debug!("Tunnel engine not running, nothing to stop");
            return Ok(());
        };

        let pid = running.pid;
        info!(pid, "Sending SIGTERM to tunnel engine");
        match (self.signal)(pid, Signal::SIGTERM) {
            Ok(true) => {}
            Ok(false) => {
                info!(pid, "Tunnel engine already terminated");
                return Ok(());
            }
            Err(e) => {
                *self.engine.lock().await = Some(running);
                return Err(e);
            }
        }

        let stop_timeout = Duration::from_secs(self.config.stop_timeout_secs);
        if tokio::time::timeout(stop_timeout, &mut running.monitor)
            .await
            .is_err()
        {
            warn!(pid, "Graceful shutdown timed out, sending SIGKILL");
            if let Err(e) = (self.signal)(pid, Signal::SIGKILL) {
                *self.engine.lock().await = Some(running);
                return Err(e);
            }
            if let Err(e) = (&mut running.monitor).await {
                warn!(pid, "Tunnel engine monitor ended abnormally: {}", e);
            }
        }

        info!(pid, "Tunnel engine stopped");
        Ok(())
    }
}

/// Send a signal, treating an already-gone process as success
fn send_signal(pid: u32, signal: Signal) -> Result<bool, TunnelFailure> {
    match kill(Pid::from_raw(pid as i32), signal) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(anyhow!("Failed to send {} to tunnel engine {}: {}", signal, pid, e).into()),
    }
}

/// Map an early engine exit to a tunnel failure
fn exit_failure(status: ExitStatus) -> TunnelFailure {
    match status.code() {
        Some(code) => TunnelFailure::Code(ErrorCode(code)),
        None => anyhow!("Tunnel engine terminated by signal ({})", status).into(),
    }
}

/// Invoke the registered listener, if any
fn notify(listener: &RwLock<Option<StatusListener>>, status: TunnelStatus) {
    let listener = listener
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match listener {
        Some(listener) => listener(status),
        None => debug!(%status, "No status listener registered"),
    }
}

#[async_trait]
impl Tunnel for ProcessTunnel {
    #[tracing::instrument(skip(self, access_key), fields(address = %access_key.address()))]
    async fn start(&self, access_key: &AccessKey) -> Result<(), TunnelFailure> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_running().await {
            info!("Tunnel engine already running, restarting");
            self.stop_engine().await?;
        }

        let mut child = self.spawn_process(access_key)?;
        let pid = child
            .id()
            .ok_or_else(|| anyhow!("Tunnel engine exited before reporting a PID"))?;

        let stdin = Self::send_password(&mut child, access_key).await;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(Self::monitor_stderr(stderr));
        }

        let grace = Duration::from_millis(self.config.startup_grace_ms);
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                warn!(pid, %status, "Tunnel engine exited during startup");
                return Err(exit_failure(status));
            }
            Ok(Err(e)) => {
                return Err(anyhow!("Failed to wait for tunnel engine: {}", e).into());
            }
            Err(_) => debug!(pid, "Tunnel engine survived startup grace period"),
        }

        {
            // The monitor takes this lock before it clears state or reports
            // DISCONNECTED, so CONNECTED always goes out first
            let mut guard = self.engine.lock().await;
            let monitor = tokio::spawn(Self::monitor_process(
                child,
                pid,
                Arc::clone(&self.engine),
                Arc::clone(&self.listener),
            ));
            *guard = Some(RunningEngine {
                pid,
                _stdin: stdin,
                monitor,
            });

            info!(pid, "Tunnel engine started");
            notify(&self.listener, TunnelStatus::Connected);
        }

        Ok(())
    }

    async fn stop(&self) -> Result<(), TunnelFailure> {
        let _lifecycle = self.lifecycle.lock().await;
        self.stop_engine().await
    }

    async fn is_running(&self) -> bool {
        self.engine.lock().await.is_some()
    }

    fn on_status_change(&self, listener: StatusListener) {
        *self.listener.write().unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }
}
