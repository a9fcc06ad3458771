//! Development run loop.
//!
//! Starts the application, waits for it to print its debug service URI and
//! attaches the toolkit's hot-reload client to it. Two tasks are involved:
//! the caller, which waits with a deadline, and one reader task that echoes
//! the application's stdout and fires the readiness signal.

use super::readiness::{ReadinessMatcher, ReadinessScanner};
use crate::bundler::{
    Error, Result,
    error::Context,
    utils::process::ExternalCommand,
};
use std::{fmt, process::Stdio, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Child,
    sync::oneshot,
};

/// Default deadline for the readiness URI.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(120);

/// How long to wait for the exit status once the output has closed.
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// Device the attach client targets.
pub const ATTACH_DEVICE_ID: &str = "flutter-tester";

/// Progress of a [`DevRunLoop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// The application is being spawned.
    Starting,
    /// The application runs; no readiness URI yet.
    WaitingForReadiness,
    /// The attach client was started against `uri`.
    Attached {
        /// Debug service URI printed by the application.
        uri: String,
    },
    /// The loop ended without attaching.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("starting"),
            Self::WaitingForReadiness => f.write_str("waiting for readiness"),
            Self::Attached { uri } => write!(f, "attached to {uri}"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Runs the application and attaches the hot-reload client once it is ready.
#[derive(Debug)]
pub struct DevRunLoop {
    run: ExternalCommand,
    attach: ExternalCommand,
    timeout: Duration,
    matcher: ReadinessMatcher,
    state: RunState,
}

impl DevRunLoop {
    /// Loop running `run` and, once ready, `attach --debug-uri=<uri>`.
    pub fn new(run: ExternalCommand, attach: ExternalCommand, timeout: Duration) -> Result<Self> {
        Ok(Self {
            run,
            attach,
            timeout,
            matcher: ReadinessMatcher::new()?,
            state: RunState::Starting,
        })
    }

    /// Current state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("dev loop: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Runs the loop to completion.
    ///
    /// Fails with [`Error::ProcessExited`] when the application's output ends
    /// without a readiness URI and with [`Error::Timeout`] when no URI appears
    /// within the deadline. The application is terminated on every path.
    pub async fn run(&mut self) -> Result<()> {
        self.transition(RunState::Starting);
        log::info!("Starting {}", self.run.display());

        let mut child = match self
            .run
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                self.transition(RunState::Failed);
                return Err(self.run.spawn_error(e));
            }
        };

        let stdout = child.stdout.take().context("application stdout was not captured")?;
        let (signal, ready) = oneshot::channel();
        let mut scanner = ReadinessScanner::new(self.matcher.clone(), signal);

        let reader = tokio::spawn(async move {
            let mut stdout = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match stdout.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        log::debug!("application output unreadable: {e}");
                        break;
                    }
                }
                // Output is not required to be UTF-8.
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                println!("{line}");
                if scanner.feed(line) {
                    log::debug!("readiness URI seen");
                }
            }
        });

        self.transition(RunState::WaitingForReadiness);
        let result = match tokio::time::timeout(self.timeout, ready).await {
            Ok(Ok(uri)) => {
                self.transition(RunState::Attached { uri: uri.clone() });
                self.attach_to(&uri).await
            }
            Ok(Err(_closed)) => {
                self.transition(RunState::Failed);
                let code = collect_exit_code(&mut child).await;
                Err(Error::ProcessExited {
                    command: self.run.display(),
                    expected: "printing a readiness URI".to_string(),
                    code,
                })
            }
            Err(_elapsed) => {
                self.transition(RunState::Failed);
                log::warn!(
                    "No readiness URI after {}s, terminating {}",
                    self.timeout.as_secs(),
                    self.run.tool_name()
                );
                Err(Error::Timeout {
                    what: format!("a readiness URI from `{}`", self.run.display()),
                    after: self.timeout,
                })
            }
        };

        terminate(&mut child).await;
        reader.abort();
        result
    }

    async fn attach_to(&self, uri: &str) -> Result<()> {
        log::info!("Attaching to {uri}");
        self.attach
            .clone()
            .arg(format!("--debug-uri={uri}"))
            .run()
            .await
    }
}

async fn collect_exit_code(child: &mut Child) -> Option<i32> {
    match tokio::time::timeout(EXIT_GRACE, child.wait()).await {
        Ok(Ok(status)) => status.code(),
        Ok(Err(e)) => {
            log::debug!("could not collect exit status: {e}");
            None
        }
        Err(_) => None,
    }
}

async fn terminate(child: &mut Child) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    if let Err(e) = child.kill().await {
        log::warn!("Failed to terminate application: {e}");
    }
}
