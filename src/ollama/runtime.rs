use crate::{
    config::{OllamaConfig, StartupPolicy},
    error::{GatewayError, Result},
    models::{ModelTag, TagsResponse},
    ollama::traits::RuntimeLauncher,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Liveness probe against the runtime's `/api/tags` endpoint.
#[derive(Clone)]
pub struct RuntimeProbe {
    client: Client,
    tags_url: String,
    timeout: Duration,
}

impl RuntimeProbe {
    pub fn new(client: Client, config: &OllamaConfig) -> Self {
        Self {
            client,
            tags_url: config.endpoint("/api/tags"),
            timeout: config.probe_timeout,
        }
    }

    /// One attempt: HTTP 200 means ready, anything else (including no answer) does not.
    pub async fn is_ready(&self) -> bool {
        match self
            .client
            .get(&self.tags_url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => {
                let ready = response.status() == StatusCode::OK;
                if !ready {
                    log::debug!("Runtime probe returned {}", response.status());
                }
                ready
            }
            Err(e) => {
                log::debug!("Runtime probe failed: {}", e);
                false
            }
        }
    }

    pub async fn list_models(&self) -> Result<Vec<ModelTag>> {
        let response = self
            .client
            .get(&self.tags_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::RequestError(format!("Ollama tags request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GatewayError::ResponseError(format!(
                "Ollama tags returned {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            GatewayError::ResponseError(format!("Malformed tags response: {}", e))
        })?;
        Ok(tags.models)
    }
}

/// Launches `<executable> serve` as a detached background process.
pub struct ProcessLauncher {
    executable: PathBuf,
}

impl ProcessLauncher {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

fn forward_output<R>(reader: R, stream: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    log::trace!("ollama {}: {}", stream, line.trim_end());
                }
                Err(e) => {
                    log::debug!("Stopped reading ollama {}: {}", stream, e);
                    break;
                }
            }
        }
    });
}

#[async_trait]
impl RuntimeLauncher for ProcessLauncher {
    async fn launch(&self) -> Result<()> {
        let mut child = Command::new(&self.executable)
            .arg("serve")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| {
                GatewayError::RuntimeError(format!(
                    "failed to spawn '{} serve': {}",
                    self.executable.display(),
                    e
                ))
            })?;

        log::info!(
            "Spawned '{} serve' (pid {})",
            self.executable.display(),
            child.id().map(|id| id.to_string()).unwrap_or_else(|| "?".into())
        );

        // Pipes must be drained or the child blocks once they fill up.
        if let Some(stdout) = child.stdout.take() {
            forward_output(stdout, "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(stderr, "stderr");
        }

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => log::warn!("Ollama runtime exited with {}", status),
                Err(e) => log::warn!("Lost track of Ollama runtime: {}", e),
            }
        });

        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} serve", self.executable.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    /// The runtime answered before anything was launched.
    AlreadyRunning,
    /// Launched, and the runtime answered on probe number `probes`.
    Launched { probes: u32 },
    /// Launched, but no probe succeeded within the policy's bounds.
    LaunchedNotReady,
    /// The launch itself failed; serving continues without a runtime.
    LaunchFailed(String),
}

/// Makes sure the runtime is reachable once at startup.
///
/// Not a process manager: nothing is restarted or watched afterwards.
pub struct RuntimeSupervisor {
    probe: RuntimeProbe,
    launcher: Box<dyn RuntimeLauncher>,
    policy: StartupPolicy,
}

impl RuntimeSupervisor {
    pub fn new(
        probe: RuntimeProbe,
        launcher: impl RuntimeLauncher + 'static,
        policy: StartupPolicy,
    ) -> Self {
        Self {
            probe,
            launcher: Box::new(launcher),
            policy,
        }
    }

    /// Probes once; if the runtime is down, launches it exactly once and polls
    /// with backoff until it answers, the attempts run out or the deadline passes.
    ///
    /// With a non-strict policy an unready runtime is logged and tolerated.
    pub async fn ensure_started(&self) -> Result<StartupOutcome> {
        if self.probe.is_ready().await {
            log::info!("Ollama runtime already running");
            return Ok(StartupOutcome::AlreadyRunning);
        }

        log::info!("Starting Ollama server ({})...", self.launcher.describe());
        if let Err(e) = self.launcher.launch().await {
            if self.policy.strict {
                return Err(e);
            }
            log::error!("{}", e);
            return Ok(StartupOutcome::LaunchFailed(e.to_string()));
        }

        let started = Instant::now();
        for attempt in 0..self.policy.attempts {
            let remaining = self.policy.deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(self.policy.backoff_for(attempt).min(remaining)).await;

            if self.probe.is_ready().await {
                log::info!(
                    "Ollama runtime ready after {} probe(s) in {}ms",
                    attempt + 1,
                    started.elapsed().as_millis()
                );
                return Ok(StartupOutcome::Launched { probes: attempt + 1 });
            }
        }

        let message = format!(
            "runtime did not answer within {} probe(s) / {}s",
            self.policy.attempts,
            self.policy.deadline.as_secs()
        );
        if self.policy.strict {
            return Err(GatewayError::RuntimeUnavailable(message));
        }
        log::warn!("Ollama {}; serving anyway", message);
        Ok(StartupOutcome::LaunchedNotReady)
    }
}
