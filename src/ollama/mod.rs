pub mod chat_client;
pub mod runtime;
pub mod traits;

use crate::config::{OllamaConfig, StartupPolicy};
use reqwest::Client;

pub use chat_client::ChatClient;
pub use runtime::{ProcessLauncher, RuntimeProbe, RuntimeSupervisor, StartupOutcome};
pub use traits::{CompletionBackend, RuntimeLauncher};

/// Entry point for everything that talks to the local Ollama runtime.
#[derive(Clone)]
pub struct OllamaClient {
    chat_client: ChatClient,
    probe: RuntimeProbe,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        // One connection pool shared by the probe and chat calls.
        let client = Client::new();
        Self {
            chat_client: ChatClient::new(client.clone(), config.clone()),
            probe: RuntimeProbe::new(client, &config),
            config,
        }
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat_client
    }

    /// Supervisor that launches the configured executable when the runtime is down.
    pub fn supervisor(&self, policy: StartupPolicy) -> RuntimeSupervisor {
        RuntimeSupervisor::new(
            self.probe.clone(),
            ProcessLauncher::new(self.config.executable.clone()),
            policy,
        )
    }

    /// Warns when the configured model is not among those the runtime has pulled.
    pub async fn check_model_available(&self) {
        match self.probe.list_models().await {
            Ok(models) => {
                if models.iter().any(|m| m.name == self.config.model) {
                    log::info!("Model {} is available", self.config.model);
                } else {
                    log::warn!(
                        "Model {} not found in runtime ({} models pulled); requests will fail until it is pulled",
                        self.config.model,
                        models.len()
                    );
                }
            }
            Err(e) => log::warn!("Could not list runtime models: {}", e),
        }
    }
}
