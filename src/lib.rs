//! Local HTTP gateway in front of an Ollama model runtime.
//!
//! On startup the gateway probes the runtime and launches `ollama serve` when
//! nothing answers. It then serves:
//! - `POST /generate`: forwards `{"prompt"}` to the runtime's chat API
//! - `POST /api/generate-palette`: turns a theme into RGB colours

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod ollama;
pub mod palette;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ColormindConfig, Config, OllamaConfig, StartupPolicy};
pub use error::{GatewayError, Result};
pub use models::{
    ChatMessage, ChatRequest, ChatResponse, ErrorResponse, GenerateResponse, PaletteResponse,
    PromptRequest, Rgb,
};
pub use ollama::{
    ChatClient, CompletionBackend, OllamaClient, ProcessLauncher, RuntimeLauncher, RuntimeProbe,
    RuntimeSupervisor, StartupOutcome,
};
pub use palette::{ColormindClient, PaletteError, PaletteService};
pub use server::GatewayService;
