use crate::error::Result;
use async_trait::async_trait;

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Starts the model runtime process.
#[async_trait]
pub trait RuntimeLauncher: Send + Sync {
    async fn launch(&self) -> Result<()>;

    fn describe(&self) -> String {
        "model runtime".to_string()
    }
}
