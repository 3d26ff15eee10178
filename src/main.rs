use ollgate::logger::{self, LoggerConfig};
use ollgate::{
    ColormindClient, CompletionBackend, Config, GatewayService, OllamaClient, PaletteService,
    StartupOutcome,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env();
    logger::init_with_config(LoggerConfig::from_env(config.debug))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    logger::log_config_info(&config);
    config.validate()?;

    let ollama = OllamaClient::new(config.ollama.clone());
    let outcome = ollama.supervisor(config.startup.clone()).ensure_started().await?;
    if matches!(
        outcome,
        StartupOutcome::AlreadyRunning | StartupOutcome::Launched { .. }
    ) {
        ollama.check_model_available().await;
    }

    let backend: Arc<dyn CompletionBackend> = Arc::new(ollama.chat().clone());
    let colormind = config
        .colormind
        .enabled
        .then(|| ColormindClient::new(reqwest::Client::new(), &config.colormind));
    let service = GatewayService::new(
        backend.clone(),
        PaletteService::new(backend, colormind),
        config.debug,
    );

    ollgate::server::run(&config, service).await?;
    Ok(())
}
