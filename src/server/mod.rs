pub mod handlers;

use crate::{
    config::Config,
    error::{GatewayError, Result},
    models::{PromptRequest, PROMPT_REQUIRED},
    ollama::CompletionBackend,
    palette::PaletteService,
};
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

/// Everything a request handler needs, constructed once at startup.
#[derive(Clone)]
pub struct GatewayService {
    backend: Arc<dyn CompletionBackend>,
    palette: PaletteService,
    debug: bool,
}

impl GatewayService {
    pub fn new(backend: Arc<dyn CompletionBackend>, palette: PaletteService, debug: bool) -> Self {
        Self {
            backend,
            palette,
            debug,
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn palette(&self) -> &PaletteService {
        &self.palette
    }

    /// Validates the prompt and forwards it to the backend.
    pub async fn complete(&self, request: &PromptRequest) -> Result<String> {
        let prompt = request
            .prompt()
            .ok_or_else(|| GatewayError::ValidationError(PROMPT_REQUIRED.into()))?;
        self.backend.complete(prompt).await
    }
}

/// Registers the gateway routes; shared by the real server and handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/generate", web::post().to(handlers::generate))
        .route(
            "/api/generate-palette",
            web::post().to(handlers::generate_palette),
        );
}

pub async fn run(config: &Config, service: GatewayService) -> std::io::Result<()> {
    let debug = config.debug;
    let data = web::Data::new(service);

    log::info!("Listening on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(handlers::json_config(debug))
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(configure)
    })
    .bind(config.bind_addr())?
    .run()
    .await
}
