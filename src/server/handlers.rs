use crate::{
    error::GatewayError,
    logger,
    models::{ErrorResponse, GenerateResponse, PaletteResponse, PromptRequest, PROMPT_REQUIRED},
    palette::PaletteError,
    server::GatewayService,
};
use actix_web::{error::InternalError, http::StatusCode, web, HttpResponse, ResponseError};
use uuid::Uuid;

/// Validation failures are the caller's fault; everything else is a 500.
impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

/// Body errors come back as `400 {"error": ...}`; outside debug mode the parser detail is hidden.
pub fn json_config(debug: bool) -> web::JsonConfig {
    web::JsonConfig::default().error_handler(move |err, _req| {
        let message = if debug {
            format!("Invalid JSON body: {}", err)
        } else {
            "Invalid JSON body".to_string()
        };
        log::warn!("{}", message);
        InternalError::from_response(err, HttpResponse::BadRequest().json(ErrorResponse::new(message)))
            .into()
    })
}

pub async fn generate(
    service: web::Data<GatewayService>,
    body: web::Json<PromptRequest>,
) -> Result<HttpResponse, GatewayError> {
    let request_id = Uuid::new_v4();
    let request = body.into_inner();

    if let Some(prompt) = request.prompt() {
        log::info!("[req:{}] prompt received ({} chars)", request_id, prompt.chars().count());
        if service.debug() {
            log::debug!("[req:{}] prompt: {}", request_id, prompt);
        }
    }

    let timer = logger::timer(&format!("[req:{}] generate", request_id));
    let result = service.complete(&request).await;
    drop(timer);

    let text = result.map_err(|e| {
        if e.is_client_error() {
            log::warn!("[req:{}] rejected: {}", request_id, e);
        } else {
            log::error!("[req:{}] generation failed: {}", request_id, e);
            if service.debug() {
                log::debug!("[req:{}] error detail: {:?}", request_id, e);
            }
        }
        e
    })?;

    Ok(HttpResponse::Ok().json(GenerateResponse { response: text }))
}

pub async fn generate_palette(
    service: web::Data<GatewayService>,
    body: web::Json<PromptRequest>,
) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let request = body.into_inner();

    let theme = match request.prompt() {
        Some(theme) => theme,
        None => return HttpResponse::BadRequest().json(ErrorResponse::new(PROMPT_REQUIRED)),
    };
    log::info!("[req:{}] palette requested for theme: {}", request_id, theme);

    match service.palette().generate(theme).await {
        Ok(palette) => HttpResponse::Ok().json(PaletteResponse { palette }),
        Err(e) => {
            if let PaletteError::Generation(detail) = &e {
                log::error!("[req:{}] {}: {}", request_id, e, detail);
            } else {
                log::error!("[req:{}] {}", request_id, e);
            }
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}
