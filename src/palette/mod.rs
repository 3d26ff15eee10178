//! Theme prompt to colour palette, built on top of the completion backend.

pub mod colormind;

use crate::{models::Rgb, ollama::CompletionBackend};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::sync::Arc;
use thiserror::Error;

pub use colormind::ColormindClient;

#[derive(Debug, Error, PartialEq)]
pub enum PaletteError {
    #[error("Failed to generate base colors")]
    Generation(String),
    #[error("No valid response from Ollama")]
    EmptyResponse,
    #[error("Could not extract three valid RGB colors")]
    Extraction,
}

pub fn format_prompt(theme: &str) -> String {
    format!(
        "Generate three RGB colors based on the theme '{}'. Give exactly three RGB colors in format [[R, G, B], [R, G, B], [R, G, B]]. Return only the RGB values.",
        theme
    )
}

/// `[R, G, B]` with 1-3 digits per component and at most one whitespace after each comma.
static RGB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([0-9]{1,3}),\s?([0-9]{1,3}),\s?([0-9]{1,3})\]")
        .expect("RGB pattern is valid")
});

fn component(caps: &Captures, index: usize) -> Option<u8> {
    caps.get(index)?.as_str().parse().ok()
}

/// Pulls up to `limit` RGB triples out of free-form model output, in order.
///
/// Triples with a component above 255 are skipped.
pub fn extract_rgb(text: &str, limit: usize) -> Vec<Rgb> {
    RGB.captures_iter(text)
        .filter_map(|caps| {
            match (component(&caps, 1), component(&caps, 2), component(&caps, 3)) {
                (Some(r), Some(g), Some(b)) => Some([r, g, b]),
                _ => {
                    log::debug!("Skipping out-of-range colour {}", &caps[0]);
                    None
                }
            }
        })
        .take(limit)
        .collect()
}

#[derive(Clone)]
pub struct PaletteService {
    backend: Arc<dyn CompletionBackend>,
    colormind: Option<ColormindClient>,
}

impl PaletteService {
    pub fn new(backend: Arc<dyn CompletionBackend>, colormind: Option<ColormindClient>) -> Self {
        Self { backend, colormind }
    }

    /// Three base colours from the model, extended by Colormind when it answers.
    pub async fn generate(&self, theme: &str) -> Result<Vec<Rgb>, PaletteError> {
        let prompt = format_prompt(theme);

        let text = self.backend.complete(&prompt).await.map_err(|e| {
            log::error!("Error from Ollama: {}", e);
            PaletteError::Generation(e.to_string())
        })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(PaletteError::EmptyResponse);
        }

        let base = extract_rgb(text, 3);
        if base.len() != 3 {
            log::warn!("Only {} colours found in model output: {}", base.len(), text);
            return Err(PaletteError::Extraction);
        }
        log::info!("Extracted colors: {:?}", base);

        if let Some(colormind) = &self.colormind {
            let extended = colormind.extend(&base).await;
            if !extended.is_empty() {
                return Ok(extended);
            }
        }

        Ok(base)
    }
}
