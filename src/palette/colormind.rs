use crate::{
    config::ColormindConfig,
    models::{ColormindRequest, ColormindResponse, ColormindSlot, Rgb},
};
use reqwest::Client;

/// Asks Colormind to fill two more slots around the base colours.
#[derive(Clone)]
pub struct ColormindClient {
    client: Client,
    url: String,
}

impl ColormindClient {
    pub fn new(client: Client, config: &ColormindConfig) -> Self {
        Self {
            client,
            url: format!("{}/api/", config.base_url.trim_end_matches('/')),
        }
    }

    pub fn build_request(base: &[Rgb]) -> ColormindRequest {
        let mut input: Vec<ColormindSlot> = base.iter().copied().map(ColormindSlot::Fixed).collect();
        input.push(ColormindSlot::free());
        input.push(ColormindSlot::free());
        ColormindRequest {
            model: "default".to_string(),
            input,
        }
    }

    /// Returns the extended palette, or an empty one on any failure.
    pub async fn extend(&self, base: &[Rgb]) -> Vec<Rgb> {
        let request = Self::build_request(base);
        log::debug!(
            "Sending request to Colormind API: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response = match self.client.post(&self.url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error fetching from Colormind: {}", e);
                return Vec::new();
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Error reading Colormind response: {}", e);
                return Vec::new();
            }
        };
        log::debug!("Raw response from Colormind API: {}", text);

        if !status.is_success() {
            log::error!("Colormind API error, status: {}", status);
            return Vec::new();
        }

        if text.contains("<html>") || text.contains("<body>") {
            log::error!("Received an HTML error response instead of JSON");
            return Vec::new();
        }

        match serde_json::from_str::<ColormindResponse>(&text) {
            Ok(parsed) => parsed.result,
            Err(e) => {
                log::error!("Malformed Colormind response: {}", e);
                Vec::new()
            }
        }
    }
}
