use crate::cards::CardDescriptor;
use crate::error::{PipelineError, Result};
use crate::utils::http::get_user_agent;
use serde::Deserialize;
use serde_json::Value;

/// Image path used when neither the card nor the catalog names one
pub const DEFAULT_IMAGE_TEMPLATE: &str = "/card_image/{code}.png";

#[derive(Debug, Deserialize)]
struct CatalogCard {
    code: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type_code", alias = "type")]
    card_type: String,
    #[serde(rename = "side_code", alias = "side", default)]
    side: Option<String>,
    #[serde(default)]
    imagesrc: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

// Either a bare array of cards or an envelope with a `data` field.
// Entries stay untyped here so one malformed card doesn't reject the catalog.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogBody {
    Envelope {
        data: Vec<Value>,
        #[serde(rename = "imageUrlTemplate", default)]
        image_url_template: Option<String>,
    },
    Bare(Vec<Value>),
}

impl CatalogCard {
    fn into_descriptor(self, template: &str) -> CardDescriptor {
        let image_reference = self
            .image_url
            .filter(|url| !url.is_empty())
            .or(self.imagesrc.filter(|src| !src.is_empty()))
            .unwrap_or_else(|| template.replace("{code}", &self.code));

        CardDescriptor {
            code: self.code,
            title: self.title,
            card_type: self.card_type.to_ascii_lowercase(),
            side: self.side.map(|side| side.to_ascii_lowercase()),
            image_reference,
        }
    }
}

/// Parse a catalog response body into card descriptors.
pub fn parse_catalog(body: &str) -> Result<Vec<CardDescriptor>> {
    let body: CatalogBody = serde_json::from_str(body).map_err(|e| {
        PipelineError::CatalogFetch(format!(
            "Failed to parse JSON: expected a card array or an object with a `data` array ({})",
            e
        ))
    })?;

    let (cards, template) = match body {
        CatalogBody::Envelope {
            data,
            image_url_template,
        } => (data, image_url_template),
        CatalogBody::Bare(cards) => (cards, None),
    };
    let template = template.as_deref().unwrap_or(DEFAULT_IMAGE_TEMPLATE);

    let total = cards.len();
    let descriptors: Vec<CardDescriptor> = cards
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let code = entry
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            match serde_json::from_value::<CatalogCard>(entry) {
                Ok(card) => Some(card.into_descriptor(template)),
                Err(e) => {
                    log::warn!("Skipping catalog entry {} (code {}): {}", index, code, e);
                    None
                }
            }
        })
        .collect();

    if descriptors.len() < total {
        log::warn!(
            "Ignored {} malformed catalog entries",
            total - descriptors.len()
        );
    }
    Ok(descriptors)
}

/// Download the full card list from the catalog endpoint.
pub async fn fetch_catalog(
    client: &reqwest::Client,
    catalog_url: &str,
) -> Result<Vec<CardDescriptor>> {
    log::info!("Fetching card catalog from {}", catalog_url);

    let response = client
        .get(catalog_url)
        .header("User-Agent", get_user_agent())
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| PipelineError::CatalogFetch(format!("Request error: {}", e)))?;

    let status = response.status();
    log::debug!("Catalog response status: {}", status);
    if !status.is_success() {
        return Err(PipelineError::CatalogFetch(format!(
            "HTTP {} for URL: {}",
            status, catalog_url
        )));
    }

    let body = response.text().await.map_err(|e| {
        PipelineError::CatalogFetch(format!("Failed to get response text: {}", e))
    })?;

    let cards = parse_catalog(&body)?;
    log::info!("Catalog lists {} cards", cards.len());
    Ok(cards)
}
