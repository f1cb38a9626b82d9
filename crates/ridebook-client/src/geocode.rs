//! # Address Autocomplete
//!
//! Thin wrapper around the OpenRouteService autocomplete endpoint, plus the
//! debounce that keeps it from firing on every keystroke.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Autocomplete Flow                                  │
//! │                                                                         │
//! │  keystroke ──► Debouncer::settle() (350 ms, last caller wins)          │
//! │                    │                                                    │
//! │                    ├── superseded ──► None (nothing rendered)           │
//! │                    ▼                                                    │
//! │               query < 3 chars ──► [] (no request)                       │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │   GET /geocode/autocomplete?api_key&text&boundary.country&lang&layers   │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │   features[].properties ──► AddressSuggestion{label, context, value}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::config::GeocodeSettings;
use crate::error::{ClientError, ClientResult, GENERIC_SERVICE_MESSAGE};
use crate::wire::ErrorBody;

pub const AUTOCOMPLETE_PATH: &str = "geocode/autocomplete";

/// Label used when a feature carries neither `name` nor `label`.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

// =============================================================================
// Suggestion
// =============================================================================

/// One autocomplete entry, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    /// Main line, e.g. `Rua Augusta 24`.
    pub label: String,
    /// Secondary line, e.g. `Lisboa, Lisboa`. May be empty.
    pub context: String,
    /// What goes into the input when the suggestion is picked.
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Default, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: FeatureProperties,
}

/// The subset of ORS feature properties the suggestion is built from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub housenumber: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl AddressSuggestion {
    /// Shapes a feature into a suggestion.
    ///
    /// ## Rules
    /// - Label is `name`, else `label`
    /// - If there is a street and the label does not already name it
    ///   alongside a house number, the label becomes `street housenumber`
    /// - Context is `locality, county, region`, de-duplicated, without the label
    /// - Value is the full ORS `label`, else the label
    pub fn from_properties(props: &FeatureProperties) -> Self {
        let name = non_empty(&props.name);
        let full_label = non_empty(&props.label);
        let street = non_empty(&props.street);
        let housenumber = non_empty(&props.housenumber);

        let mut label = name
            .or(full_label)
            .unwrap_or(UNKNOWN_LOCATION)
            .to_string();

        if let Some(street) = street {
            let already_named = housenumber.is_some()
                && label.to_lowercase().contains(&street.to_lowercase());
            if !already_named {
                label = match housenumber {
                    Some(number) => format!("{street} {number}"),
                    None => street.to_string(),
                };
            }
        }

        let label_lower = label.to_lowercase();
        let mut parts: Vec<&str> = Vec::new();
        for part in [&props.locality, &props.county, &props.region] {
            if let Some(part) = non_empty(part) {
                if !parts.contains(&part) && part.to_lowercase() != label_lower {
                    parts.push(part);
                }
            }
        }

        AddressSuggestion {
            context: parts.join(", "),
            value: full_label.map(str::to_string).unwrap_or_else(|| label.clone()),
            label,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Lookup Trait
// =============================================================================

/// Anything that can turn a partial address into suggestions.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn autocomplete(&self, query: &str) -> ClientResult<Vec<AddressSuggestion>>;
}

// =============================================================================
// ORS Client
// =============================================================================

/// OpenRouteService autocomplete client.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    endpoint: Url,
    settings: GeocodeSettings,
}

impl GeocodeClient {
    pub fn new(settings: &GeocodeSettings, timeout: Duration) -> ClientResult<Self> {
        let mut base = Url::parse(&settings.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(GeocodeClient {
            http,
            endpoint: base.join(AUTOCOMPLETE_PATH)?,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl AddressLookup for GeocodeClient {
    #[tracing::instrument(skip(self))]
    async fn autocomplete(&self, query: &str) -> ClientResult<Vec<AddressSuggestion>> {
        let query = query.trim();
        if query.chars().count() < self.settings.min_query_chars {
            return Ok(Vec::new());
        }

        let Some(api_key) = self.settings.api_key.as_deref() else {
            debug!("No geocode API key configured, skipping autocomplete");
            return Ok(Vec::new());
        };

        let layers = self.settings.layers.join(",");
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("api_key", api_key),
                ("text", query),
                ("boundary.country", self.settings.country.as_str()),
                ("lang", self.settings.lang.as_str()),
                ("layers", layers.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ClientError::Communication(e.to_string()))?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(ErrorBody::reason)
                .unwrap_or_else(|| GENERIC_SERVICE_MESSAGE.to_string());
            error!(status = status.as_u16(), %message, "Autocomplete failed");
            return Err(ClientError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let collection: FeatureCollection = serde_json::from_slice(&bytes)?;
        let suggestions: Vec<AddressSuggestion> = collection
            .features
            .iter()
            .map(|f| AddressSuggestion::from_properties(&f.properties))
            .collect();

        debug!(count = suggestions.len(), "Autocomplete suggestions");
        Ok(suggestions)
    }
}

// =============================================================================
// Debounce
// =============================================================================

/// Trailing-edge debounce: of several calls inside the window, only the
/// last one proceeds.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Waits out the window. Returns `false` if a later call superseded this one.
    pub async fn settle(&self) -> bool {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.generation.load(Ordering::SeqCst) == mine
    }
}

/// Debounced autocomplete for one input field.
pub struct AddressSuggester {
    lookup: Arc<dyn AddressLookup>,
    debouncer: Debouncer,
}

impl AddressSuggester {
    pub fn new(lookup: Arc<dyn AddressLookup>, debounce: Duration) -> Self {
        AddressSuggester {
            lookup,
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Suggestions for `query`, or `None` if a newer keystroke took over.
    pub async fn suggest(&self, query: &str) -> ClientResult<Option<Vec<AddressSuggestion>>> {
        if !self.debouncer.settle().await {
            debug!(query, "Autocomplete superseded");
            return Ok(None);
        }
        self.lookup.autocomplete(query).await.map(Some)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
