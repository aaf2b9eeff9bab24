//! Breed reference client
//!
//! Looks up static reference facts for a named breed from The Dog API.
//! Enrichment is best-effort: every internal failure collapses to the empty
//! reference, never to an error the caller has to handle.

use crate::models::{BreedReference, ReferenceField};
use crate::types::BreedLookup;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DOG_API_URL: &str = "https://api.thedogapi.com/v1/breeds/search";
const USER_AGENT: &str = "breedscan/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
struct DogApiBreed {
    name: String,
    weight: Option<DogApiMeasure>,
    height: Option<DogApiMeasure>,
    bred_for: Option<String>,
    breed_group: Option<String>,
    life_span: Option<String>,
    temperament: Option<String>,
    origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DogApiMeasure {
    imperial: Option<String>,
}

/// The Dog API reference client
pub struct BreedInfoClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl BreedInfoClient {
    pub fn new(api_key: String) -> crate::Result<Self> {
        Self::with_base_url(api_key, DOG_API_URL.to_string())
    }

    /// Client against a non-default endpoint; tests point this at a local
    /// listener
    fn with_base_url(api_key: String, base_url: String) -> crate::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| crate::ScanError::Config(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
        })
    }

    async fn fetch(&self, breed_name: &str) -> anyhow::Result<BreedReference> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("q", breed_name)])
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .context("breed reference request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("breed reference API returned {}", status);
        }

        let candidates: Vec<DogApiBreed> = response
            .json()
            .await
            .context("breed reference response parse failed")?;

        let best = select_best_match(candidates, breed_name)
            .with_context(|| format!("no reference entry for '{}'", breed_name))?;

        Ok(build_reference(&best))
    }
}

/// Prefer an exact case-insensitive name match, else the first candidate
fn select_best_match(candidates: Vec<DogApiBreed>, query: &str) -> Option<DogApiBreed> {
    if let Some(pos) = candidates
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(query))
    {
        return candidates.into_iter().nth(pos);
    }
    candidates.into_iter().next()
}

fn build_reference(breed: &DogApiBreed) -> BreedReference {
    let imperial = |m: &Option<DogApiMeasure>| {
        m.as_ref()
            .and_then(|m| m.imperial.clone())
            .filter(|v| !v.trim().is_empty())
    };

    let size_and_weight = match (imperial(&breed.weight), imperial(&breed.height)) {
        (Some(weight), Some(height)) => ReferenceField::Known(format!(
            "Weight: {} lbs. Height: {} in.",
            weight, height
        )),
        _ => ReferenceField::NotAvailable,
    };

    // One trailing period stripped from each part before joining, so the
    // fixed separator never produces a double period.
    let traits: Vec<&str> = [breed.bred_for.as_deref(), breed.breed_group.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.strip_suffix('.').unwrap_or(s))
        .collect();

    let common_traits = if traits.is_empty() {
        ReferenceField::NotAvailable
    } else {
        ReferenceField::Known(traits.join(". Group: "))
    };

    BreedReference {
        origin: ReferenceField::from_option(breed.origin.clone()),
        temperament: ReferenceField::from_option(breed.temperament.clone()),
        lifespan: ReferenceField::from_option(breed.life_span.clone()),
        size_and_weight,
        common_traits,
    }
}

#[async_trait::async_trait]
impl BreedLookup for BreedInfoClient {
    async fn lookup(&self, breed_name: &str) -> BreedReference {
        // The reference dataset has no meaningful entry for mixed-breed dogs;
        // skip the network call entirely.
        if breed_name.to_lowercase().contains("mixed") {
            debug!(breed = %breed_name, "Mixed breed, skipping reference lookup");
            return BreedReference::default();
        }

        match self.fetch(breed_name).await {
            Ok(reference) => {
                tracing::info!(breed = %breed_name, "Breed reference lookup successful");
                reference
            }
            Err(e) => {
                warn!(breed = %breed_name, error = %e, "Breed reference lookup degraded to empty");
                BreedReference::default()
            }
        }
    }
}
