//! HTTP client for the CoBot named-entity recognition API.

use crate::downstream::{
    Annotator,
    types::{DownstreamError, EntityAnnotation, LabelledEntity},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

/// Remote NER annotator authenticated with an `x-api-key` header.
pub struct CobotNerClient {
    client: Client,
    service_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct NerRequest<'a> {
    input: &'a str,
}

// {"response": [{"text": "baseball", "label": "sport"}], "model_version": "v1.1"}
#[derive(Deserialize)]
struct NerResponse {
    response: Vec<LabelledEntity>,
    #[serde(default)]
    model_version: Option<String>,
}

impl CobotNerClient {
    /// Build a client targeting `service_url`.
    pub fn new(service_url: &str, api_key: &str) -> Result<Self, DownstreamError> {
        let client = Client::builder().user_agent("annotators/0.1").build()?;
        tracing::debug!(
            url = service_url,
            has_api_key = !api_key.is_empty(),
            "Initialized CoBot NER client"
        );
        Ok(Self {
            client,
            service_url: service_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl Annotator for CobotNerClient {
    type Item = String;
    type Output = EntityAnnotation;

    fn name(&self) -> &'static str {
        "cobot_ner"
    }

    async fn annotate(&self, item: &String) -> Result<EntityAnnotation, DownstreamError> {
        let response = self
            .client
            .post(&self.service_url)
            .header(header::CONTENT_TYPE, "application/json;charset=utf-8")
            .header("x-api-key", &self.api_key)
            .body(serde_json::to_vec(&NerRequest { input: item }).map_err(|error| {
                DownstreamError::Malformed(format!("failed to encode request: {error}"))
            })?)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DownstreamError::BadStatus { status, body });
        }

        let bytes = response.bytes().await?;
        let payload: NerResponse = serde_json::from_slice(&bytes)
            .map_err(|error| DownstreamError::Malformed(error.to_string()))?;
        tracing::debug!(
            entities = payload.response.len(),
            model_version = payload.model_version.as_deref().unwrap_or("unknown"),
            "NER response received"
        );
        Ok(EntityAnnotation::from_labelled(payload.response))
    }

    fn fallback(&self, _item: &String) -> EntityAnnotation {
        EntityAnnotation::default()
    }
}
