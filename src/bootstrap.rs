//! Startup wiring: turn a [`Config`] into a ready-to-serve router.
//!
//! Any failure here is fatal; the process must not accept traffic with a partially
//! constructed service.

use crate::{
    api,
    batch::{BatchService, BatchSettings},
    config::{BackendConfig, Config},
    downstream::{
        AssistanceDetector, BadlistDetector, CobotNerClient, DialogRptScorer, DownstreamError,
        LexiconError,
    },
};
use axum::Router;
use std::sync::Arc;
use thiserror::Error;

/// Errors that prevent a service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// HTTP client for a remote annotator could not be built.
    #[error("Failed to build downstream client: {0}")]
    Client(#[source] DownstreamError),
    /// Badlist lexicon could not be loaded.
    #[error("Failed to load badlist lexicon: {0}")]
    Lexicon(#[from] LexiconError),
    /// Built-in patterns failed to compile.
    #[error("Failed to compile patterns: {0}")]
    Pattern(#[from] regex::Error),
    /// Scoring model did not answer the warm-up call.
    #[error("DialogRPT warm-up failed: {0}")]
    Warmup(#[source] DownstreamError),
}

/// Build the router for the variant selected in `config`.
pub async fn build_router(config: &Config) -> Result<Router, StartupError> {
    let settings =
        BatchSettings::sequential(config.timeout).with_concurrency(config.batch_concurrency);
    tracing::info!(
        service = config.service.as_str(),
        timeout_ms = settings.timeout.as_millis() as u64,
        concurrency = settings.concurrency,
        "Building annotation service"
    );

    let router = match &config.backend {
        BackendConfig::CobotNer {
            api_key,
            service_url,
        } => {
            let client =
                CobotNerClient::new(service_url, api_key).map_err(StartupError::Client)?;
            api::entity_router(Arc::new(BatchService::new(client, settings)))
        }
        BackendConfig::BadlistedWords { lexicon_path } => {
            let detector = match lexicon_path {
                Some(path) => BadlistDetector::load(path)?,
                None => BadlistDetector::builtin()?,
            };
            tracing::info!(entries = detector.entries(), "Badlist detector ready");
            api::badlist_router(Arc::new(BatchService::new(detector, settings)))
        }
        BackendConfig::Assistance => {
            let detector = AssistanceDetector::new()?;
            api::assistance_router(Arc::new(BatchService::new(detector, settings)))
        }
        BackendConfig::DialogRpt {
            scorer_url,
            model_name,
            skip_warmup,
        } => {
            let scorer =
                DialogRptScorer::new(scorer_url, model_name).map_err(StartupError::Client)?;
            if *skip_warmup {
                tracing::warn!("Skipping DialogRPT warm-up");
            } else {
                let limit = config.timeout;
                tokio::time::timeout(limit, scorer.warm_up())
                    .await
                    .map_err(|_| StartupError::Warmup(DownstreamError::Timeout { limit }))?
                    .map_err(StartupError::Warmup)?;
            }
            api::ranking_router(Arc::new(BatchService::new(scorer, settings)))
        }
    };

    Ok(router)
}
