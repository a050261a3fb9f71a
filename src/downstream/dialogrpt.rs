//! Client for a DialogRPT response-ranking scorer.
//!
//! The scorer receives one dialog context with its candidate responses and returns one score
//! per candidate. A context is scored as a unit: if the call fails, every hypothesis of that
//! context falls back to `0.0`.

use crate::downstream::{
    Annotator,
    types::{DownstreamError, RankingItem},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const WARMUP_CONTEXT: &str = "привет!";
const WARMUP_HYPOTHESIS: &str = "привет. как дела?";

/// Remote scorer ranking hypotheses against a dialog context.
pub struct DialogRptScorer {
    client: Client,
    scorer_url: String,
    model_name: String,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    context: &'a str,
    hypotheses: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct ScoreResponse {
    scores: Vec<f64>,
}

impl DialogRptScorer {
    /// Build a scorer client targeting `scorer_url` with the given checkpoint name.
    pub fn new(scorer_url: &str, model_name: &str) -> Result<Self, DownstreamError> {
        let client = Client::builder().user_agent("annotators/0.1").build()?;
        tracing::info!(url = scorer_url, model = model_name, "Initialized DialogRPT scorer");
        Ok(Self {
            client,
            scorer_url: scorer_url.to_string(),
            model_name: model_name.to_string(),
        })
    }

    /// Score `hypotheses` against `context`, returning one score per hypothesis.
    pub async fn score(
        &self,
        context: &str,
        hypotheses: &[String],
    ) -> Result<Vec<f64>, DownstreamError> {
        let response = self
            .client
            .post(&self.scorer_url)
            .json(&ScoreRequest {
                context,
                hypotheses,
                model: &self.model_name,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DownstreamError::BadStatus { status, body });
        }

        let payload: ScoreResponse = response.json().await?;
        if payload.scores.len() != hypotheses.len() {
            return Err(DownstreamError::Malformed(format!(
                "expected {} scores, got {}",
                hypotheses.len(),
                payload.scores.len()
            )));
        }
        Ok(payload.scores)
    }

    /// Issue one scoring call so the model is loaded before traffic arrives.
    pub async fn warm_up(&self) -> Result<(), DownstreamError> {
        let scores = self
            .score(WARMUP_CONTEXT, &[WARMUP_HYPOTHESIS.to_string()])
            .await?;
        tracing::info!(model = %self.model_name, warmup_score = scores[0], "dialogrpt model is ready");
        Ok(())
    }
}

#[async_trait]
impl Annotator for DialogRptScorer {
    type Item = RankingItem;
    type Output = Vec<f64>;

    fn name(&self) -> &'static str {
        "dialogrpt"
    }

    async fn annotate(&self, item: &RankingItem) -> Result<Vec<f64>, DownstreamError> {
        self.score(&item.context, &item.hypotheses).await
    }

    fn fallback(&self, item: &RankingItem) -> Vec<f64> {
        vec![0.0; item.hypotheses.len()]
    }

    fn skip(&self, item: &RankingItem) -> Option<Vec<f64>> {
        item.hypotheses.is_empty().then(Vec::new)
    }
}
