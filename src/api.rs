//! HTTP surface for the annotation services.
//!
//! Every variant exposes its native route as consumed by the dialog pipeline, plus a handful
//! of shared endpoints:
//!
//! - `POST /entities` – CoBot NER; body `{"sentences": [...]}`, returns one
//!   `{entities, labelled_entities}` object per sentence.
//! - `POST /badlisted_words` – lexicon flag; body `{"sentences": [...]}`, returns
//!   `[{"bad_words": [bool, ...]}]`.
//! - `POST /assistance` – assistance pattern flags per sentence.
//! - `POST /respond` – DialogRPT; body `{"dialog_contexts": [...], "hypothesis": [[...]]}`,
//!   returns `{"scores": [[...]]}`.
//! - `POST /annotate` – generic `{"items": [...]}` form, one result per item.
//! - `GET /metrics` – batch counters and the last batch duration.
//! - `GET /commands` – machine-readable catalog of the routes above for the running variant.
//!
//! Handlers always answer `200 OK` once the body parsed; per-item failures are absorbed by the
//! batch service.

use crate::{
    batch::BatchService,
    downstream::{Annotator, AssistanceFlags, EntityAnnotation, RankingItem},
    metrics::MetricsSnapshot,
};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use std::sync::Arc;

type Shared<A> = Arc<BatchService<A>>;

/// Router for the CoBot NER variant.
pub fn entity_router<A>(service: Shared<A>) -> Router
where
    A: Annotator<Item = String, Output = EntityAnnotation> + 'static,
{
    shared_routes::<A>(entity_commands)
        .route("/entities", post(annotate_sentences::<A>))
        .with_state(service)
}

/// Router for the badlisted-words variant.
pub fn badlist_router<A>(service: Shared<A>) -> Router
where
    A: Annotator<Item = String, Output = bool> + 'static,
{
    shared_routes::<A>(badlist_commands)
        .route("/badlisted_words", post(annotate_bad_words::<A>))
        .with_state(service)
}

/// Router for the assistance variant.
pub fn assistance_router<A>(service: Shared<A>) -> Router
where
    A: Annotator<Item = String, Output = AssistanceFlags> + 'static,
{
    shared_routes::<A>(assistance_commands)
        .route("/assistance", post(annotate_sentences::<A>))
        .with_state(service)
}

/// Router for the DialogRPT ranking variant.
pub fn ranking_router<A>(service: Shared<A>) -> Router
where
    A: Annotator<Item = RankingItem, Output = Vec<f64>> + 'static,
{
    shared_routes::<A>(ranking_commands)
        .route("/respond", post(score_responses::<A>))
        .with_state(service)
}

fn shared_routes<A>(catalog: fn() -> Vec<CommandDescriptor>) -> Router<Shared<A>>
where
    A: Annotator + 'static,
    A::Item: DeserializeOwned,
    A::Output: Serialize,
{
    Router::new()
        .route("/annotate", post(annotate_items::<A>))
        .route("/metrics", get(get_metrics::<A>))
        .route(
            "/commands",
            get(move || async move {
                Json(CommandsResponse {
                    commands: catalog(),
                })
            }),
        )
}

/// Request body carrying one sentence per item.
#[derive(Deserialize)]
struct SentencesRequest {
    sentences: Vec<String>,
}

/// Generic request body for `POST /annotate`.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ItemsRequest<T> {
    items: Vec<T>,
}

/// Response element for `POST /badlisted_words`.
#[derive(Serialize)]
struct BadWordsResponse {
    bad_words: Vec<bool>,
}

/// Request body for `POST /respond`.
#[derive(Deserialize)]
struct RespondRequest {
    #[serde(default)]
    dialog_contexts: Vec<String>,
    #[serde(default)]
    hypothesis: Vec<Vec<String>>,
}

/// Response body for `POST /respond`.
#[derive(Serialize)]
struct ScoresResponse {
    scores: Vec<Vec<f64>>,
}

async fn annotate_items<A>(
    State(service): State<Shared<A>>,
    Json(request): Json<ItemsRequest<A::Item>>,
) -> Json<Vec<A::Output>>
where
    A: Annotator + 'static,
    A::Item: DeserializeOwned,
    A::Output: Serialize,
{
    Json(service.process_batch(request.items).await)
}

async fn annotate_sentences<A>(
    State(service): State<Shared<A>>,
    Json(request): Json<SentencesRequest>,
) -> Json<Vec<A::Output>>
where
    A: Annotator<Item = String> + 'static,
    A::Output: Serialize,
{
    Json(service.process_batch(request.sentences).await)
}

async fn annotate_bad_words<A>(
    State(service): State<Shared<A>>,
    Json(request): Json<SentencesRequest>,
) -> Json<Vec<BadWordsResponse>>
where
    A: Annotator<Item = String, Output = bool> + 'static,
{
    let bad_words = service.process_batch(request.sentences).await;
    Json(vec![BadWordsResponse { bad_words }])
}

async fn score_responses<A>(
    State(service): State<Shared<A>>,
    Json(request): Json<RespondRequest>,
) -> Json<ScoresResponse>
where
    A: Annotator<Item = RankingItem, Output = Vec<f64>> + 'static,
{
    let items = pair_contexts(request.dialog_contexts, request.hypothesis);
    Json(ScoresResponse {
        scores: service.process_batch(items).await,
    })
}

/// Pair each context with its hypothesis list. Contexts without a list get an empty one;
/// lists without a context are dropped.
fn pair_contexts(contexts: Vec<String>, hypotheses: Vec<Vec<String>>) -> Vec<RankingItem> {
    let mut hypotheses = hypotheses.into_iter();
    contexts
        .into_iter()
        .map(|context| RankingItem {
            context,
            hypotheses: hypotheses.next().unwrap_or_default(),
        })
        .collect()
}

async fn get_metrics<A>(State(service): State<Shared<A>>) -> Json<MetricsSnapshot>
where
    A: Annotator + 'static,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

fn entity_commands() -> Vec<CommandDescriptor> {
    with_shared_commands(
        CommandDescriptor {
            name: "entities",
            method: "POST",
            path: "/entities",
            description: "Extract labelled named entities for each sentence.",
            request_example: Some(json!({ "sentences": ["i like baseball"] })),
        },
        json!({ "items": ["i like baseball"] }),
    )
}

fn badlist_commands() -> Vec<CommandDescriptor> {
    with_shared_commands(
        CommandDescriptor {
            name: "badlisted_words",
            method: "POST",
            path: "/badlisted_words",
            description: "Flag sentences containing badlisted words. Response is [{\"bad_words\": [bool]}].",
            request_example: Some(json!({ "sentences": ["good one"] })),
        },
        json!({ "items": ["good one"] }),
    )
}

fn assistance_commands() -> Vec<CommandDescriptor> {
    with_shared_commands(
        CommandDescriptor {
            name: "assistance",
            method: "POST",
            path: "/assistance",
            description: "Flag depression, bad-day and problem mentions for each sentence.",
            request_example: Some(json!({ "sentences": ["i had a bad day"] })),
        },
        json!({ "items": ["i had a bad day"] }),
    )
}

fn ranking_commands() -> Vec<CommandDescriptor> {
    with_shared_commands(
        CommandDescriptor {
            name: "respond",
            method: "POST",
            path: "/respond",
            description: "Score each hypothesis against its dialog context. Response is {\"scores\": [[number]]}.",
            request_example: Some(json!({
                "dialog_contexts": ["привет!"],
                "hypothesis": [["привет. как дела?"]]
            })),
        },
        json!({ "items": [{ "context": "привет!", "hypotheses": ["привет. как дела?"] }] }),
    )
}

fn with_shared_commands(
    native: CommandDescriptor,
    annotate_example: serde_json::Value,
) -> Vec<CommandDescriptor> {
    vec![
        native,
        CommandDescriptor {
            name: "annotate",
            method: "POST",
            path: "/annotate",
            description: "Annotate a batch of items; returns one result per item in request order.",
            request_example: Some(annotate_example),
        },
        CommandDescriptor {
            name: "metrics",
            method: "GET",
            path: "/metrics",
            description: "Return batch counters and the duration of the most recent batch.",
            request_example: None,
        },
    ]
}
