use std::time::Duration;

use annotators::{
    bootstrap::{StartupError, build_router},
    config::{BackendConfig, Config, ServiceKind},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use httpmock::{Method::POST, MockServer};
use serde_json::{Value, json};
use tower::ServiceExt;

fn config(service: ServiceKind, timeout_ms: u64, backend: BackendConfig) -> Config {
    Config {
        service,
        server_port: 0,
        batch_concurrency: 1,
        timeout: Duration::from_millis(timeout_ms),
        backend,
    }
}

async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&body).expect("json body"))
}

#[tokio::test]
async fn entity_failures_stay_isolated_to_their_items() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ner")
                .header("x-api-key", "secret")
                .json_body(json!({ "input": "i like baseball" }));
            then.status(200).json_body(json!({
                "response": [{ "text": "baseball", "label": "sport" }],
                "model_version": "v1.1"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ner")
                .json_body(json!({ "input": "broken" }));
            then.status(500).body("internal error");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ner")
                .json_body(json!({ "input": "slow" }));
            then.status(200)
                .delay(Duration::from_millis(800))
                .json_body(json!({ "response": [{ "text": "late", "label": "misc" }] }));
        })
        .await;

    let app = build_router(&config(
        ServiceKind::CobotNer,
        200,
        BackendConfig::CobotNer {
            api_key: "secret".into(),
            service_url: server.url("/ner"),
        },
    ))
    .await
    .expect("router");

    let (status, body) = post_json(
        app.clone(),
        "/entities",
        json!({ "sentences": ["i like baseball", "broken", "slow", "i like baseball"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let empty = json!({ "entities": [], "labelled_entities": [] });
    let baseball = json!({
        "entities": ["baseball"],
        "labelled_entities": [{ "text": "baseball", "label": "sport" }]
    });
    assert_eq!(body, json!([baseball, empty, empty, baseball]));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/metrics")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("metrics response");
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let metrics: Value = serde_json::from_slice(&bytes).expect("metrics json");
    assert_eq!(metrics["items"], 4);
    assert_eq!(metrics["failures"], 2);
}

#[tokio::test]
async fn unreachable_ner_backend_degrades_to_fallbacks() {
    let app = build_router(&config(
        ServiceKind::CobotNer,
        600,
        BackendConfig::CobotNer {
            api_key: "secret".into(),
            service_url: "http://127.0.0.1:9/ner".into(),
        },
    ))
    .await
    .expect("router");

    let (status, body) = post_json(app, "/annotate", json!({ "items": ["a", "b"] })).await;

    assert_eq!(status, StatusCode::OK);
    let empty = json!({ "entities": [], "labelled_entities": [] });
    assert_eq!(body, json!([empty, empty]));
}

#[tokio::test]
async fn failing_scorer_returns_zero_per_hypothesis() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/score");
            then.status(500).body("CUDA out of memory");
        })
        .await;

    let app = build_router(&config(
        ServiceKind::Dialogrpt,
        500,
        BackendConfig::DialogRpt {
            scorer_url: server.url("/score"),
            model_name: "dialogrpt_ru_ckpt_v0.pth".into(),
            skip_warmup: true,
        },
    ))
    .await
    .expect("router");

    let (status, body) = post_json(
        app.clone(),
        "/respond",
        json!({ "dialog_contexts": ["привет!"], "hypothesis": [["привет. как дела?"]] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "scores": [[0.0]] }));

    let (_, body) = post_json(
        app,
        "/respond",
        json!({ "dialog_contexts": ["a", "b", "c"], "hypothesis": [["x", "y", "z"], []] }),
    )
    .await;
    assert_eq!(body, json!({ "scores": [[0.0, 0.0, 0.0], [], []] }));
}

#[tokio::test]
async fn scorer_results_follow_context_order() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/score").json_body(json!({
                "context": "first",
                "hypotheses": ["a", "b"],
                "model": "ckpt.pth"
            }));
            then.status(200).json_body(json!({ "scores": [0.25, 0.5] }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/score").json_body(json!({
                "context": "second",
                "hypotheses": ["c"],
                "model": "ckpt.pth"
            }));
            then.status(200).json_body(json!({ "scores": [0.75] }));
        })
        .await;

    let app = build_router(&config(
        ServiceKind::Dialogrpt,
        500,
        BackendConfig::DialogRpt {
            scorer_url: server.url("/score"),
            model_name: "ckpt.pth".into(),
            skip_warmup: true,
        },
    ))
    .await
    .expect("router");

    let (status, body) = post_json(
        app,
        "/annotate",
        json!({ "items": [
            { "context": "first", "hypotheses": ["a", "b"] },
            { "context": "second", "hypotheses": ["c"] }
        ] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([[0.25, 0.5], [0.75]]));
}

#[tokio::test]
async fn scorer_warm_up_failure_is_fatal() {
    let server = MockServer::start_async().await;
    let warmup = server
        .mock_async(|when, then| {
            when.method(POST).path("/score").json_body(json!({
                "context": "привет!",
                "hypotheses": ["привет. как дела?"],
                "model": "ckpt.pth"
            }));
            then.status(503).body("loading");
        })
        .await;

    let result = build_router(&config(
        ServiceKind::Dialogrpt,
        500,
        BackendConfig::DialogRpt {
            scorer_url: server.url("/score"),
            model_name: "ckpt.pth".into(),
            skip_warmup: false,
        },
    ))
    .await;

    warmup.assert_async().await;
    assert!(matches!(result, Err(StartupError::Warmup(_))));
}

#[tokio::test]
async fn scorer_warm_up_is_bounded_by_deadline() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/score");
            then.status(200)
                .delay(Duration::from_secs(4))
                .json_body(json!({ "scores": [0.5] }));
        })
        .await;

    let started = std::time::Instant::now();
    let result = build_router(&config(
        ServiceKind::Dialogrpt,
        200,
        BackendConfig::DialogRpt {
            scorer_url: server.url("/score"),
            model_name: "ckpt.pth".into(),
            skip_warmup: false,
        },
    ))
    .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    match result {
        Err(StartupError::Warmup(error)) => assert_eq!(error.kind(), "timeout"),
        Err(other) => panic!("unexpected startup error: {other}"),
        Ok(_) => panic!("warm-up should not succeed past its deadline"),
    }
}

#[tokio::test]
async fn badlisted_words_scenario() {
    let app = build_router(&config(
        ServiceKind::BadlistedWords,
        100,
        BackendConfig::BadlistedWords { lexicon_path: None },
    ))
    .await
    .expect("router");

    let (status, body) = post_json(
        app,
        "/badlisted_words",
        json!({ "sentences": ["any fucks in this sentence", "good one", "fucked one"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "bad_words": [true, false, true] }]));
}

#[tokio::test]
async fn custom_lexicon_file_replaces_builtin() {
    let path = std::env::temp_dir().join(format!("annotators-lexicon-{}.txt", std::process::id()));
    std::fs::write(&path, "# custom\nbanana*\n").expect("write lexicon");

    let app = build_router(&config(
        ServiceKind::BadlistedWords,
        100,
        BackendConfig::BadlistedWords {
            lexicon_path: Some(path.clone()),
        },
    ))
    .await
    .expect("router");

    let (_, body) = post_json(
        app,
        "/badlisted_words",
        json!({ "sentences": ["bananas again", "fucked one"] }),
    )
    .await;
    let _ = std::fs::remove_file(&path);

    assert_eq!(body, json!([{ "bad_words": [true, false] }]));
}

#[tokio::test]
async fn missing_lexicon_file_prevents_startup() {
    let result = build_router(&config(
        ServiceKind::BadlistedWords,
        100,
        BackendConfig::BadlistedWords {
            lexicon_path: Some("/nonexistent/annotators/lexicon.txt".into()),
        },
    ))
    .await;

    assert!(matches!(result, Err(StartupError::Lexicon(_))));
}

#[tokio::test]
async fn assistance_flags_per_sentence() {
    let app = build_router(&config(
        ServiceKind::Assistance,
        100,
        BackendConfig::Assistance,
    ))
    .await
    .expect("router");

    let (status, body) = post_json(
        app,
        "/assistance",
        json!({ "sentences": ["i had an awful day", "tell me a joke"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "depression": false, "bad_day": true, "problems": false },
            { "depression": false, "bad_day": false, "problems": false }
        ])
    );
}
