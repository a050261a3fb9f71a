use annotators::{
    batch::{BatchService, BatchSettings},
    config::{BackendConfig, Config, ServiceKind},
    downstream::{CobotNerClient, DialogRptScorer, RankingItem},
};

fn load(service: ServiceKind) -> Config {
    dotenvy::dotenv().ok();
    Config::from_env(service).expect("live configuration must be present in the environment")
}

#[tokio::test]
#[ignore = "Requires live CoBot NER endpoint"]
async fn live_cobot_ner_batch() {
    let config = load(ServiceKind::CobotNer);
    let BackendConfig::CobotNer {
        api_key,
        service_url,
    } = &config.backend
    else {
        unreachable!("cobot configuration expected");
    };
    let client = CobotNerClient::new(service_url, api_key).expect("client");
    let service = BatchService::new(client, BatchSettings::sequential(config.timeout));

    let output = service
        .process_batch(vec![
            "i like baseball and michael jordan".to_string(),
            "hello".to_string(),
        ])
        .await;

    assert_eq!(output.len(), 2);
    assert_eq!(service.metrics_snapshot().failures, 0, "live endpoint failed");
}

#[tokio::test]
#[ignore = "Requires live DialogRPT scorer"]
async fn live_dialogrpt_warm_up_and_score() {
    let config = load(ServiceKind::Dialogrpt);
    let BackendConfig::DialogRpt {
        scorer_url,
        model_name,
        ..
    } = &config.backend
    else {
        unreachable!("dialogrpt configuration expected");
    };
    let scorer = DialogRptScorer::new(scorer_url, model_name).expect("scorer");
    scorer.warm_up().await.expect("warm-up");

    let service = BatchService::new(scorer, BatchSettings::sequential(config.timeout));
    let scores = service
        .process_batch(vec![RankingItem {
            context: "привет!".into(),
            hypotheses: vec!["привет. как дела?".into(), "пока".into()],
        }])
        .await;
    assert_eq!(scores[0].len(), 2);
}
