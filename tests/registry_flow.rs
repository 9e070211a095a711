use sublate::core::registry;
use sublate::{
    builtin_registry, Credentials, ErrorKind, Language, ProviderId, Request, Translator,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn installed_registry_drives_text_and_batch_translation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_partial_json(serde_json::json!({"text": ["hello"], "target_lang": "DE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translations": [{"detected_source_language": "EN", "text": "hallo"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_partial_json(serde_json::json!({"text": ["bye"], "target_lang": "FR"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translations": [{"text": "au revoir"}]
        })))
        .mount(&server)
        .await;

    // Lookups before the bootstrap fail cleanly
    let credentials = Credentials::new("test-key").with_base_url(server.uri());
    if registry::global().is_none() {
        let err = registry::get_client(&ProviderId::DEEPL, &credentials)
            .err()
            .expect("no registry installed yet");
        assert_eq!(err.kind(), ErrorKind::InvalidProvider);
    }

    registry::install(builtin_registry().unwrap()).unwrap();
    let err = registry::install(builtin_registry().unwrap())
        .err()
        .expect("second install must fail");
    assert_eq!(err.kind(), ErrorKind::InvalidProvider);

    let err = registry::get_client(&ProviderId::new("google"), &credentials)
        .err()
        .expect("unknown provider");
    assert_eq!(err.kind(), ErrorKind::InvalidProvider);

    let client = registry::get_client(&ProviderId::DEEPL, &credentials).unwrap();
    let translator = Translator::new().with_poll_interval(Duration::from_millis(10));
    let ctx = CancellationToken::new();

    let request = Request::text(["hello"], Language::German).with_from(Language::English);
    let response = translator.translate(&ctx, &request, client.as_ref()).await.unwrap();
    assert_eq!(response.text, vec!["hallo".to_string()]);

    let requests = vec![
        Request::text(["hello"], Language::German),
        Request::text(["hello"], Language::Thai),
        Request::text(["bye"], Language::French),
    ];
    let results = translator.batch_translate(&ctx, &requests, client.as_ref()).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().text, vec!["hallo".to_string()]);
    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLanguage);
    assert!(err.to_string().contains("TH"));
    assert_eq!(results[2].as_ref().unwrap().text, vec!["au revoir".to_string()]);
}
