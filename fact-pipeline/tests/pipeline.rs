use std::sync::Arc;

use ai_llm_service::{LlmModelConfig, LlmProvider, LlmService};
use fact_pipeline::{
    AnalysisStore, ArticleGenerator, OutputLanguage, PhaseOneInput, PhaseOneService,
    PipelineError, SourceResolver,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    }))
}

fn too_large() -> ResponseTemplate {
    ResponseTemplate::new(413).set_body_json(json!({
        "error": { "message": "Request too large for model. Please reduce your message size" }
    }))
}

fn generator(server: &MockServer) -> ArticleGenerator {
    let cfg = LlmModelConfig::new(
        LlmProvider::OpenAI,
        "gpt-4o-mini",
        format!("{}/v1", server.uri()),
        Some("sk-test".into()),
    );
    ArticleGenerator::new(Arc::new(LlmService::new(cfg, Some(2)).unwrap()))
}

fn service(server: &MockServer) -> PhaseOneService {
    PhaseOneService::new(
        generator(server),
        SourceResolver::new().unwrap(),
        Arc::new(AnalysisStore::new()),
    )
}

async fn stage(server: &MockServer, marker: &str, reply: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(marker))
        .respond_with(reply)
        .mount(server)
        .await;
}

async fn user_prompts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let body: Value = r.body_json().expect("json body");
            body["messages"][1]["content"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

async fn mount_english_stages(server: &MockServer) {
    let facts = r#"{"facts":["Rain fell for six hours.","Two roads were closed.","rain fell for six hours."]}"#;
    stage(server, "Extract clean facts", chat_reply(facts)).await;
    stage(
        server,
        "Generate missing-context questions",
        chat_reply(r#"{"gaps":["Which roads were closed?","Who ordered the closure?"]}"#),
    )
    .await;
    stage(
        server,
        "Generate one structured article",
        chat_reply("```json\n{\"article\":\"  Rain closed two roads.  \"}\n```"),
    )
    .await;
}

#[tokio::test]
async fn english_run_generates_saves_and_returns_everything() {
    let server = MockServer::start().await;
    mount_english_stages(&server).await;
    stage(
        &server,
        "Generate headline options",
        chat_reply(r#"{"headlines":["H1","H2","H3","H4","H5","H6"]}"#),
    )
    .await;
    stage(
        &server,
        "Generate strapline options",
        chat_reply(r#"{"straplines":["S1","S2"]}"#),
    )
    .await;

    let svc = service(&server);
    let out = svc
        .run(PhaseOneInput {
            text: "Heavy rain fell for six hours and two roads were closed.".into(),
            category: "Weather".into(),
            with_headlines: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(out.article_id, 1);
    assert_eq!(out.language, OutputLanguage::English);
    assert_eq!(out.facts, vec!["Rain fell for six hours.", "Two roads were closed."]);
    assert_eq!(out.gaps.len(), 2);
    assert_eq!(out.article, "Rain closed two roads.");
    assert_eq!(out.headlines, vec!["H1", "H2", "H3", "H4", "H5"]);
    assert_eq!(out.straplines, vec!["S1", "S2"]);

    let saved = svc.store().get(out.article_id).await.unwrap();
    assert_eq!(saved.status, "pending");
    assert_eq!(saved.topic.as_ref().unwrap().name, "Weather");
    assert_eq!(saved.fact_texts(), out.facts);

    let prompts = user_prompts(&server).await;
    assert_eq!(prompts.len(), 5);
    let gaps_input = "Input:\nFacts:\n- Rain fell for six hours.\n- Two roads were closed.";
    assert!(prompts[1].contains(gaps_input));
    assert!(prompts[4].contains("Open gaps:\n- Which roads were closed?"));
}

#[tokio::test]
async fn headline_stages_are_skipped_unless_requested() {
    let server = MockServer::start().await;
    mount_english_stages(&server).await;

    let out = service(&server)
        .run(PhaseOneInput {
            text: "Heavy rain fell.".into(),
            language: "en".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(out.headlines.is_empty());
    assert!(out.straplines.is_empty());
    assert_eq!(user_prompts(&server).await.len(), 3);
}

#[tokio::test]
async fn telugu_output_is_generated_in_english_then_translated() {
    let server = MockServer::start().await;
    mount_english_stages(&server).await;
    stage(&server, "Translate each line", chat_reply("1. మొదటి\n2. రెండవ")).await;
    let translated = chat_reply("వర్షం రెండు రహదారులను మూసివేసింది.");
    stage(&server, "Translate the following text", translated).await;

    let out = service(&server)
        .run(PhaseOneInput {
            text: "Heavy rain fell.".into(),
            language: "te".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(out.language, OutputLanguage::Telugu);
    assert_eq!(out.facts, vec!["మొదటి", "రెండవ"]);
    assert_eq!(out.gaps, vec!["మొదటి", "రెండవ"]);
    assert_eq!(out.article, "వర్షం రెండు రహదారులను మూసివేసింది.");

    let prompts = user_prompts(&server).await;
    assert!(prompts[0].contains("Only translate the string values into English."));
    let numbered = "Input lines:\n1. Rain fell for six hours.\n2. Two roads were closed.";
    assert!(prompts[3].contains(numbered));
}

#[tokio::test]
async fn list_translation_falls_back_to_item_by_item() {
    let server = MockServer::start().await;
    stage(&server, "Translate each line", chat_reply("only one line")).await;
    stage(&server, "Translate the following text", chat_reply("```\nఅనువాదం\n```")).await;

    let stages = generator(&server);
    let items = vec!["first".to_string(), "  ".to_string(), "second".to_string()];
    let out = stages.translate_list(&items, OutputLanguage::Telugu).await.unwrap();

    assert_eq!(out, vec!["అనువాదం", "అనువాదం"]);
    assert_eq!(user_prompts(&server).await.len(), 3);
}

#[tokio::test]
async fn english_translation_never_calls_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("x"))
        .expect(0)
        .mount(&server)
        .await;

    let stages = generator(&server);
    let items = vec![" a ".to_string(), "A".to_string(), "b".to_string()];
    let english = stages.translate_list(&items, OutputLanguage::English).await.unwrap();
    assert_eq!(english, vec!["a", "b"]);
    assert_eq!(stages.translate_text(" body ", OutputLanguage::English).await.unwrap(), "body");
    assert!(stages.translate_list(&[], OutputLanguage::Telugu).await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_fact_requests_shrink_up_to_four_attempts() {
    let server = MockServer::start().await;
    stage(&server, "Extract clean facts", too_large()).await;

    let err = generator(&server)
        .extract_facts(&"w".repeat(2_000), OutputLanguage::English)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Llm(ref e) if e.is_request_too_large()));

    let inputs: Vec<usize> = user_prompts(&server)
        .await
        .iter()
        .map(|p| p.matches('w').count())
        .collect();
    assert_eq!(inputs.len(), 4);
    assert!(inputs.windows(2).all(|w| w[1] < w[0]));
}

#[tokio::test]
async fn shrinking_stops_once_input_hits_the_floor() {
    let server = MockServer::start().await;
    stage(&server, "Extract clean facts", too_large()).await;

    let err = generator(&server)
        .extract_facts(&"q".repeat(1_000), OutputLanguage::English)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Llm(_)));
    assert_eq!(user_prompts(&server).await.len(), 2);
}

#[tokio::test]
async fn shrunk_retry_can_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(too_large())
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    stage(&server, "Extract clean facts", chat_reply(r#"{"Facts":["kept"]}"#)).await;

    let facts = generator(&server)
        .extract_facts(&"k".repeat(5_000), OutputLanguage::English)
        .await
        .unwrap();
    assert_eq!(facts, vec!["kept"]);
}

#[tokio::test]
async fn other_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "bad key" })))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator(&server)
        .extract_facts(&"z".repeat(5_000), OutputLanguage::English)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("bad key"));
}

#[tokio::test]
async fn empty_stage_output_is_an_error() {
    let server = MockServer::start().await;
    stage(&server, "Extract clean facts", chat_reply(r#"{"facts":["  ",""]}"#)).await;

    let err = generator(&server)
        .extract_facts("some text", OutputLanguage::English)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyOutput { stage: "extract-facts" }));
}

#[tokio::test]
async fn stages_validate_their_inputs() {
    let server = MockServer::start().await;
    let stages = generator(&server);

    assert!(matches!(
        stages.extract_facts("   ", OutputLanguage::English).await,
        Err(PipelineError::Validation(_))
    ));
    assert!(matches!(
        stages.generate_gaps(&[], OutputLanguage::English).await,
        Err(PipelineError::Validation(_))
    ));
    assert!(matches!(
        stages.generate_headlines(&[" ".to_string()], "a", OutputLanguage::English).await,
        Err(PipelineError::Validation(_))
    ));
    assert!(matches!(
        stages.translate_text(" ", OutputLanguage::Telugu).await,
        Err(PipelineError::Validation(_))
    ));
}

#[tokio::test]
async fn article_prompt_and_strapline_gap_placeholders() {
    let server = MockServer::start().await;
    let article = chat_reply(r#"{"text":"Only field."}"#);
    stage(&server, "Generate one structured article", article).await;
    let straplines = chat_reply(r#"{"straplines":["a","b","c","d","e"]}"#);
    stage(&server, "Generate strapline options", straplines).await;

    let stages = generator(&server);
    let facts = vec!["F".to_string()];
    let article = stages.generate_article(&facts, &[], OutputLanguage::English).await.unwrap();
    assert_eq!(article, "Only field.");

    let long_article = "~".repeat(2_000);
    let straplines = stages
        .generate_straplines(&facts, &[], &long_article, OutputLanguage::English)
        .await
        .unwrap();
    assert_eq!(straplines.len(), 4);

    let prompts = user_prompts(&server).await;
    assert!(prompts[0].contains("Facts:\n- F\n\nGaps:\n\n\nImportant:"));
    assert!(prompts[1].contains("Open gaps:\n- None"));
    assert_eq!(prompts[1].matches('~').count(), 900);
}

#[tokio::test]
async fn headline_options_are_regenerated_for_saved_analyses() {
    let server = MockServer::start().await;
    mount_english_stages(&server).await;
    let headlines = chat_reply(r#"{"headlines":["New headline"]}"#);
    stage(&server, "Generate headline options", headlines).await;
    let straplines = chat_reply(r#"{"straplines":["New strapline"]}"#);
    stage(&server, "Generate strapline options", straplines).await;

    let svc = service(&server);
    let out = svc
        .run(PhaseOneInput {
            text: "Heavy rain fell.".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let options = svc.generate_headline_options(out.article_id).await.unwrap();
    assert_eq!(options.headlines, vec!["New headline"]);
    let saved = svc.store().get(out.article_id).await.unwrap();
    assert_eq!(saved.straplines, vec!["New strapline"]);

    let missing = svc.generate_headline_options(99).await.unwrap_err();
    assert!(matches!(missing, PipelineError::Store(_)));
}

#[tokio::test]
async fn url_sources_are_fetched_and_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            "<html><script>track()</script><body>",
            "<p>Council approved the budget &amp; plan.</p></body></html>",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><style>p{}</style></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resolver = SourceResolver::new().unwrap();

    let story = resolver.resolve("", &format!("{}/story", server.uri())).await.unwrap();
    assert_eq!(story.text, "Council approved the budget & plan.");
    assert_eq!(story.source_url, format!("{}/story", server.uri()));

    let blank = resolver.resolve("", &format!("{}/blank", server.uri())).await.unwrap_err();
    assert_eq!(blank.to_string(), "could not extract readable text from url");

    let gone = resolver.resolve("", &format!("{}/gone", server.uri())).await.unwrap_err();
    assert!(gone.to_string().contains("404"));
}
