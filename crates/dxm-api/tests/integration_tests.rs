//! # Integration Tests for dxm-api
//!
//! Drives the assembled router with `oneshot` requests: health probes,
//! metrics, the HTML directory and form pages, the JSON API, and lead
//! relay against a wiremock webhook.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dxm_api::source::RecordSource;
use dxm_api::view::submission::SubmissionLedger;
use dxm_api::state::{AppConfig, AppState};
use dxm_core::{CompanyCollection, CompanyRecord, PageSize, RegionTags};
use dxm_webhook::{LeadWebhook, WebhookConfig};

fn record(id: u64, name: &str, region: &str, description: Option<&str>) -> CompanyRecord {
    CompanyRecord {
        id,
        name: name.to_string(),
        region: RegionTags::parse(region),
        logo: None,
        instagram: None,
        website: None,
        description: description.map(str::to_string),
    }
}

fn sample_records() -> CompanyCollection {
    CompanyCollection::from_records(vec![
        record(1, "메디플랜 디자인", "서울", Some("병원 인테리어 전문")),
        record(2, "클리닉하우스", "부산", Some("치과 전문 시공")),
        record(3, "닥터스페이스", "서울,경기", None),
        record(4, "힐링인테리어", "대구", Some("한의원 인테리어")),
        record(5, "제주메디컬", "제주", None),
    ])
}

fn unconfigured_webhook() -> LeadWebhook {
    LeadWebhook::new(WebhookConfig::default()).unwrap()
}

fn state_with(config: AppConfig, source: RecordSource, webhook: LeadWebhook) -> AppState {
    AppState::new(config, source, webhook)
}

/// Helper: build the test app over the sample records, no webhook.
fn test_app() -> axum::Router {
    dxm_api::app(state_with(
        AppConfig::default(),
        RecordSource::Static(sample_records()),
        unconfigured_webhook(),
    ))
}

/// Helper: build the test app with a webhook pointing at `server`.
fn test_app_with_webhook(server_uri: &str) -> (axum::Router, AppState) {
    let url = Url::parse(&format!("{server_uri}/exec")).unwrap();
    let state = state_with(
        AppConfig::default(),
        RecordSource::Static(sample_records()),
        LeadWebhook::new(WebhookConfig::with_url(url)).unwrap(),
    );
    (dxm_api::app(state.clone()), state)
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "integration-test")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn complete_quote() -> Value {
    let payload: serde_json::Map<String, Value> = dxm_core::LeadKind::Quote
        .fields()
        .iter()
        .map(|f| (f.name.to_string(), Value::String(format!("{} 입력", f.label))))
        .collect();
    serde_json::json!({ "payload": payload })
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_readiness_fails_when_source_missing() {
    let dir = tempfile::tempdir().unwrap();
    let app = dxm_api::app(state_with(
        AppConfig::default(),
        RecordSource::file(dir.path().join("companies.json")),
        unconfigured_webhook(),
    ));
    let response = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = test_app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );
}

#[tokio::test]
async fn test_metrics_disabled() {
    let config = AppConfig {
        metrics_enabled: false,
        ..AppConfig::default()
    };
    let app = dxm_api::app(state_with(
        config,
        RecordSource::Static(sample_records()),
        unconfigured_webhook(),
    ));
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_requests_are_counted() {
    let state = state_with(
        AppConfig::default(),
        RecordSource::Static(sample_records()),
        unconfigured_webhook(),
    );
    let app = dxm_api::app(state.clone());
    app.clone().oneshot(get("/v1/regions")).await.unwrap();
    app.oneshot(get("/v1/companies")).await.unwrap();
    assert_eq!(state.metrics.requests(), 2);
}

// -- HTML Directory -----------------------------------------------------------

#[tokio::test]
async fn test_directory_page_lists_companies() {
    let response = test_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("총 <strong>5</strong>개 업체"));
    assert!(html.contains("메디플랜 디자인"));
    assert!(html.contains("닥스밋 무료 개원 상담 신청"));
    assert!(html.contains("이용약관"));
}

#[tokio::test]
async fn test_directory_page_excludes_home_region() {
    let response = test_app()
        .oneshot(get("/?exclude_region=on"))
        .await
        .unwrap();
    let html = body_string(response).await;
    assert!(html.contains("총 <strong>3</strong>개 업체"));
    assert!(!html.contains("메디플랜 디자인"));
}

#[tokio::test]
async fn test_directory_page_no_results() {
    let response = test_app()
        .oneshot(get("/?q=%EC%97%86%EB%8A%94%EC%97%85%EC%B2%B4"))
        .await
        .unwrap();
    let html = body_string(response).await;
    assert!(html.contains("검색 결과가 없습니다"));
}

#[tokio::test]
async fn test_directory_page_degrades_on_broken_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("companies.json");
    std::fs::write(&path, "{ not json").unwrap();
    let state = state_with(
        AppConfig::default(),
        RecordSource::file(&path),
        unconfigured_webhook(),
    );
    let app = dxm_api::app(state.clone());
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("검색 결과가 없습니다"));
    assert_eq!(state.metrics.record_source_failures(), 1);
}

#[tokio::test]
async fn test_companies_degrade_on_failing_url_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/companies.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/data/companies.json", server.uri())).unwrap();
    let state = state_with(
        AppConfig::default(),
        RecordSource::http(url).unwrap(),
        unconfigured_webhook(),
    );
    let app = dxm_api::app(state.clone());
    let response = app.oneshot(get("/v1/companies")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["filtered_count"], 0);
    assert_eq!(json["total_count"], 0);
    assert_eq!(json["empty"], true);
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(state.metrics.record_source_failures(), 1);
}

#[tokio::test]
async fn test_directory_redirect() {
    let response = test_app().oneshot(get("/directory?q=abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/?q=abc");
}

// -- JSON Directory -----------------------------------------------------------

#[tokio::test]
async fn test_regions() {
    let response = test_app().oneshot(get("/v1/regions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["regions"].as_array().unwrap().len(), 17);
    assert_eq!(json["regions"][0], "서울");
    assert_eq!(json["excluded_region"], "서울");
}

#[tokio::test]
async fn test_companies_unfiltered() {
    let response = test_app().oneshot(get("/v1/companies")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["filtered_count"], 5);
    assert_eq!(json["total_count"], 5);
    assert_eq!(json["page"], 1);
    assert_eq!(json["total_pages"], 1);
    assert_eq!(json["page_size"], 20);
    assert_eq!(json["empty"], false);
    assert_eq!(json["items"][0]["id"], 1);
}

#[tokio::test]
async fn test_companies_region_selection_and_unknown_region() {
    // 서울 + 제주, plus an unknown name that must be ignored.
    let response = test_app()
        .oneshot(get(
            "/v1/companies?region=%EC%84%9C%EC%9A%B8&region=%EC%A0%9C%EC%A3%BC&region=Atlantis",
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    let ids: Vec<u64> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 5]);
}

#[tokio::test]
async fn test_companies_search_matches_description() {
    let response = test_app()
        .oneshot(get("/v1/companies?q=%EC%B9%98%EA%B3%BC"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["filtered_count"], 1);
    assert_eq!(json["items"][0]["name"], "클리닉하우스");
    assert_eq!(json["items"][0]["instagram"]["enabled"], false);
}

#[tokio::test]
async fn test_companies_page_clamps() {
    let config = AppConfig {
        page_size: PageSize::new(2).unwrap(),
        ..AppConfig::default()
    };
    let app = dxm_api::app(state_with(
        config,
        RecordSource::Static(sample_records()),
        unconfigured_webhook(),
    ));
    let response = app.oneshot(get("/v1/companies?page=99")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["page"], 3);
    assert_eq!(json["total_pages"], 3);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

// -- Lead Forms (JSON) --------------------------------------------------------

#[tokio::test]
async fn test_form_definition() {
    let response = test_app().oneshot(get("/v1/forms/vendor_register")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["fields"].as_array().unwrap().len(), 9);
    assert_eq!(json["fields"][0]["name"], "companyName");
}

#[tokio::test]
async fn test_unknown_form_kind_is_404() {
    let response = test_app().oneshot(get("/v1/forms/partner")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_lead_missing_fields() {
    let body = serde_json::json!({ "payload": { "name": "홍길동", "phone": "   " } });
    let response = test_app()
        .oneshot(post_json("/v1/leads/quote", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "MISSING_FIELDS");
    let missing = json["error"]["details"]["missing"].as_array().unwrap();
    assert_eq!(missing.len(), 9);
    assert_eq!(missing[0], "phone");
}

#[tokio::test]
async fn test_lead_without_webhook_is_503() {
    let state = state_with(
        AppConfig::default(),
        RecordSource::Static(sample_records()),
        unconfigured_webhook(),
    );
    let app = dxm_api::app(state.clone());
    let response = app
        .oneshot(post_json("/v1/leads/quote", complete_quote()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "WEBHOOK_NOT_CONFIGURED");
    assert_eq!(json["error"]["message"], dxm_webhook::NOT_CONFIGURED_DIAGNOSTIC);
    assert_eq!(
        state.metrics.leads(
            dxm_core::LeadKind::Quote,
            dxm_api::middleware::metrics::LeadOutcome::NotConfigured
        ),
        1
    );
}

#[tokio::test]
async fn test_lead_relayed_to_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = test_app_with_webhook(&server.uri());
    let response = app
        .oneshot(post_json("/v1/leads/quote", complete_quote()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["title"], "의사가 만나는 의사 닥스밋");

    let received = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["type"], "quote");
    assert_eq!(sent["payload"]["name"], "이름 입력");
    assert_eq!(sent["meta"]["userAgent"], "integration-test");
    assert_eq!(
        state.metrics.leads(
            dxm_core::LeadKind::Quote,
            dxm_api::middleware::metrics::LeadOutcome::Sent
        ),
        1
    );
}

#[tokio::test]
async fn test_lead_transport_failure_echoes_payload() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let (app, _) = test_app_with_webhook(&uri);
    let response = app
        .oneshot(post_json("/v1/leads/quote", complete_quote()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "LEAD_DELIVERY_FAILED");
    assert_eq!(
        json["error"]["message"],
        dxm_core::LeadKind::Quote.retry_message()
    );
    assert_eq!(json["error"]["details"]["payload"]["rooms"], "필요실 입력");
}

// -- Lead Forms (HTML) --------------------------------------------------------

#[tokio::test]
async fn test_quote_page_renders_fields() {
    let response = test_app().oneshot(get("/quote")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("견적 요청하기"));
    assert!(html.contains(r#"name="contractStatus""#));
    assert!(html.contains("디렉토리로 돌아가기"));
}

#[tokio::test]
async fn test_register_post_without_webhook_keeps_values() {
    let pairs: Vec<(&str, &str)> = dxm_core::LeadKind::VendorRegister
        .fields()
        .iter()
        .map(|f| (f.name, "메디플랜"))
        .collect();
    let response = test_app()
        .oneshot(post_form("/register", &pairs))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let html = body_string(response).await;
    assert!(html.contains(dxm_webhook::NOT_CONFIGURED_DIAGNOSTIC));
    assert!(html.contains(r#"value="메디플랜""#));
}

#[tokio::test]
async fn test_quote_post_confirms_and_clears() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = test_app_with_webhook(&server.uri());
    let pairs: Vec<(&str, &str)> = dxm_core::LeadKind::Quote
        .fields()
        .iter()
        .map(|f| (f.name, "홍길동"))
        .collect();
    let response = app.oneshot(post_form("/quote", &pairs)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(r#"<dialog class="confirmation" open>"#));
    assert!(!html.contains(r#"value="홍길동""#));

    let received = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["meta"]["page"], "https://doxtalk.co.kr/quote");
}

#[tokio::test]
async fn test_quote_post_missing_fields() {
    let response = test_app()
        .oneshot(post_form("/quote", &[("name", "홍길동")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_string(response).await;
    assert!(html.contains("필수 항목을 모두 입력해주세요."));
    assert!(html.contains(r#"value="홍길동""#));
}

/// Submission token embedded in a rendered form page.
fn form_token(html: &str) -> String {
    let marker = r#"name="submission_token" value=""#;
    let start = html.find(marker).expect("form carries a token") + marker.len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end].to_string()
}

fn complete_quote_pairs(token: &str) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = dxm_core::LeadKind::Quote
        .fields()
        .iter()
        .map(|f| (f.name, "홍길동"))
        .collect();
    pairs.push(("submission_token", token));
    pairs
}

#[tokio::test]
async fn test_concurrent_posts_with_same_token_relay_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = test_app_with_webhook(&server.uri());
    let page = body_string(app.clone().oneshot(get("/quote")).await.unwrap()).await;
    let token = form_token(&page);
    let pairs = complete_quote_pairs(&token);

    let (first, second) = tokio::join!(
        app.clone().oneshot(post_form("/quote", &pairs)),
        app.clone().oneshot(post_form("/quote", &pairs)),
    );
    let (first, second) = (first.unwrap(), second.unwrap());
    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 409]);

    let duplicate = if first.status() == StatusCode::CONFLICT { first } else { second };
    let html = body_string(duplicate).await;
    assert!(html.contains(r#"<button type="submit" disabled>전송 중...</button>"#));
    assert_ne!(form_token(&html), token);

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(
        state
            .metrics
            .leads(dxm_core::LeadKind::Quote, dxm_api::middleware::metrics::LeadOutcome::Duplicate),
        1
    );
}

#[tokio::test]
async fn test_replayed_token_shows_recorded_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = test_app_with_webhook(&server.uri());
    let token = SubmissionLedger::issue();
    let pairs = complete_quote_pairs(&token);

    let first = app.clone().oneshot(post_form("/quote", &pairs)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let replay = app.oneshot(post_form("/quote", &pairs)).await.unwrap();
    assert_eq!(replay.status(), StatusCode::CONFLICT);
    let html = body_string(replay).await;
    assert!(html.contains(r#"<dialog class="confirmation" open>"#));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_fields_post_keeps_token_usable() {
    let app = test_app();
    let token = SubmissionLedger::issue();

    let incomplete = app
        .clone()
        .oneshot(post_form("/quote", &[("name", "홍길동"), ("submission_token", token.as_str())]))
        .await
        .unwrap();
    assert_eq!(incomplete.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let complete = app
        .oneshot(post_form("/quote", &complete_quote_pairs(&token)))
        .await
        .unwrap();
    assert_eq!(complete.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Static Pages -------------------------------------------------------------

#[tokio::test]
async fn test_terms_page() {
    let response = test_app().oneshot(get("/terms")).await.unwrap();
    let html = body_string(response).await;
    assert!(html.contains("https://www.doxmeet.com/about/tos"));
}

#[tokio::test]
async fn test_sitemap_xml() {
    let response = test_app().oneshot(get("/sitemap.xml")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml; charset=utf-8"
    );
    let xml = body_string(response).await;
    assert!(xml.contains("<loc>https://doxtalk.co.kr/register</loc>"));
}

#[tokio::test]
async fn test_sitemap_page() {
    let response = test_app().oneshot(get("/sitemap-page")).await.unwrap();
    let html = body_string(response).await;
    assert!(html.contains(r#"<a href="/quote">"#));
}

#[tokio::test]
async fn test_logos_served_from_public_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("logos")).unwrap();
    std::fs::write(dir.path().join("logos/1.png"), b"\x89PNG").unwrap();
    let config = AppConfig {
        public_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let app = dxm_api::app(state_with(
        config,
        RecordSource::Static(sample_records()),
        unconfigured_webhook(),
    ));
    let response = app.oneshot(get("/logos/1.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_json() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/v1/companies"].is_object());
}
