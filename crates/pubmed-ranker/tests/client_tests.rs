//! E-utilities client behavior against a mock server.
//!
//! Covers the search/fetch failure taxonomy: systemic search failures are
//! errors, malformed search answers are empty, and every fetch failure is a skip.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pubmed_ranker::client::{FetchOutcome, PubMedClient};
use pubmed_ranker::config::Config;
use pubmed_ranker::error::{ClientError, RunError, SkipReason};
use pubmed_ranker::models::{ArticleId, ScoringProfile, SearchConfiguration};
use pubmed_ranker::pipeline::{Ranker, RunOptions};

fn client_for(mock_server: &MockServer) -> PubMedClient {
    PubMedClient::new(Config::for_testing(&mock_server.uri())).unwrap()
}

fn article_xml(pmid: &str, title: &str, journal: &str) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\
        <PubmedArticleSet><PubmedArticle><MedlineCitation>\
        <PMID Version=\"1\">{pmid}</PMID>\
        <Article><Journal><JournalIssue><PubDate><Year>2025</Year></PubDate></JournalIssue>\
        <Title>{journal}</Title></Journal>\
        <ArticleTitle>{title}</ArticleTitle></Article>\
        </MedlineCitation></PubmedArticle></PubmedArticleSet>"
    )
}

async fn mount_article(mock_server: &MockServer, pmid: &str, title: &str, journal: &str) {
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", pmid))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(article_xml(pmid, title, journal)),
        )
        .mount(mock_server)
        .await;
}

// =============================================================================
// Identifier Search
// =============================================================================

#[tokio::test]
async fn test_search_sends_expected_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("retmode", "json"))
        .and(query_param("retmax", "250"))
        .and(query_param("term", "diabetes AND 2024[dp]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"type": "esearch", "version": "0.3"},
            "esearchresult": {"count": "3", "retmax": "3", "idlist": ["30", "10", "20"]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ids = client.search_ids("diabetes AND 2024[dp]", 250).await.unwrap();

    assert_eq!(ids, vec![ArticleId::new("30"), ArticleId::new("10"), ArticleId::new("20")]);
}

#[tokio::test]
async fn test_search_limit_is_capped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("retmax", "250"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"esearchresult": {"idlist": []}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.search_ids("q", 10_000).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_sends_api_key_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("api_key", "secret"))
        .and(query_param("email", "me@example.org"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"esearchresult": {"idlist": ["1"]}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.api_key = Some("secret".to_string());
    config.email = Some("me@example.org".to_string());
    let client = PubMedClient::new(config).unwrap();

    assert_eq!(client.search_ids("q", 5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_malformed_json_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ invalid json here"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.search_ids("q", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_missing_idlist_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"ERROR": "Invalid query syntax"}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.search_ids("((", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_server_error_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.search_ids("q", 10).await.unwrap_err();

    assert!(matches!(err, ClientError::Server { status: 503, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_search_rate_limit_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.search_ids("q", 10).await.unwrap_err();

    assert!(matches!(err, ClientError::RateLimited { retry_after } if retry_after == Duration::from_secs(2)));
}

// =============================================================================
// Article Fetch
// =============================================================================

#[tokio::test]
async fn test_fetch_parses_article() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "41"))
        .and(query_param("retmode", "xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_xml("41", "Tirzepatide in obesity", "The Lancet")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client.fetch_article(&ArticleId::new("41")).await;

    let FetchOutcome::Fetched(record) = outcome else {
        panic!("expected a fetched article, got {outcome:?}");
    };
    assert_eq!(record.id.as_str(), "41");
    assert_eq!(record.display_title, "Tirzepatide in obesity");
    assert_eq!(record.journal, "the lancet");
    assert_eq!(record.date, "2025");
}

#[tokio::test]
async fn test_fetch_non_success_status_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client.fetch_article(&ArticleId::new("1")).await;

    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::Status(404)));
}

#[tokio::test]
async fn test_fetch_server_error_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client.fetch_article(&ArticleId::new("1")).await;

    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::Status(500)));
}

#[tokio::test]
async fn test_fetch_empty_body_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client.fetch_article(&ArticleId::new("1")).await;

    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::EmptyBody));
}

#[tokio::test]
async fn test_fetch_malformed_xml_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<PubmedArticleSet><PubmedArticle></Broken></PubmedArticleSet>"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client.fetch_article(&ArticleId::new("1")).await;

    assert!(
        matches!(outcome, FetchOutcome::Skipped(SkipReason::MalformedXml(_))),
        "got {outcome:?}"
    );
}

#[tokio::test]
async fn test_fetch_document_without_article_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<?xml version=\"1.0\"?><eFetchResult><ERROR>ID list is empty!</ERROR></eFetchResult>",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcome = client.fetch_article(&ArticleId::new("0")).await;

    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::NoArticle));
}

#[tokio::test]
async fn test_fetch_timeout_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_xml("1", "Slow", "Slow Journal"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.fetch_timeout = Duration::from_millis(200);
    let client = PubMedClient::new(config).unwrap();

    let outcome = client.fetch_article(&ArticleId::new("1")).await;

    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::Timeout(Duration::from_millis(200))));
}

#[tokio::test]
async fn test_request_timeout_is_a_timeout_skip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_xml("1", "Slow", "Slow Journal"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.request_timeout = Duration::from_millis(200);
    let client = PubMedClient::new(config).unwrap();

    let outcome = client.fetch_article(&ArticleId::new("1")).await;

    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::Timeout(Duration::from_millis(200))));
}

#[tokio::test]
async fn test_search_request_timeout_is_a_timeout_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"esearchresult": {"idlist": ["1"]}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.request_timeout = Duration::from_millis(200);
    let client = PubMedClient::new(config).unwrap();

    let err = client.search_ids("q", 10).await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout(after) if after == Duration::from_millis(200)));
}

// =============================================================================
// Full Run
// =============================================================================

#[tokio::test]
async fn test_run_drops_failing_article_and_ranks_the_rest() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"esearchresult": {"idlist": ["1", "2", "3"]}})),
        )
        .mount(&mock_server)
        .await;

    mount_article(&mock_server, "1", "Insulin pricing", "Health Affairs").await;
    mount_article(&mock_server, "3", "Machine learning for retinopathy", "Nature").await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let ranker = Ranker::new(Arc::new(client_for(&mock_server)), RunOptions::default());
    let search = SearchConfiguration::new("q", ScoringProfile::new(["Nature"], ["Stanford"]));

    let report = ranker.run(&search).await.unwrap();

    assert!(report.completed);
    assert_eq!(report.requested, 3);
    let ids: Vec<&str> = report.entries.iter().map(|e| e.article.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1"]);
    assert_eq!(report.entries[0].score(), 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id.as_str(), "2");
    assert_eq!(report.skipped[0].reason, SkipReason::Status(500));
}

#[tokio::test]
async fn test_run_with_unreachable_search_is_a_run_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let ranker = Ranker::new(Arc::new(client_for(&mock_server)), RunOptions::default());
    let result = ranker.run(&SearchConfiguration::new("q", ScoringProfile::default())).await;

    assert!(matches!(result, Err(RunError::Search(ClientError::Server { status: 502, .. }))));
}

#[tokio::test]
async fn test_run_with_malformed_search_is_empty_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let ranker = Ranker::new(Arc::new(client_for(&mock_server)), RunOptions::default());
    let report = ranker.run(&SearchConfiguration::new("q", ScoringProfile::default())).await.unwrap();

    assert!(report.is_empty());
    assert!(report.completed);
    assert_eq!(report.summary(), "Found 0 articles.");
}

#[tokio::test]
async fn test_rate_limit_wait_does_not_count_against_fetch_timeout() {
    let mock_server = MockServer::start().await;
    let ids: Vec<String> = (1..=10).map(|i| i.to_string()).collect();

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"esearchresult": {"idlist": ids}})),
        )
        .mount(&mock_server)
        .await;
    for id in &ids {
        mount_article(&mock_server, id, "Healthy article", "Diabetes Care").await;
    }

    // Ten fetches in flight against two requests per second: the last ones
    // queue on the limiter far longer than the fetch timeout.
    let mut config = Config::for_testing(&mock_server.uri()).with_max_concurrency(10);
    config.requests_per_second = NonZeroU32::new(2).unwrap();
    config.fetch_timeout = Duration::from_secs(2);
    let options = RunOptions::from_config(&config);
    let ranker = Ranker::new(Arc::new(PubMedClient::new(config).unwrap()), options);

    let report = ranker.run(&SearchConfiguration::new("q", ScoringProfile::default())).await.unwrap();

    assert!(report.completed);
    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    assert_eq!(report.len(), 10);
}
