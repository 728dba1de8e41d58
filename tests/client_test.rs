//! Endpoint request shapes and response classification against a mock
//! server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use livegrep::client::{ClientError, SearchClient};
use livegrep::types::FileKind;

#[tokio::test]
async fn test_search_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("path", "/repo"))
        .and(query_param("pattern", "TODO"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": ["src/main.c:10:// TODO fix"],
            "limited": false,
        })))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let response = client.search("/repo", "TODO", 50).await.unwrap();
    assert_eq!(response.results, vec!["src/main.c:10:// TODO fix"]);
    assert!(!response.limited);
}

#[tokio::test]
async fn test_full_search_sends_zero_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("limit", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
        })))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let response = client.search("/repo", "TODO", 0).await.unwrap();
    assert!(response.results.is_empty());
    // Absent limited field defaults to false.
    assert!(!response.limited);
}

#[tokio::test]
async fn test_search_pattern_is_url_encoded() {
    let server = MockServer::start().await;
    // The matcher compares decoded values, so a match here proves the
    // client encoded the raw pattern correctly.
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("pattern", "a + b & c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
        })))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    assert!(client.search("/repo", "a + b & c", 50).await.is_ok());
}

#[tokio::test]
async fn test_server_error_body_message_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "pattern is required"})),
        )
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let err = client.search("/repo", "", 50).await.unwrap_err();
    match err {
        ClientError::Server(message) => assert_eq!(message, "pattern is required"),
        other => panic!("expected Server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bare_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let err = client.search("/repo", "TODO", 50).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error: 500");
}

#[tokio::test]
async fn test_missing_results_field_is_invalid_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 3})))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let err = client.search("/repo", "TODO", 50).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid response format from server");
}

#[tokio::test]
async fn test_non_string_results_are_invalid_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [1, 2]})))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    assert!(matches!(
        client.search("/repo", "TODO", 50).await.unwrap_err(),
        ClientError::InvalidFormat
    ));
}

#[tokio::test]
async fn test_file_content_request_and_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file-content"))
        .and(query_param("file_path", "src/main.c"))
        .and(query_param("line_number", "42"))
        .and(query_param("context_lines", "20"))
        .and(query_param("base_path", "/repo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_type": "c",
            "context": [
                {"line_number": 41, "content": "int a;", "is_match": false},
                {"line_number": 42, "content": "int b;", "is_match": true},
            ],
        })))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let context = client.file_content("src/main.c", 42, "/repo").await.unwrap();
    assert_eq!(context.kind(), FileKind::C);
    assert_eq!(context.context.len(), 2);
    assert_eq!(context.match_index(), Some(1));
}

#[tokio::test]
async fn test_call_hierarchy_request_and_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/call-hierarchy"))
        .and(query_param("function_name", "parse_line"))
        .and(query_param("base_path", "/repo"))
        .and(query_param("max_depth", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "function_name": "parse_line",
            "total_callers": 1,
            "callers": [{
                "caller_function": "main",
                "file_path": "src/main.c",
                "line_number": 12,
                "is_recursive": false,
                "callers": [],
            }],
        })))
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let hierarchy = client.call_hierarchy("parse_line", "/repo").await.unwrap();
    assert_eq!(hierarchy.function_name, "parse_line");
    assert_eq!(hierarchy.total_callers, 1);
    assert_eq!(hierarchy.callers[0].caller_function, "main");
    assert_eq!(hierarchy.total_nodes(), 2);
}

#[tokio::test]
async fn test_hierarchy_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/call-hierarchy"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "function not found"})),
        )
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri());
    let err = client.call_hierarchy("ghost", "/repo").await.unwrap_err();
    assert_eq!(err.to_string(), "function not found");
}
