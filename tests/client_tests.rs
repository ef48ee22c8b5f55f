use std::sync::Arc;
use std::time::Duration;

use mojira::Error;
use mojira::api::{Project, SearchClient};
use mojira::query::{QueryCache, QueryKey, build_query};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Serve canned responses in order, one per connection, and keep every
/// request body for inspection.
async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/api/jql-search-post", listener.local_addr().unwrap());
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&bodies);

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut socket).await;
            recorded
                .lock()
                .await
                .push(serde_json::from_slice(&request).unwrap_or(Value::Null));

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (endpoint, bodies)
}

/// Read one request and return its body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return Vec::new();
        }
        buffer.extend_from_slice(&chunk[..n]);

        let Some(end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buffer[..end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = end + 4;
        if buffer.len() >= body_start + length {
            return buffer[body_start..body_start + length].to_vec();
        }
    }
}

fn page(keys: &[&str], total: usize) -> String {
    let issues: Vec<Value> = keys
        .iter()
        .map(|key| json!({"key": key, "fields": {"summary": format!("Summary of {key}")}}))
        .collect();
    json!({"startAt": 0, "maxResults": 20, "total": total, "issues": issues}).to_string()
}

fn key(page_index: usize) -> QueryKey {
    QueryKey {
        project: Project::Mc,
        jql: build_query(Project::Mc, "labels = crash", &[], &[]),
        page_index,
        page_size: 20,
    }
}

#[tokio::test]
async fn test_search_posts_jql_window() {
    let (endpoint, bodies) = serve(vec![(200, page(&["MC-1", "MC-2"], 42))]).await;
    let client = SearchClient::with_endpoint(endpoint);

    let response = client.search(&key(2).request()).await.unwrap();
    assert_eq!(response.total, 42);
    assert_eq!(response.issues.len(), 2);
    assert_eq!(response.issues[1].summary(), "Summary of MC-2");

    let bodies = bodies.lock().await;
    let body = &bodies[0];
    assert_eq!(body["project"], "MC");
    assert_eq!(body["advanced"], true);
    assert_eq!(
        body["search"],
        "project = MC AND (labels = crash) ORDER BY created DESC"
    );
    assert_eq!(body["startAt"], 40);
    assert_eq!(body["maxResults"], 20);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (endpoint, _) = serve(vec![(500, "{\"errorMessages\":[\"boom\"]}".to_string())]).await;
    let client = SearchClient::with_endpoint(endpoint);

    let err = client.search(&key(0).request()).await.unwrap_err();
    match err {
        Error::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_issue_lookup() {
    let (endpoint, bodies) = serve(vec![(200, page(&["MCPE-7"], 1)), (200, page(&[], 0))]).await;
    let client = SearchClient::with_endpoint(endpoint);

    let issue = client.issue("MCPE-7").await.unwrap();
    assert_eq!(issue.key, "MCPE-7");
    assert_eq!(bodies.lock().await[0]["search"], "key = MCPE-7");

    let missing = client.issue("MC-99999999").await.unwrap_err();
    assert!(matches!(missing, Error::IssueNotFound(_)));

    assert!(matches!(
        client.issue("not a key").await.unwrap_err(),
        Error::InvalidKey(_)
    ));
}

#[tokio::test]
async fn test_cache_serves_repeat_requests_from_memory() {
    let (endpoint, bodies) = serve(vec![(200, page(&["MC-1"], 1))]).await;
    let cache = QueryCache::new(SearchClient::with_endpoint(endpoint));

    let first = cache.get(key(0)).await.unwrap();
    let second = cache.get(key(0)).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.issues[0].key, "MC-1");

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(bodies.lock().await.len(), 1);
}
