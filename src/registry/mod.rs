mod github;
#[cfg(test)]
pub mod mock;

pub use github::{DEFAULT_RELEASE_URL, GitHubReleases, parse_release};
#[cfg(test)]
pub use mock::MockReleaseSource;

use anyhow::Result;
use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Incorrect and possibly insecure protocol in url: {0}")]
    InsecureUrl(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A named file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
}

/// The subset of a GitHub release payload the checks need
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.name.as_str())
    }
}

/// Outcome of a request that reached the server, whatever the status
#[derive(Debug, Clone)]
pub struct Response {
    pub body: String,
    pub headers: HeaderMap,
    pub status: u16,
    pub error_count: u32,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON, `None` when it isn't valid JSON
    pub fn decode_json(&self) -> Option<serde_json::Value> {
        match serde_json::from_str(&self.body) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Response body is not JSON: {}", e);
                None
            }
        }
    }
}

/// Options for [`request`]. The defaults describe a plain JSON `GET`.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub data: Vec<(String, String)>,
    pub data_as_json: bool,
    pub error_count: u32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            params: Vec::new(),
            headers: Vec::new(),
            data: Vec::new(),
            data_as_json: true,
            error_count: 0,
        }
    }
}

impl RequestOptions {
    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn data(mut self, key: &str, value: &str) -> Self {
        self.data.push((key.to_string(), value.to_string()));
        self
    }

    pub fn form(mut self) -> Self {
        self.data_as_json = false;
        self
    }

    pub fn error_count(mut self, error_count: u32) -> Self {
        self.error_count = error_count;
        self
    }
}

/// Check that a URL uses an HTTP-family scheme before touching the network
pub fn ensure_http_url(url: &str) -> Result<(), FetchError> {
    if url.to_lowercase().starts_with("http") {
        Ok(())
    } else {
        Err(FetchError::InsecureUrl(url.to_string()))
    }
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn build_headers(options: &RequestOptions) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::InvalidRequest(format!("header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidRequest(format!("header value for '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Issue a single HTTP request.
///
/// HTTP error statuses are returned as a [`Response`] whose body is the
/// reason phrase and whose `error_count` is one more than the caller's.
/// Only transport failures and rejected URLs are errors. No retries.
pub async fn request(
    client: &Client,
    url: &str,
    options: RequestOptions,
) -> Result<Response, FetchError> {
    ensure_http_url(url)?;

    let method = Method::from_bytes(options.method.to_uppercase().as_bytes())
        .map_err(|e| FetchError::InvalidRequest(format!("method '{}': {}", options.method, e)))?;
    let mut headers = build_headers(&options)?;

    let mut params = options.params.clone();
    let mut data = options.data.clone();
    if method == Method::GET {
        params.append(&mut data);
    }

    let mut full_url = url.to_string();
    if !params.is_empty() {
        full_url.push('?');
        full_url.push_str(&encode_pairs(&params));
    }

    let mut body = None;
    if !data.is_empty() {
        if options.data_as_json {
            let object: serde_json::Map<String, serde_json::Value> = data
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();
            body = Some(serde_json::Value::Object(object).to_string());
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=UTF-8"),
            );
        } else {
            body = Some(encode_pairs(&data));
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
    }

    debug!("{} {}", method, full_url);

    let mut builder = client.request(method, &full_url).headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }

    let response = builder.send().await?;
    let status = response.status();
    let headers = response.headers().clone();

    if status.is_success() {
        // text() honours the charset in Content-Type, UTF-8 otherwise
        let body = response.text().await?;
        return Ok(Response {
            body,
            headers,
            status: status.as_u16(),
            error_count: options.error_count,
        });
    }

    debug!("HTTP {} from {}", status, full_url);
    Ok(Response {
        body: reason_phrase(&response),
        headers,
        status: status.as_u16(),
        error_count: options.error_count + 1,
    })
}

/// Reason phrase the server sent, or the canonical one for the status
fn reason_phrase(response: &reqwest::Response) -> String {
    if let Some(reason) = response.extensions().get::<ReasonPhrase>() {
        return String::from_utf8_lossy(reason.as_bytes()).into_owned();
    }
    response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// Create a descriptive error message for a failed release lookup
pub fn http_error_message(status: u16, url: &str) -> String {
    match status {
        401 => format!(
            "Release lookup at {} requires authentication (HTTP 401). Check your API token.",
            url
        ),
        403 => format!(
            "Access denied for {} (HTTP 403). The GitHub API rate limit may have been reached.",
            url
        ),
        404 => format!(
            "No release found at {} (HTTP 404). Check the repository name in the URL.",
            url
        ),
        429 => format!(
            "Rate limited while fetching {} (HTTP 429). Wait a moment and try again.",
            url
        ),
        500..=599 => format!(
            "Server error from {} (HTTP {}). The release host may be experiencing issues.",
            url, status
        ),
        _ => format!("Failed to fetch {}: HTTP {}", url, status),
    }
}

/// Where the latest upstream release comes from
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self) -> Result<Release>;

    /// Source description for logs
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_request_rejects_non_http_url() {
        let client = Client::new();
        let err = request(&client, "ftp://x", RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InsecureUrl(ref u) if u == "ftp://x"));
    }

    #[test]
    fn test_ensure_http_url_is_case_insensitive() {
        assert!(ensure_http_url("HTTPS://api.github.com").is_ok());
        assert!(ensure_http_url("http://localhost").is_ok());
        assert!(ensure_http_url("file:///etc/passwd").is_err());
        assert!(ensure_http_url("").is_err());
    }

    #[tokio::test]
    async fn test_request_sends_accept_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/release"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/release", mock_server.uri());
        let response = request(&client, &url, RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.error_count, 0);
        assert!(response.is_success());
        assert_eq!(response.decode_json().unwrap()["ok"], true);
    }

    #[tokio::test]
    async fn test_request_error_status_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\": \"x\"}"))
            .expect(1) // no retry
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/missing", mock_server.uri());
        let response = request(&client, &url, RequestOptions::default().error_count(2))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "Not Found");
        assert_eq!(response.error_count, 3);
        assert!(!response.is_success());
        assert!(response.decode_json().is_none());
    }

    #[tokio::test]
    async fn test_request_server_error_captured() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/boom", mock_server.uri());
        let response = request(&client, &url, RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert_eq!(response.body, "Internal Server Error");
        assert_eq!(response.error_count, 1);
    }

    #[tokio::test]
    async fn test_request_not_modified_counts_as_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cached"))
            .respond_with(ResponseTemplate::new(304))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/cached", mock_server.uri());
        let response = request(&client, &url, RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(response.status, 304);
        assert_eq!(response.body, "Not Modified");
        assert_eq!(response.error_count, 1);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_request_decodes_advertised_charset() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latin1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![0xE9], "application/json; charset=iso-8859-1"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/latin1", mock_server.uri());
        let response = request(&client, &url, RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(response.body, "é");
    }

    #[tokio::test]
    async fn test_request_keeps_server_reason_phrase() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 404 Release Gone Fishing\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                )
                .await
                .unwrap();
        });

        let client = Client::new();
        let url = format!("http://{}/latest", addr);
        let response = request(&client, &url, RequestOptions::default())
            .await
            .unwrap();
        server.await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "Release Gone Fishing");
        assert_eq!(response.error_count, 1);
    }

    #[tokio::test]
    async fn test_get_merges_data_into_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("per_page", "1"))
            .and(query_param("q", "winpython"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/search", mock_server.uri());
        let options = RequestOptions::default()
            .param("per_page", "1")
            .data("q", "winpython");
        let response = request(&client, &url, options).await.unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("Content-Type", "application/json; charset=UTF-8"))
            .and(body_string(r#"{"tag":"6.1.0"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/hook", mock_server.uri());
        let options = RequestOptions::default().method("post").data("tag", "6.1.0");
        let response = request(&client, &url, options).await.unwrap();

        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/form"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string("name=Winpython64+3.9"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/form", mock_server.uri());
        let options = RequestOptions::default()
            .method("POST")
            .data("name", "Winpython64 3.9")
            .form();
        let response = request(&client, &url, options).await.unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_custom_headers_are_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Client::new();
        let url = format!("{}/auth", mock_server.uri());
        let options = RequestOptions::default().header("Authorization", "Bearer abc");
        let response = request(&client, &url, options).await.unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_invalid_header_name_rejected() {
        let client = Client::new();
        let options = RequestOptions::default().header("bad header", "x");
        let err = request(&client, "http://localhost:1", options)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }

    #[test]
    fn test_decode_json_returns_none_for_garbage() {
        let response = Response {
            body: "not json".to_string(),
            headers: HeaderMap::new(),
            status: 200,
            error_count: 0,
        };
        assert!(response.decode_json().is_none());
    }

    #[test]
    fn test_release_deserializes_ignoring_extra_fields() {
        let json = r#"{
            "tag_name": "6.1.20230527final",
            "name": "WinPython 6.1",
            "assets": [
                {"name": "Winpython64-3.11.3.0dot.exe", "size": 12},
                {"name": "Winpython32-3.11.3.0dot.exe"}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "6.1.20230527final");
        assert_eq!(
            release.asset_names().collect::<Vec<_>>(),
            vec!["Winpython64-3.11.3.0dot.exe", "Winpython32-3.11.3.0dot.exe"]
        );
    }

    #[test]
    fn test_http_error_message() {
        assert!(http_error_message(404, "http://x").contains("HTTP 404"));
        assert!(http_error_message(403, "http://x").contains("rate limit"));
        assert!(http_error_message(503, "http://x").contains("HTTP 503"));
        assert!(http_error_message(418, "http://x").contains("HTTP 418"));
    }
}
