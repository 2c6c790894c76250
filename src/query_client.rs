use eyre::{Result, eyre};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const BACKEND_URL_ENV: &str = "INSECTOPEDIA_BACKEND_URL";
const QUERY_PATH: &str = "api/query";

/// Ways a backend query can fail. The chat session treats them all alike.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to reach query backend: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("query backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("query backend response has no usable answer: {0}")]
    MalformedBody(String),
}

/// Something that can answer a question.
#[async_trait::async_trait]
pub trait QueryBackend {
    async fn query(&self, question: &str) -> Result<String, QueryError>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct BackendFailure {
    error: String,
}

/// Picks the backend base URL: flag first, then environment, then the default.
pub fn resolve_backend_url(flag: Option<String>, env: Option<String>) -> String {
    flag.or(env)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

pub struct QueryClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl QueryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| eyre!("invalid backend URL '{}': {}", base_url, e))?;
        if base.cannot_be_a_base() {
            return Err(eyre!("invalid backend URL '{}': not a base URL", base_url));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(QUERY_PATH)
            .map_err(|e| eyre!("invalid backend URL '{}': {}", base_url, e))?;

        Ok(Self {
            endpoint,
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl QueryBackend for QueryClient {
    async fn query(&self, question: &str) -> Result<String, QueryError> {
        debug!("Sending question to {}: {:?}", self.endpoint, question);

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("question", question)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            match serde_json::from_str::<BackendFailure>(&body) {
                Ok(failure) => {
                    error!("Query backend failed with {}: {}", status, failure.error)
                }
                Err(_) => error!("Query backend failed with {}: {}", status, body),
            }
            return Err(QueryError::Status { status, body });
        }

        debug!("Received response from query backend: {}", body);

        let parsed: QueryResponse =
            serde_json::from_str(&body).map_err(|e| QueryError::MalformedBody(e.to_string()))?;

        Ok(parsed.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Form;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    #[derive(Deserialize)]
    struct Question {
        question: String,
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn backend_url_prefers_flag_then_env() {
        assert_eq!(
            resolve_backend_url(Some("http://flag:1".into()), Some("http://env:2".into())),
            "http://flag:1"
        );
        assert_eq!(resolve_backend_url(None, Some("http://env:2".into())), "http://env:2");
        assert_eq!(resolve_backend_url(None, None), DEFAULT_BACKEND_URL);
        assert_eq!(resolve_backend_url(None, Some("  ".into())), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn endpoint_is_joined_onto_base() {
        let client = QueryClient::new("http://127.0.0.1:8000").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:8000/api/query");

        let client = QueryClient::new("http://example.com/insects").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://example.com/insects/api/query");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(QueryClient::new("not a url").is_err());
        assert!(QueryClient::new("mailto:bugs@example.com").is_err());
    }

    #[tokio::test]
    async fn posts_form_and_reads_answer() {
        let router = Router::new().route(
            "/api/query",
            post(|Form(q): Form<Question>| async move {
                Json(json!({ "answer": format!("You asked: {}", q.question) }))
            }),
        );
        let client = QueryClient::new(&serve(router).await).unwrap();

        let answer = client.query("How many legs?").await.unwrap();
        assert_eq!(answer, "You asked: How many legs?");
    }

    #[tokio::test]
    async fn server_error_is_status_failure() {
        let router = Router::new().route(
            "/api/query",
            post(|| async {
                (
                    AxumStatus::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "index missing" })),
                )
            }),
        );
        let client = QueryClient::new(&serve(router).await).unwrap();

        let err = client.query("Why?").await.unwrap_err();
        match err {
            QueryError::Status { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("index missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn body_without_answer_is_malformed() {
        let router = Router::new().route(
            "/api/query",
            post(|| async { Json::<Value>(json!({ "reply": "wrong field" })) }),
        );
        let client = QueryClient::new(&serve(router).await).unwrap();

        let err = client.query("Why?").await.unwrap_err();
        assert!(matches!(err, QueryError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn non_string_answer_is_malformed() {
        let router = Router::new().route(
            "/api/query",
            post(|| async { Json::<Value>(json!({ "answer": 42 })) }),
        );
        let client = QueryClient::new(&serve(router).await).unwrap();

        let err = client.query("Why?").await.unwrap_err();
        assert!(matches!(err, QueryError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = QueryClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.query("Anyone there?").await.unwrap_err();
        assert!(matches!(err, QueryError::Transport(_)));
    }
}
