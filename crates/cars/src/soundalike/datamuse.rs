use super::provider::{ScoredWord, SoundsLikeProvider};
use anyhow::{Context, Result};
use std::time::Duration;

/// Datamuse `sl=` (sounds like) client
pub struct DatamuseClient {
    base_url: String,
    client: reqwest::Client,
}

impl DatamuseClient {
    /// Create a new client rooted at `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch(&self, word: &str) -> Result<Vec<ScoredWord>> {
        let url = format!("{}/words", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("sl", word)])
            .send()
            .await
            .context("Failed to send Datamuse request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Datamuse API error {}: {}", status, text));
        }

        // Datamuse answers `null` instead of `[]` on some inputs
        let words: Option<Vec<ScoredWord>> = response
            .json()
            .await
            .context("Failed to parse Datamuse response")?;

        Ok(words.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl SoundsLikeProvider for DatamuseClient {
    async fn sounds_like(&self, word: &str) -> Vec<ScoredWord> {
        match self.fetch(word).await {
            Ok(words) => {
                tracing::debug!("Datamuse returned {} words for '{}'", words.len(), word);
                words
            },
            Err(e) => {
                tracing::warn!("Sounds-like lookup for '{}' failed: {:#}", word, e);
                Vec::new()
            },
        }
    }

    fn name(&self) -> &str {
        "datamuse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use std::collections::HashMap;

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> DatamuseClient {
        DatamuseClient::new(base_url, Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn creation_trims_trailing_slash() {
        let client = client("https://api.datamuse.com/");
        assert_eq!(client.base_url, "https://api.datamuse.com");
    }

    #[tokio::test]
    async fn returns_words_in_response_order() {
        let router = Router::new().route(
            "/words",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let input = params.get("sl").cloned().unwrap_or_default();
                Json(serde_json::json!([
                    {"word": input, "score": 100, "numSyllables": 2},
                    {"word": "fokus", "score": 95, "numSyllables": 2},
                    {"word": "ficus", "score": 80}
                ]))
            }),
        );
        let base_url = spawn_server(router).await;

        let words = client(&base_url).sounds_like("focus").await;

        assert_eq!(
            words,
            vec![
                ScoredWord::new("focus", 100, 2),
                ScoredWord::new("fokus", 95, 2),
                ScoredWord::new("ficus", 80, 0),
            ]
        );
    }

    #[tokio::test]
    async fn null_body_is_empty() {
        let router = Router::new().route(
            "/words",
            get(|| async { Json(serde_json::Value::Null) }),
        );
        let base_url = spawn_server(router).await;

        assert!(client(&base_url).sounds_like("giraffe").await.is_empty());
    }

    #[tokio::test]
    async fn client_error_is_empty() {
        let router = Router::new().route("/words", get(|| async { StatusCode::BAD_REQUEST }));
        let base_url = spawn_server(router).await;

        assert!(client(&base_url).sounds_like("ball").await.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_empty() {
        let router = Router::new().route(
            "/words",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = spawn_server(router).await;

        assert!(client(&base_url).sounds_like("ball").await.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_empty() {
        let router = Router::new().route("/words", get(|| async { "not json" }));
        let base_url = spawn_server(router).await;

        assert!(client(&base_url).sounds_like("ball").await.is_empty());
    }

    #[tokio::test]
    async fn slow_server_times_out_to_empty() {
        let router = Router::new().route(
            "/words",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(serde_json::json!([{"word": "late", "score": 1, "numSyllables": 1}]))
            }),
        );
        let base_url = spawn_server(router).await;

        assert!(client(&base_url).sounds_like("ball").await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_is_empty() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let words = client(&format!("http://{}", addr)).sounds_like("ball").await;
        assert!(words.is_empty());
    }
}
