//! Runtime support for the generated clients: a small async REST client
//! plus the request/verb types the synthesized code constructs.
//!
//! Every generated endpoint builds a [`RestRequest`] and hands it to
//! [`RestClient::execute`], which joins the path onto the base URI,
//! issues the request and decodes the JSON body into the caller's type.

use serde::de::DeserializeOwned;
use tracing::debug;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One endpoint invocation: a path relative to the client's base URI and
/// the verb to issue it with.
#[derive(Debug, Clone)]
pub struct RestRequest {
    path: String,
    method: Method,
}

impl RestRequest {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Async REST client bound to one base URI.
pub struct RestClient {
    http: reqwest::Client,
    base_uri: String,
}

impl RestClient {
    pub fn new(base_uri: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_uri: base_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Issue the request and decode the JSON response body. An empty body
    /// decodes as JSON `null`, so unit-typed calls work against 204-style
    /// answers.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &RestRequest,
    ) -> Result<T, ClientError> {
        let url = self.url_for(request);
        debug!("{} {}", request.method().as_str(), url);

        let builder = match request.method() {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let decoded = if body.is_empty() {
            serde_json::from_slice(b"null")
        } else {
            serde_json::from_slice(&body)
        };
        decoded.map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn url_for(&self, request: &RestRequest) -> String {
        format!(
            "{}/{}",
            self.base_uri,
            request.path().trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_follow_http() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Put.as_str(), "PUT");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn request_keeps_path_and_method() {
        let request = RestRequest::new("api/items/{id}", Method::Put);
        assert_eq!(request.path(), "api/items/{id}");
        assert_eq!(request.method(), Method::Put);
    }

    #[test]
    fn base_uri_drops_trailing_slashes() {
        let client = RestClient::new("http://localhost:8080/");
        assert_eq!(client.base_uri(), "http://localhost:8080");
    }

    #[test]
    fn urls_join_with_exactly_one_slash() {
        let client = RestClient::new("http://localhost:8080/");
        let with_slash = RestRequest::new("/api/items", Method::Get);
        let without = RestRequest::new("api/items", Method::Get);
        assert_eq!(
            client.url_for(&with_slash),
            "http://localhost:8080/api/items"
        );
        assert_eq!(client.url_for(&without), "http://localhost:8080/api/items");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = RestClient::new("http://127.0.0.1:1");
        let request = RestRequest::new("api/ping", Method::Get);
        let err = client.execute::<()>(&request).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
