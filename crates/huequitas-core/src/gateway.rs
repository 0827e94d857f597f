use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::credentials::CredentialStore;
use crate::error::{HueError, Result};

/// Longest body excerpt kept in a decode error.
const BODY_PREVIEW_LEN: usize = 300;

/// The single HTTP client every remote call goes through.
///
/// Fixes the base address and JSON content type, and attaches
/// `Authorization: Bearer <token>` whenever the credential store holds one.
/// No retry and no timeout: a failure surfaces to the caller as-is.
pub struct Gateway {
    base_url: String,
    base: Url,
    http: Client,
    credentials: Arc<dyn CredentialStore>,
}

impl Gateway {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| HueError::Config(format!("invalid API base URL '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(HueError::Config(format!(
                "invalid API base URL '{base_url}': not a hierarchical URL"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            base_url,
            base,
            http,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Each entry of `path` is one URL path segment, escaped on the way out.
    pub async fn get<R: DeserializeOwned>(&self, path: &[&str]) -> Result<R> {
        self.execute(Method::GET, path, &[], None::<&()>).await
    }

    /// GET with URL-encoded query parameters.
    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<R> {
        self.execute(Method::GET, path, query, None::<&()>).await
    }

    pub async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &T,
    ) -> Result<R> {
        self.execute(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &T,
    ) -> Result<R> {
        self.execute(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &[&str]) -> Result<R> {
        self.execute(Method::DELETE, path, &[], None::<&()>).await
    }

    /// Logs any failure once, then hands it back unchanged.
    async fn execute<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&T>,
    ) -> Result<R> {
        let endpoint = format!("{method} /{}", path.join("/"));
        let result = self.execute_once(method, path, query, body, &endpoint).await;
        if let Err(ref e) = result {
            tracing::error!(endpoint = %endpoint, error = %e, "request failed");
        }
        result
    }

    async fn execute_once<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&T>,
        endpoint: &str,
    ) -> Result<R> {
        let url = self.url(path, query)?;
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.body(serde_json::to_vec(body)?);
        }
        let req = self.authorize(req)?;

        tracing::debug!(endpoint = %endpoint, "sending request");
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(HueError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        decode_body(endpoint, &text)
    }

    /// Pre-send hook: bearer token when present, nothing otherwise.
    fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.credentials.token()?.filter(|t| !t.trim().is_empty());
        Ok(match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    fn url(&self, path: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| HueError::Config(format!("cannot extend base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }
        Ok(url)
    }
}

/// Pull the server's explanation out of an error body.
///
/// Looks for a `message` or `error` string field; a plain-text body is used
/// as-is. Empty bodies and HTML pages yield `None`.
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        Err(_) if trimmed.starts_with('<') => None,
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Parse a success body, turning schema mismatches into [`HueError::Decode`].
pub fn decode_body<R: DeserializeOwned>(endpoint: &str, body: &str) -> Result<R> {
    // `DELETE` and friends may answer 204 with nothing; treat that as `null`.
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| {
        let preview = if body.len() > BODY_PREVIEW_LEN {
            let mut end = BODY_PREVIEW_LEN;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            &body[..end]
        } else {
            body
        };
        HueError::Decode {
            endpoint: endpoint.to_string(),
            reason: format!("{e}\nBody: {preview}"),
        }
    })
}
