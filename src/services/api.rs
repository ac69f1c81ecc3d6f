use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::models::{Submission, SubmissionUpdate, Viewer};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed: HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_page: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// One page of the paginated abstract listing, in the backend's
/// `{ data, meta, links }` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionPage {
    #[serde(default)]
    pub data: Vec<Submission>,
    #[serde(default)]
    pub meta: PageMeta,
    #[serde(default)]
    pub links: PageLinks,
}

/// The conference backend. A trait so the views can be driven by a fake in
/// tests; the one real implementation is [`HttpApi`].
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// Full poster listing. The viewer id, when present, lets the backend
    /// mark which entries the caller owns.
    async fn all_submissions(&self, viewer: Option<&Viewer>) -> Result<Vec<Submission>, ApiError>;

    /// One page of the abstract listing. `next` is a link taken from a
    /// previous page's envelope; `None` fetches the first page for `query`.
    async fn submission_page(
        &self,
        next: Option<&str>,
        query: &str,
    ) -> Result<SubmissionPage, ApiError>;

    async fn submission_detail(&self, id: &str) -> Result<Submission, ApiError>;

    /// Owner-only update of a poster's resource links and active slots.
    async fn update_submission(&self, update: &SubmissionUpdate) -> Result<(), ApiError>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn listing_url(&self, viewer: Option<&Viewer>) -> Result<String, ApiError> {
        let mut url = Url::parse(&self.endpoint("/api/get_all_poster_submissions"))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if let Some(viewer) = viewer {
            url.query_pairs_mut().append_pair("id", &viewer.uid);
        }
        Ok(url.to_string())
    }

    fn page_url(&self, next: Option<&str>, query: &str) -> Result<String, ApiError> {
        match next {
            // the envelope may carry either an absolute link or a path
            Some(link) if link.starts_with("http") => Ok(link.to_string()),
            Some(link) => Ok(self.endpoint(link)),
            None => {
                let mut url = Url::parse(&self.endpoint("/api/abstract"))
                    .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
                url.query_pairs_mut()
                    .append_pair("page", "1")
                    .append_pair("q", query);
                Ok(url.to_string())
            }
        }
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SubmissionApi for HttpApi {
    async fn all_submissions(&self, viewer: Option<&Viewer>) -> Result<Vec<Submission>, ApiError> {
        self.get_json(&self.listing_url(viewer)?).await
    }

    async fn submission_page(
        &self,
        next: Option<&str>,
        query: &str,
    ) -> Result<SubmissionPage, ApiError> {
        self.get_json(&self.page_url(next, query)?).await
    }

    async fn submission_detail(&self, id: &str) -> Result<Submission, ApiError> {
        self.get_json(&self.endpoint(&format!("/api/abstract/{id}"))).await
    }

    async fn update_submission(&self, update: &SubmissionUpdate) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/set_poster_submission_data"))
            .json(update)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_scopes_to_viewer() {
        let api = HttpApi::new("https://backend.example/");
        assert_eq!(
            api.listing_url(None).unwrap(),
            "https://backend.example/api/get_all_poster_submissions"
        );

        let viewer = Viewer {
            uid: "user 1".to_string(),
        };
        assert_eq!(
            api.listing_url(Some(&viewer)).unwrap(),
            "https://backend.example/api/get_all_poster_submissions?id=user+1"
        );
    }

    #[test]
    fn test_page_url_first_page_and_next_link() {
        let api = HttpApi::new("https://backend.example");
        assert_eq!(
            api.page_url(None, "neural").unwrap(),
            "https://backend.example/api/abstract?page=1&q=neural"
        );
        assert_eq!(
            api.page_url(Some("/api/abstract?page=2&q=neural"), "neural").unwrap(),
            "https://backend.example/api/abstract?page=2&q=neural"
        );
        assert_eq!(
            api.page_url(Some("https://other.example/api/abstract?page=3"), "").unwrap(),
            "https://other.example/api/abstract?page=3"
        );
    }

    #[test]
    fn test_page_envelope_deserializes() {
        let body = r#"{
            "data": [{"submission_id": "s1", "title": "Neural coding"}],
            "meta": {"current_page": 1, "total_page": 4},
            "links": {"next": "/api/abstract?page=2"}
        }"#;
        let page: SubmissionPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "s1");
        assert_eq!(page.meta.current_page, 1);
        assert_eq!(page.meta.total_page, 4);
        assert_eq!(page.links.next.as_deref(), Some("/api/abstract?page=2"));
    }

    #[test]
    fn test_empty_envelope_defaults() {
        let page: SubmissionPage = serde_json::from_str("{}").unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total_page, 0);
        assert!(page.links.next.is_none());
    }
}
