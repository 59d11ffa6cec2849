//! HTTP-backed object store client.
//!
//! Talks to the remote store's JSON API with bearer authentication.
//! Client construction mirrors the rest of the crate's outbound HTTP:
//! explicit timeouts, a bounded redirect policy and a fixed user agent.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::config::StoreConfig;
use crate::{MediaTreeError, Result};

use super::{ListPage, Metadata, ObjectStore, ResourceKind};

/// User agent string for store requests.
const USER_AGENT: &str = "mediatree/0.1";

/// Object store client over HTTP.
pub struct HttpObjectStore {
    client: Client,
    base_url: Url,
    token: String,
}

#[derive(Serialize)]
struct RenameRequest<'a> {
    from: &'a str,
    to: &'a str,
    kind: ResourceKind,
}

#[derive(Serialize)]
struct DeleteKeysRequest<'a> {
    keys: &'a [String],
    kind: ResourceKind,
}

#[derive(Serialize)]
struct DeletePrefixRequest<'a> {
    prefix: &'a str,
    kind: ResourceKind,
}

#[derive(Serialize)]
struct SetMetadataRequest<'a> {
    key: &'a str,
    kind: ResourceKind,
    metadata: &'a BTreeMap<String, String>,
}

#[derive(serde::Deserialize)]
struct ExistsResponse {
    exists: bool,
}

impl HttpObjectStore {
    /// Create a new client from the store configuration.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MediaTreeError::Store(format!("failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| MediaTreeError::Store(format!("invalid store base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, segment: &str) -> Result<Url> {
        self.base_url
            .join(segment)
            .map_err(|e| MediaTreeError::Store(format!("invalid endpoint {segment}: {e}")))
    }

    /// Map a non-success status to the error taxonomy.
    fn status_error(status: StatusCode, key: &str) -> MediaTreeError {
        match status {
            StatusCode::NOT_FOUND => MediaTreeError::ObjectNotFound(key.to_string()),
            StatusCode::CONFLICT => MediaTreeError::RenameCollision(key.to_string()),
            _ => MediaTreeError::Store(format!("HTTP error: {status}")),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn list(
        &self,
        prefix: &str,
        kind: ResourceKind,
        cursor: Option<&str>,
    ) -> Result<ListPage> {
        let mut url = self.endpoint("v1/objects")?;
        url.query_pairs_mut()
            .append_pair("prefix", prefix)
            .append_pair("kind", kind.as_str());
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| MediaTreeError::Store(format!("list failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), prefix));
        }

        response
            .json::<ListPage>()
            .await
            .map_err(|e| MediaTreeError::Store(format!("invalid list response: {e}")))
    }

    async fn rename(&self, from: &str, to: &str, kind: ResourceKind) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("v1/objects/rename")?)
            .bearer_auth(&self.token)
            .json(&RenameRequest { from, to, kind })
            .send()
            .await
            .map_err(|e| MediaTreeError::Store(format!("rename failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), from));
        }
        Ok(())
    }

    async fn delete_keys(&self, keys: &[String], kind: ResourceKind) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("v1/objects/delete")?)
            .bearer_auth(&self.token)
            .json(&DeleteKeysRequest { keys, kind })
            .send()
            .await
            .map_err(|e| MediaTreeError::Store(format!("delete failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MediaTreeError::Store(format!(
                "HTTP error: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str, kind: ResourceKind) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("v1/objects/delete-prefix")?)
            .bearer_auth(&self.token)
            .json(&DeletePrefixRequest { prefix, kind })
            .send()
            .await
            .map_err(|e| MediaTreeError::Store(format!("delete-prefix failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MediaTreeError::Store(format!(
                "HTTP error: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn get_metadata(&self, key: &str, kind: ResourceKind) -> Result<Metadata> {
        let mut url = self.endpoint("v1/objects/metadata")?;
        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("kind", kind.as_str());

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| MediaTreeError::Store(format!("get-metadata failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), key));
        }

        response
            .json::<Metadata>()
            .await
            .map_err(|e| MediaTreeError::Store(format!("invalid metadata response: {e}")))
    }

    async fn set_metadata(&self, key: &str, kind: ResourceKind, metadata: &Metadata) -> Result<()> {
        let response = self
            .client
            .put(self.endpoint("v1/objects/metadata")?)
            .bearer_auth(&self.token)
            .json(&SetMetadataRequest {
                key,
                kind,
                metadata,
            })
            .send()
            .await
            .map_err(|e| MediaTreeError::Store(format!("set-metadata failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), key));
        }
        Ok(())
    }

    async fn exists(&self, key: &str, kind: ResourceKind) -> Result<bool> {
        let mut url = self.endpoint("v1/objects/exists")?;
        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("kind", kind.as_str());

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| MediaTreeError::Store(format!("exists failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(MediaTreeError::Store(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .json::<ExistsResponse>()
            .await
            .map_err(|e| MediaTreeError::Store(format!("invalid exists response: {e}")))?;
        Ok(body.exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StoreConfig {
        StoreConfig {
            base_url: base_url.to_string(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_new_with_valid_url() {
        let store = HttpObjectStore::new(&config("https://store.example.com/"));
        assert!(store.is_ok());
    }

    #[test]
    fn test_new_with_invalid_url() {
        let result = HttpObjectStore::new(&config("not a url"));
        assert!(matches!(result, Err(MediaTreeError::Store(_))));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            HttpObjectStore::status_error(StatusCode::NOT_FOUND, "k"),
            MediaTreeError::ObjectNotFound(_)
        ));
        assert!(matches!(
            HttpObjectStore::status_error(StatusCode::CONFLICT, "k"),
            MediaTreeError::RenameCollision(_)
        ));
        assert!(matches!(
            HttpObjectStore::status_error(StatusCode::INTERNAL_SERVER_ERROR, "k"),
            MediaTreeError::Store(_)
        ));
    }
}
