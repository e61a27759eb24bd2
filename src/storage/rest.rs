use crate::{
    error::{BoardError, BoardResult},
    storage::KeyValueStore,
};
use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

const REST_API_TIMEOUT_SEC: u64 = 5;

enum Endpoint<'a> {
    Get(&'a str),
    Set(&'a str, u64),
}

impl Endpoint<'_> {
    // Keys are pushed as single path segments, so '/', '?' and '#' are escaped.
    fn apply(&self, url: &mut Url) -> BoardResult<()> {
        let (command, key) = match self {
            Endpoint::Get(key) => ("get", *key),
            Endpoint::Set(key, _) => ("set", *key),
        };
        url.path_segments_mut()
            .map_err(|_| BoardError::Configuration("Key-value REST URL is not a base URL".into()))?
            .pop_if_empty()
            .extend([command, key]);
        if let Endpoint::Set(_, seconds) = self {
            url.query_pairs_mut().append_pair("EX", &seconds.to_string());
        }
        Ok(())
    }
}

// Every answer of the REST API is wrapped into either a result or an error.
#[derive(Debug, Deserialize)]
struct RestResponse {
    result: Option<String>,
    error: Option<String>,
}

/// Redis-compatible store reached through its REST API (Upstash, Vercel KV).
pub struct RestStore {
    http_client: Client,
    base_url: Url,
    token: String,
}

impl RestStore {
    pub fn new(base_url: &str, token: &str) -> BoardResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REST_API_TIMEOUT_SEC))
            .build()?;
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                BoardError::Configuration(format!("Invalid key-value REST URL: '{base_url}'"))
            })?;
        Ok(Self {
            http_client,
            base_url,
            token: token.to_string(),
        })
    }

    fn url(&self, endpoint: &Endpoint) -> BoardResult<Url> {
        let mut url = self.base_url.clone();
        endpoint.apply(&mut url)?;
        Ok(url)
    }

    async fn parse(response: reqwest::Response) -> BoardResult<Option<String>> {
        let status = response.status();
        let body: RestResponse = response
            .json()
            .await
            .map_err(|e| BoardError::Storage(format!("{status}. {e}")))?;

        match (status, body.error) {
            (_, Some(error)) => Err(BoardError::Storage(error)),
            (StatusCode::OK, None) => Ok(body.result),
            (status, None) => Err(BoardError::Storage(format!("{}", status))),
        }
    }
}

impl KeyValueStore for RestStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, BoardResult<Option<Bytes>>> {
        Box::pin(async move {
            let response = self
                .http_client
                .get(self.url(&Endpoint::Get(key))?)
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| BoardError::Storage(e.to_string()))?;
            let value = RestStore::parse(response).await?;
            Ok(value.map(Bytes::from))
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Bytes,
        expire_after: Duration,
    ) -> BoxFuture<'a, BoardResult<()>> {
        Box::pin(async move {
            let endpoint = Endpoint::Set(key, expire_after.as_secs().max(1));
            let response = self
                .http_client
                .post(self.url(&endpoint)?)
                .bearer_auth(&self.token)
                .body(value)
                .send()
                .await
                .map_err(|e| BoardError::Storage(e.to_string()))?;
            RestStore::parse(response).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(store: &RestStore, endpoint: Endpoint) -> String {
        store.url(&endpoint).unwrap().to_string()
    }

    #[test]
    fn endpoints_follow_the_rest_api_layout() {
        let store = RestStore::new("https://kv.example.io/", "token").unwrap();
        assert_eq!(
            url(&store, Endpoint::Get("leaderboard_data")),
            "https://kv.example.io/get/leaderboard_data"
        );
        assert_eq!(
            url(&store, Endpoint::Set("leaderboard_data", 1800)),
            "https://kv.example.io/set/leaderboard_data?EX=1800"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let store = RestStore::new("https://kv.example.io/v1", "token").unwrap();
        assert_eq!(
            url(&store, Endpoint::Get("board")),
            "https://kv.example.io/v1/get/board"
        );
    }

    #[test]
    fn keys_are_escaped_as_one_path_segment() {
        let store = RestStore::new("https://kv.example.io", "token").unwrap();
        assert_eq!(
            url(&store, Endpoint::Get("board/2024?x#y")),
            "https://kv.example.io/get/board%2F2024%3Fx%23y"
        );
        assert_eq!(
            url(&store, Endpoint::Set("a b", 60)),
            "https://kv.example.io/set/a%20b?EX=60"
        );
    }

    #[test]
    fn unusable_base_url_is_a_configuration_error() {
        for base in ["kv.example.io", "mailto:kv@example.io"] {
            let err = RestStore::new(base, "token").err().unwrap();
            assert!(matches!(err, BoardError::Configuration(_)));
        }
    }
}
