use chrono::Utc;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::model::{HotRankRequest, HotRankResponse, RankedItem};
use crate::retry::retry;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16, body: String },

    #[error("response is not valid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("API returned error code {}", display_code(.code))]
    Api { code: Option<i64>, body: String },

    #[error("response has no data.hotRankList list")]
    MissingList { body: String },
}

impl FetchError {
    /// Raw response body attached to the error, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            FetchError::Transport(_) => None,
            FetchError::Status { body, .. }
            | FetchError::InvalidJson { body, .. }
            | FetchError::Api { body, .. }
            | FetchError::MissingList { body } => Some(body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn display_code(code: &Option<i64>) -> String {
    code.map_or_else(|| "<missing>".to_string(), |c| c.to_string())
}

/// Interpret one HTTP response from the hot-rank endpoint.
pub fn parse_hot_rank(status: StatusCode, body: &str) -> Result<Vec<RankedItem>, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let response: HotRankResponse =
        serde_json::from_str(body).map_err(|source| FetchError::InvalidJson {
            source,
            body: body.to_string(),
        })?;

    if response.code != Some(0) {
        return Err(FetchError::Api {
            code: response.code,
            body: body.to_string(),
        });
    }

    response
        .data
        .and_then(|data| data.hot_rank_list)
        .ok_or_else(|| FetchError::MissingList {
            body: body.to_string(),
        })
}

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch the ranking, retrying transient failures per the configured policy.
    pub async fn fetch_hot_rank(&self) -> Result<Vec<RankedItem>, FetchError> {
        info!("Fetching hot rank from {}", self.config.endpoint);

        let items = retry(&self.config.retry, |attempt| {
            debug!(attempt, "Requesting hot rank");
            self.fetch_once()
        })
        .await?;

        info!("Received {} ranked items", items.len());
        Ok(items)
    }

    /// One POST against the endpoint, no retry.
    pub async fn fetch_once(&self) -> Result<Vec<RankedItem>, FetchError> {
        let request = HotRankRequest::new(Utc::now().timestamp());

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        parse_hot_rank(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_hot_rank_tests {
        use super::*;

        #[test]
        fn test_parse_valid_response() {
            let body = r#"{"code":0,"data":{"hotRankList":[{"itemId":123,"templateMaterial":{"widgetTitle":"T","authorName":"A","publishTime":1700000000000,"statRead":10}}]}}"#;

            let items = parse_hot_rank(StatusCode::OK, body).unwrap();

            assert_eq!(items.len(), 1);
            assert_eq!(items[0].item_id, "123");
            assert_eq!(items[0].title(), "T");
            assert_eq!(items[0].publish_time_ms(), Some(1_700_000_000_000));
        }

        #[test]
        fn test_parse_empty_list() {
            let body = r#"{"code":0,"data":{"hotRankList":[]}}"#;
            let items = parse_hot_rank(StatusCode::OK, body).unwrap();
            assert!(items.is_empty());
        }

        #[test]
        fn test_non_success_status() {
            let err = parse_hot_rank(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();

            assert!(matches!(err, FetchError::Status { status: 502, .. }));
            assert_eq!(err.status(), Some(502));
            assert_eq!(err.payload(), Some("upstream down"));
        }

        #[test]
        fn test_redirect_status_is_failure() {
            let err = parse_hot_rank(StatusCode::MOVED_PERMANENTLY, "").unwrap_err();
            assert!(matches!(err, FetchError::Status { status: 301, .. }));
        }

        #[test]
        fn test_invalid_json() {
            let err = parse_hot_rank(StatusCode::OK, "<html>nope</html>").unwrap_err();

            assert!(matches!(err, FetchError::InvalidJson { .. }));
            assert_eq!(err.payload(), Some("<html>nope</html>"));
        }

        #[test]
        fn test_non_zero_code() {
            let body = r#"{"code":40001,"msg":"bad partner"}"#;
            let err = parse_hot_rank(StatusCode::OK, body).unwrap_err();

            assert!(matches!(err, FetchError::Api { code: Some(40001), .. }));
            assert_eq!(err.to_string(), "API returned error code 40001");
            assert_eq!(err.payload(), Some(body));
        }

        #[test]
        fn test_missing_code() {
            let body = r#"{"data":{"hotRankList":[]}}"#;
            let err = parse_hot_rank(StatusCode::OK, body).unwrap_err();

            assert!(matches!(err, FetchError::Api { code: None, .. }));
            assert_eq!(err.to_string(), "API returned error code <missing>");
        }

        #[test]
        fn test_missing_list() {
            let body = r#"{"code":0,"data":{}}"#;
            let err = parse_hot_rank(StatusCode::OK, body).unwrap_err();
            assert!(matches!(err, FetchError::MissingList { .. }));
        }

        #[test]
        fn test_missing_data() {
            let err = parse_hot_rank(StatusCode::OK, r#"{"code":0}"#).unwrap_err();
            assert!(matches!(err, FetchError::MissingList { .. }));
        }

        #[test]
        fn test_list_of_wrong_type() {
            let body = r#"{"code":0,"data":{"hotRankList":"soon"}}"#;
            let err = parse_hot_rank(StatusCode::OK, body).unwrap_err();
            assert!(matches!(err, FetchError::MissingList { .. }));
        }
    }

    #[test]
    fn test_fetcher_keeps_config() {
        let config = FetchConfig {
            endpoint: "http://127.0.0.1:9/hot".to_string(),
            ..FetchConfig::default()
        };

        let fetcher = Fetcher::new(config).unwrap();
        assert_eq!(fetcher.config().endpoint, "http://127.0.0.1:9/hot");
    }
}
