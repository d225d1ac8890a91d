//! Fetching profile data from the remote API.
//!
//! The remote API is a black box returning JSON or HTTP error codes. Both
//! endpoints use 404 and 400 interchangeably for "does not exist"; those map
//! to [`FetchError::NotFound`] and stay silent, while every other non-success
//! status is an unexpected failure.

use reqwest::{Client, StatusCode, header};
use url::Url;

use crate::caching::FetchError;
use crate::config::{Config, DownloadTimeouts};
use crate::types::{ProfileDetail, ProfileSummary, UserId};

/// The user agent the service identifies itself with.
const USER_AGENT: &str = concat!("zoo-profiles/", env!("CARGO_PKG_VERSION"));

/// Creates the [`Client`] shared by all requests against the profile API.
fn create_client(timeouts: &DownloadTimeouts) -> Client {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .build()
        .expect("client configuration is static")
}

/// Fetches profile lists and profile details from the remote API.
#[derive(Debug)]
pub struct ProfileDownloader {
    client: Client,
    base_url: Url,
}

impl ProfileDownloader {
    pub fn new(config: &Config) -> Self {
        Self {
            client: create_client(&config.timeouts),
            base_url: config.base_url.clone(),
        }
    }

    /// Resolves which profiles exist for a user.
    ///
    /// `GET <base>/api/profiles/{user_id}`, returning the parsed summary
    /// list. A response body that is not a JSON array of summaries is
    /// [`FetchError::Malformed`].
    pub async fn list_profiles(&self, user_id: &UserId) -> Result<Vec<ProfileSummary>, FetchError> {
        let url = self.api_url("profiles", user_id.as_str())?;
        let value = self.get_json(url).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetches the full contents of a single profile.
    ///
    /// `GET <base>/api/profile/{profile_id}`. A response carrying the API's
    /// `invalid` flag is [`FetchError::Invalid`]; a body that is not a JSON
    /// object of the expected shape is [`FetchError::Malformed`].
    pub async fn fetch_detail(&self, profile_id: &str) -> Result<ProfileDetail, FetchError> {
        let url = self.api_url("profile", profile_id)?;
        let value = self.get_json(url).await?;

        if !value.is_object() {
            return Err(FetchError::Malformed("expected a JSON object".into()));
        }
        if let Some(true) = value.get("invalid").and_then(serde_json::Value::as_bool) {
            return Err(FetchError::Invalid);
        }

        Ok(serde_json::from_value(value)?)
    }

    fn api_url(&self, endpoint: &str, id: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Download("base URL cannot have segments".into()))?
            .pop_if_empty()
            .extend(["api", endpoint, id]);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<serde_json::Value, FetchError> {
        tracing::debug!("Fetching `{url}`");

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Converts a non-success response status to a [`FetchError`].
fn status_error(status: StatusCode) -> FetchError {
    if matches!(status, StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
        FetchError::NotFound
    } else {
        FetchError::Download(status.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use zoo_profiles_test as test;

    fn downloader(server: &test::ZooServer) -> ProfileDownloader {
        let config = Config {
            base_url: server.base_url(),
            ..Default::default()
        };
        ProfileDownloader::new(&config)
    }

    #[::core::prelude::v1::test]
    fn test_status_error() {
        assert_eq!(status_error(StatusCode::NOT_FOUND), FetchError::NotFound);
        assert_eq!(status_error(StatusCode::BAD_REQUEST), FetchError::NotFound);
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR),
            FetchError::Download(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN),
            FetchError::Download(_)
        ));
    }

    #[tokio::test]
    async fn test_list_profiles() {
        test::setup();

        let server = test::ZooServer::new();
        server.serve_profiles(
            "user-1",
            json!([
                { "id": "a", "name": "Main", "current": true, "viewable": true, "score": 10 },
                { "id": "b", "name": "Alt", "current": false, "viewable": false, "score": 2 },
            ]),
        );

        let summaries = downloader(&server)
            .list_profiles(&UserId::new("user-1"))
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "a");
        assert!(summaries[0].current);
        assert_eq!(summaries[1].viewable, Some(false));
    }

    #[tokio::test]
    async fn test_list_profiles_missing() {
        test::setup();

        let server = test::ZooServer::new();

        let result = downloader(&server)
            .list_profiles(&UserId::new("i-do-not-exist"))
            .await;

        assert_eq!(result, Err(FetchError::NotFound));
    }

    #[tokio::test]
    async fn test_list_profiles_not_a_list() {
        test::setup();

        let server = test::ZooServer::new();
        server.serve_profiles("user-1", json!({ "oops": true }));

        let result = downloader(&server)
            .list_profiles(&UserId::new("user-1"))
            .await;

        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_list_profiles_garbage_body() {
        test::setup();

        let server = test::ZooServer::new();
        server.serve_profiles_body("user-1", "<html>not json</html>");

        let result = downloader(&server)
            .list_profiles(&UserId::new("user-1"))
            .await;

        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_fetch_detail() {
        test::setup();

        let server = test::ZooServer::new();
        server.serve_profile(
            "prof-1",
            json!({
                "id": "prof-1",
                "userID": "user-1",
                "name": "Main",
                "score": 1234,
                "completion": 56.5,
            }),
        );

        let detail = downloader(&server).fetch_detail("prof-1").await.unwrap();
        assert_eq!(detail.user_id, "user-1");
        assert_eq!(detail.score, 1234);
    }

    #[tokio::test]
    async fn test_fetch_detail_invalid() {
        test::setup();

        let server = test::ZooServer::new();
        server.serve_profile(
            "prof-1",
            json!({ "name": "Error", "msg": "profile is broken", "invalid": true }),
        );

        let result = downloader(&server).fetch_detail("prof-1").await;
        assert_eq!(result, Err(FetchError::Invalid));
    }

    #[tokio::test]
    async fn test_fetch_detail_unexpected_status() {
        test::setup();

        let server = test::ZooServer::new();
        server.serve_profile_status("prof-1", StatusCode::INTERNAL_SERVER_ERROR);

        let result = downloader(&server).fetch_detail("prof-1").await;
        assert!(matches!(result, Err(FetchError::Download(_))));
    }

    #[tokio::test]
    async fn test_fetch_detail_transport_error() {
        test::setup();

        let server = test::reset_server().await;
        let config = Config {
            base_url: server.url(""),
            ..Default::default()
        };

        let result = ProfileDownloader::new(&config).fetch_detail("prof-1").await;
        assert!(matches!(result, Err(FetchError::Download(_))));
    }
}
