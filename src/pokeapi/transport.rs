//! Network access for the data client
//!
//! The client only ever asks for "the JSON document at this URL". Keeping
//! that behind a trait lets tests count and script upstream requests.

use super::error::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Fetches a JSON document by fully-qualified URL
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).get_json(url).await
    }
}

/// Production transport backed by `reqwest`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("pokedex-chat/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        classify_status(resp.status())?;

        resp.json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// 404 is the only status the rest of the system distinguishes.
fn classify_status(status: StatusCode) -> Result<(), FetchError> {
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound);
    }
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_not_found() {
        assert_eq!(classify_status(StatusCode::NOT_FOUND), Err(FetchError::NotFound));
    }

    #[test]
    fn classify_other_failures() {
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(FetchError::Status(500))
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(FetchError::Status(429))
        );
    }

    #[test]
    fn classify_success() {
        assert_eq!(classify_status(StatusCode::OK), Ok(()));
    }

    #[test]
    fn transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
