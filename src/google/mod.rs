//! Google Drive / Sheets REST クライアント

pub mod drive;
pub mod sheets;

pub use drive::{DriveClient, DriveFile, FileList, DRIVE_API_BASE};
pub use sheets::{SheetsClient, TabInfo, SHEETS_API_BASE};

use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::{LinkerError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// 認証付きHTTPクライアント（Drive/Sheetsで共有）
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    auth: Arc<Authenticator>,
}

impl GoogleClient {
    pub fn new(auth: Arc<Authenticator>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, auth })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let token = self.auth.access_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        Self::parse_response(response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("PUT {}", url);
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LinkerError::ApiCall(format!(
                "{} {}",
                status.as_u16(),
                api_error_message(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| LinkerError::ApiParse(e.to_string()))
    }
}

/// Drive と Sheets のクライアント一式
#[derive(Clone)]
pub struct GoogleApis {
    pub drive: DriveClient,
    pub sheets: SheetsClient,
}

impl GoogleApis {
    pub fn new(auth: Authenticator, config: &Config) -> Result<Self> {
        let client = GoogleClient::new(Arc::new(auth), config.timeout())?;
        Ok(Self {
            drive: DriveClient::new(client.clone()).with_page_size(config.page_size),
            sheets: SheetsClient::new(client),
        })
    }
}

/// ベースURLにパスセグメントを連結（セグメントはエンコードされる）
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| LinkerError::Config(format!("APIのURLが不正です: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| LinkerError::Config(format!("APIのURLが不正です: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Googleのエラー応答 `{"error": {"message": ...}}` からメッセージを取り出す
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error").and_then(|e| match e {
                serde_json::Value::String(s) => Some(s.clone()),
                other => other
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from),
            })
        })
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}
