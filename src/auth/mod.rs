//! Google API 認証

mod installed;
mod service_account;
mod token;

pub use installed::{
    build_auth_url, parse_callback, pkce_challenge, AuthUrlCallback, ClientSecrets,
    InstalledAppAuth,
};
pub use service_account::ServiceAccountAuth;
pub use token::{StoredToken, TokenResponse, DEFAULT_TOKEN_URI};

use crate::config::Config;
use crate::error::Result;

/// 要求するスコープ（Driveは読み取りのみ、Sheetsは読み書き）
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/spreadsheets",
];

pub enum Authenticator {
    Installed(InstalledAppAuth),
    ServiceAccount(ServiceAccountAuth),
    /// 外部で取得済みのアクセストークン（`DRIVE_LINKER_ACCESS_TOKEN`）
    Static(String),
}

impl Authenticator {
    /// 設定から認証方式を決める
    ///
    /// 優先順: アクセストークン → サービスアカウントキー → OAuth
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(token) = &config.access_token {
            tracing::debug!("using access token from environment");
            return Ok(Self::Static(token.clone()));
        }
        if let Some(key_path) = &config.service_account_key {
            tracing::debug!("using service account key {}", key_path.display());
            return Ok(Self::ServiceAccount(ServiceAccountAuth::from_file(key_path)?));
        }
        Ok(Self::Installed(InstalledAppAuth::new(
            config.credentials_path()?,
            config.token_path()?,
        )))
    }

    /// OAuth 同意URLの通知先を設定（OAuth以外では何もしない）
    pub fn with_auth_url_callback(self, callback: AuthUrlCallback) -> Self {
        match self {
            Authenticator::Installed(auth) => {
                Authenticator::Installed(auth.with_auth_url_callback(callback))
            }
            other => other,
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        match self {
            Authenticator::Installed(auth) => auth.access_token().await,
            Authenticator::ServiceAccount(auth) => auth.access_token().await,
            Authenticator::Static(token) => Ok(token.clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Authenticator::Installed(auth) => format!("OAuth ({})", auth.token_path().display()),
            Authenticator::ServiceAccount(auth) => format!("サービスアカウント ({})", auth.client_email()),
            Authenticator::Static(_) => "固定トークン".to_string(),
        }
    }
}
