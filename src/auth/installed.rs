//! OAuth2 インストールアプリ認証
//!
//! 1. token.json があり有効ならそのまま使う
//! 2. 期限切れでリフレッシュトークンがあれば更新
//! 3. どちらもなければブラウザ同意フロー（ループバック + PKCE）
//!
//! 更新・同意のたびに token.json を保存する。

use super::token::{request_token, StoredToken, DEFAULT_TOKEN_URI};
use super::SCOPES;
use crate::error::{LinkerError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

/// 同意フローの待ち時間上限
const CONSENT_TIMEOUT: Duration = Duration::from_secs(300);

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// 認証URLの通知先
pub type AuthUrlCallback = Box<dyn Fn(&str) + Send + Sync>;

/// credentials.json の内容
#[derive(Debug, Clone, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecrets {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| LinkerError::Auth(format!("credentials.jsonの形式が不正です: {}", e)))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| LinkerError::Auth("credentials.jsonに installed/web セクションがありません".into()))
    }
}

pub struct InstalledAppAuth {
    client: reqwest::Client,
    credentials_path: PathBuf,
    token_path: PathBuf,
    cached: Mutex<Option<StoredToken>>,
    on_auth_url: Option<AuthUrlCallback>,
}

impl InstalledAppAuth {
    pub fn new(credentials_path: PathBuf, token_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials_path,
            token_path,
            cached: Mutex::new(None),
            on_auth_url: None,
        }
    }

    /// 認証URLを受け取るコールバックを設定（未設定なら標準出力に表示）
    pub fn with_auth_url_callback(mut self, callback: AuthUrlCallback) -> Self {
        self.on_auth_url = Some(callback);
        self
    }

    pub fn token_path(&self) -> &std::path::Path {
        &self.token_path
    }

    /// 有効なアクセストークンを取得
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if cached.is_none() {
            *cached = StoredToken::load(&self.token_path)?;
        }

        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                if let Some(access) = &token.token {
                    return Ok(access.clone());
                }
            }
        }

        let refreshed = match cached.take() {
            Some(token) if token.can_refresh() => match self.refresh(token).await {
                Ok(token) => token,
                Err(e) => {
                    tracing::warn!("トークン更新に失敗、再認証します: {}", e);
                    self.consent().await?
                }
            },
            _ => self.consent().await?,
        };

        refreshed.save(&self.token_path)?;
        tracing::debug!("token saved to {}", self.token_path.display());

        let access = refreshed
            .token
            .clone()
            .ok_or_else(|| LinkerError::Auth("アクセストークンが空です".into()))?;
        *cached = Some(refreshed);
        Ok(access)
    }

    async fn refresh(&self, mut token: StoredToken) -> Result<StoredToken> {
        tracing::info!("アクセストークンを更新中...");
        let refresh_token = token.refresh_token.clone().unwrap_or_default();
        let response = request_token(
            &self.client,
            &token.token_uri,
            &[
                ("client_id", token.client_id.as_str()),
                ("client_secret", token.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;
        token.apply_response(response, Utc::now());
        Ok(token)
    }

    async fn consent(&self) -> Result<StoredToken> {
        if !self.credentials_path.exists() {
            return Err(LinkerError::MissingCredentials(
                self.credentials_path.display().to_string(),
            ));
        }
        let content = std::fs::read_to_string(&self.credentials_path)?;
        let secrets = ClientSecrets::from_json(&content)?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://127.0.0.1:{}/", port);

        let (verifier, state) = generate_verifier_and_state();
        let challenge = pkce_challenge(&verifier);
        let auth_url = build_auth_url(&secrets, &redirect_uri, &challenge, &state)?;

        present_auth_url(auth_url.as_str(), self.on_auth_url.as_ref(), |url| open::that(url));
        tracing::info!("waiting for OAuth redirect on {}", redirect_uri);

        let code = tokio::time::timeout(CONSENT_TIMEOUT, wait_for_code(&listener, &state))
            .await
            .map_err(|_| LinkerError::Auth("認証の待ち時間が上限を超えました".into()))??;

        let response = request_token(
            &self.client,
            &secrets.token_uri,
            &[
                ("code", code.as_str()),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("code_verifier", verifier.as_str()),
            ],
        )
        .await?;

        let mut token = StoredToken {
            token: None,
            refresh_token: None,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            expiry: None,
        };
        token.apply_response(response, Utc::now());
        Ok(token)
    }
}

/// PKCE verifier と state を生成
/// 同意URLをブラウザで開き、通知先（なければ標準出力）へも渡す
///
/// ブラウザを開けた場合は `true`。
fn present_auth_url<F>(url: &str, callback: Option<&AuthUrlCallback>, open_browser: F) -> bool
where
    F: FnOnce(&str) -> std::io::Result<()>,
{
    let opened = match open_browser(url) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("ブラウザを開けません: {}", e);
            false
        }
    };
    match callback {
        Some(callback) => callback(url),
        None if opened => {
            println!("🔑 ブラウザで認証してください（開かない場合は次のURL）:\n\n  {}\n", url);
        }
        None => {
            println!("🔑 ブラウザで次のURLを開いて認証してください:\n\n  {}\n", url);
        }
    }
    opened
}

fn generate_verifier_and_state() -> (String, String) {
    let mut rng = rand::thread_rng();
    let mut verifier = [0u8; 32];
    rng.fill_bytes(&mut verifier);
    let mut state = [0u8; 16];
    rng.fill_bytes(&mut state);
    (URL_SAFE_NO_PAD.encode(verifier), hex::encode(state))
}

/// S256 コードチャレンジ
pub fn pkce_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

pub fn build_auth_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    challenge: &str,
    state: &str,
) -> Result<Url> {
    let mut url = Url::parse(&secrets.auth_uri)
        .map_err(|e| LinkerError::Auth(format!("auth_uriが不正です: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &SCOPES.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("code_challenge", challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("state", state);
    Ok(url)
}

/// リダイレクトのリクエストパスから認可コードを取り出す
///
/// `code` を含まないリクエスト（favicon等）は `Ok(None)`。
pub fn parse_callback(path: &str, expected_state: &str) -> Result<Option<String>> {
    let url = Url::parse(&format!("http://127.0.0.1{}", path))
        .map_err(|e| LinkerError::Auth(format!("リダイレクトURLが不正です: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(LinkerError::Auth(format!("認証が拒否されました: {}", value)));
            }
            _ => {}
        }
    }

    let Some(code) = code else {
        return Ok(None);
    };
    if state.as_deref() != Some(expected_state) {
        return Err(LinkerError::Auth("stateが一致しません".into()));
    }
    Ok(Some(code))
}

async fn wait_for_code(listener: &TcpListener, expected_state: &str) -> Result<String> {
    loop {
        let (mut stream, _) = listener.accept().await?;

        let mut buf = vec![0u8; 8192];
        let mut len = 0;
        while len < buf.len() {
            let n = stream.read(&mut buf[len..]).await?;
            if n == 0 {
                break;
            }
            len += n;
            if buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let request = String::from_utf8_lossy(&buf[..len]);
        let path = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("/")
            .to_string();

        let result = parse_callback(&path, expected_state);
        let (status, body) = match &result {
            Ok(Some(_)) => ("200 OK", "認証が完了しました。このウィンドウを閉じてください。"),
            Ok(None) => ("404 Not Found", ""),
            Err(_) => ("400 Bad Request", "認証に失敗しました。"),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.ok();
        stream.shutdown().await.ok();

        match result {
            Ok(Some(code)) => return Ok(code),
            Ok(None) => continue,
            Err(e) => return Err(e),
        }
    }
}
