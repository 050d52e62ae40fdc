use crate::error::{LinkerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuthクライアント情報（credentials.json）
    pub credentials_path: Option<PathBuf>,
    /// 保存済みトークン（token.json）
    pub token_path: Option<PathBuf>,
    /// サービスアカウントキー（設定時はOAuthより優先）
    pub service_account_key: Option<PathBuf>,
    /// ファイル名から番号を抽出する正規表現
    pub index_pattern: Option<String>,
    pub page_size: u32,
    /// Driveのページ取得間隔
    pub page_delay_ms: u64,
    pub timeout_seconds: u64,
    /// 外部で取得済みのアクセストークン（環境変数のみ、保存しない）
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_path: None,
            token_path: None,
            service_account_key: None,
            index_pattern: None,
            page_size: 100,
            page_delay_ms: 2000,
            timeout_seconds: 60,
            access_token: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env();
        Ok(config)
    }

    /// 指定パスから読み込み（存在しなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LinkerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("drive-linker"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 環境変数で上書き
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("DRIVE_LINKER_CREDENTIALS") {
            self.credentials_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("DRIVE_LINKER_TOKEN") {
            self.token_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("GOOGLE_SERVICE_ACCOUNT_KEY") {
            self.service_account_key = Some(PathBuf::from(path));
        }
        if let Ok(token) = std::env::var("DRIVE_LINKER_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                self.access_token = Some(token.trim().to_string());
            }
        }
    }

    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("credentials.json")),
        }
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.token_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("token.json")),
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub fn set_credentials_path(&mut self, path: PathBuf) -> Result<()> {
        self.credentials_path = Some(path);
        self.save()
    }

    pub fn set_token_path(&mut self, path: PathBuf) -> Result<()> {
        self.token_path = Some(path);
        self.save()
    }

    pub fn set_index_pattern(&mut self, pattern: String) -> Result<()> {
        // 保存前に検証
        drive_linker_common::IndexExtractor::new(&pattern)?;
        self.index_pattern = Some(pattern);
        self.save()
    }
}
