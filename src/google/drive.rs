//! Google Drive API v3

use super::{endpoint, GoogleClient};
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

const LIST_FIELDS: &str = "nextPageToken, files(id, name)";
const CHILD_FIELDS: &str = "nextPageToken, files(id, name, parents, webViewLink, mimeType)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// クエリ文字列中の値をエスケープ（`\` と `'`）
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Clone)]
pub struct DriveClient {
    client: GoogleClient,
    base_url: String,
    page_size: u32,
}

impl DriveClient {
    pub fn new(client: GoogleClient) -> Self {
        Self::with_base_url(client, DRIVE_API_BASE.to_string())
    }

    pub fn with_base_url(client: GoogleClient, base_url: String) -> Self {
        Self {
            client,
            base_url,
            page_size: 100,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }

    async fn list_page(
        &self,
        query: &str,
        fields: &str,
        page_token: Option<&str>,
    ) -> Result<FileList> {
        let mut url = endpoint(&self.base_url, &["files"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("fields", fields)
                .append_pair("pageSize", &self.page_size.to_string())
                .append_pair("orderBy", "name");
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        self.client.get_json(url).await
    }

    async fn list_all(&self, query: &str, fields: &str) -> Result<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_page(query, fields, page_token.as_deref()).await?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(files)
    }

    /// すべてのフォルダ
    pub async fn list_folders(&self) -> Result<Vec<DriveFile>> {
        let query = format!("mimeType = '{}' and trashed = false", FOLDER_MIME);
        self.list_all(&query, LIST_FIELDS).await
    }

    /// 名前が完全一致するフォルダ
    pub async fn find_folders_by_name(&self, name: &str) -> Result<Vec<DriveFile>> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_value(name),
            FOLDER_MIME
        );
        self.list_all(&query, LIST_FIELDS).await
    }

    /// フォルダ直下のファイル（サブフォルダ除く）を1ページ分取得
    pub async fn list_children_page(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<FileList> {
        let query = format!(
            "'{}' in parents and mimeType != '{}' and trashed = false",
            escape_query_value(folder_id),
            FOLDER_MIME
        );
        self.list_page(&query, CHILD_FIELDS, page_token).await
    }

    /// ファイル（フォルダ）名を取得
    pub async fn file_name(&self, file_id: &str) -> Result<String> {
        let mut url = endpoint(&self.base_url, &["files", file_id])?;
        url.query_pairs_mut().append_pair("fields", "name");

        #[derive(Deserialize)]
        struct NameOnly {
            #[serde(default)]
            name: String,
        }
        let file: NameOnly = self.client.get_json(url).await?;
        Ok(file.name)
    }

    /// すべてのスプレッドシート
    pub async fn list_spreadsheets(&self) -> Result<Vec<DriveFile>> {
        let query = format!("mimeType = '{}' and trashed = false", SPREADSHEET_MIME);
        self.list_all(&query, LIST_FIELDS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_query_value() {
        assert_eq!(escape_query_value("Invoices"), "Invoices");
        assert_eq!(escape_query_value("Bob's files"), "Bob\\'s files");
        assert_eq!(escape_query_value(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_drive_file_deserialize() {
        let json = r#"{"id": "f1", "name": "Invoice 1.pdf", "parents": ["p1"],
                       "webViewLink": "https://drive.google.com/file/d/f1/view"}"#;
        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.parents, vec!["p1".to_string()]);
        assert_eq!(
            file.web_view_link.as_deref(),
            Some("https://drive.google.com/file/d/f1/view")
        );
        assert!(file.mime_type.is_none());
    }

    #[test]
    fn test_file_list_without_token() {
        let list: FileList = serde_json::from_str(r#"{"files": []}"#).unwrap();
        assert!(list.files.is_empty());
        assert!(list.next_page_token.is_none());
    }
}
