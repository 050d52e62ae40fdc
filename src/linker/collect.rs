//! 選択フォルダ内のファイル収集

use crate::error::Result;
use crate::google::{DriveClient, DriveFile};
use drive_linker_common::FileEntry;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// 次ページ取得までの待ち時間
    pub page_delay: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(2),
        }
    }
}

/// フォルダごとの収集結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderReport {
    pub folder_name: String,
    pub file_count: usize,
    pub error: Option<String>,
}

/// 親フォルダ名のキャッシュ
struct ParentNames<'a> {
    drive: &'a DriveClient,
    names: HashMap<String, String>,
}

impl<'a> ParentNames<'a> {
    fn new(drive: &'a DriveClient, folders: &[DriveFile]) -> Self {
        let names = folders
            .iter()
            .map(|f| (f.id.clone(), f.name.clone()))
            .collect();
        Self { drive, names }
    }

    async fn resolve(&mut self, file: &DriveFile) -> String {
        let Some(parent_id) = file.parents.first() else {
            return String::new();
        };
        if let Some(name) = self.names.get(parent_id) {
            return name.clone();
        }
        match self.drive.file_name(parent_id).await {
            Ok(name) => {
                self.names.insert(parent_id.clone(), name.clone());
                name
            }
            Err(e) => {
                // 失敗はキャッシュせず次のファイルで再取得
                tracing::warn!("親フォルダ名を取得できません ({}): {}", parent_id, e);
                String::new()
            }
        }
    }
}

/// 選択フォルダのファイルを順に列挙し、見つけるたびに `on_entry` を呼ぶ
///
/// フォルダ単位の失敗はそのフォルダの `FolderReport::error` に記録して次へ進む。
pub async fn collect_files<F>(
    drive: &DriveClient,
    folders: &[DriveFile],
    options: &CollectOptions,
    mut on_entry: F,
) -> Result<Vec<FolderReport>>
where
    F: FnMut(FileEntry),
{
    let mut parents = ParentNames::new(drive, folders);
    let mut reports = Vec::with_capacity(folders.len());

    for folder in folders {
        let mut report = FolderReport {
            folder_name: folder.name.clone(),
            ..Default::default()
        };
        let mut page_token: Option<String> = None;

        loop {
            let page = match drive.list_children_page(&folder.id, page_token.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("{} の取得に失敗: {}", folder.name, e);
                    report.error = Some(e.to_string());
                    break;
                }
            };

            for file in &page.files {
                let folder_name = parents.resolve(file).await;
                on_entry(FileEntry {
                    file_name: file.name.clone(),
                    folder_name,
                    url: file.web_view_link.clone().unwrap_or_default(),
                });
                report.file_count += 1;
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    page_token = Some(token);
                    if !options.page_delay.is_zero() {
                        tokio::time::sleep(options.page_delay).await;
                    }
                }
                _ => break,
            }
        }

        tracing::info!("{} : {}", report.folder_name, report.file_count);
        reports.push(report);
    }

    Ok(reports)
}
