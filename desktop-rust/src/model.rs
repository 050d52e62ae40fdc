use drive_linker::google::{DriveFile, TabInfo};
use drive_linker::linker::{FolderReport, LinkSession, SheetSelection};
use drive_linker_common::ColumnInfo;

/// 開いているモーダル
#[derive(Debug, Clone, Default)]
pub enum Dialog {
    #[default]
    None,
    Folders {
        items: Vec<DriveFile>,
        checked: Vec<bool>,
    },
    Sheets {
        items: Vec<DriveFile>,
        selected: Option<usize>,
    },
    Tabs {
        sheet: DriveFile,
        tabs: Vec<TabInfo>,
        selected: Option<usize>,
    },
    IndexColumn {
        selection: SheetSelection,
        columns: Vec<ColumnInfo>,
        selected: Option<usize>,
    },
    TargetColumn {
        input: String,
        error: Option<String>,
    },
}

impl Dialog {
    pub fn folders(items: Vec<DriveFile>) -> Self {
        let checked = vec![false; items.len()];
        Dialog::Folders { items, checked }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::None)
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub session: LinkSession,
    pub selected_row: Option<usize>,
    pub dialog: Dialog,
    /// 同意待ちの認証URL
    pub auth_url: Option<String>,
    /// 選択フォルダごとの収集結果
    pub folder_reports: Vec<FolderReport>,
}

impl AppState {
    /// 表と選択をクリア
    pub fn clear(&mut self) {
        self.session.reset();
        self.selected_row = None;
        self.folder_reports.clear();
    }

    pub fn record_reports(&mut self, reports: Vec<FolderReport>) {
        self.folder_reports.extend(reports);
    }

    /// フォルダ別件数
    ///
    /// 収集済みのフォルダは選択単位で、収集中は表の親フォルダ名で数える。
    pub fn folder_summary(&self) -> Vec<(String, usize)> {
        if self.folder_reports.is_empty() {
            return self.session.table.folder_counts().into_iter().collect();
        }
        self.folder_reports
            .iter()
            .map(|r| (r.folder_name.clone(), r.file_count))
            .collect()
    }

    /// 照合対象のシートを表すラベル
    pub fn sheet_label(&self) -> String {
        match (&self.session.sheet, &self.session.index_column) {
            (Some(sheet), Some(column)) => {
                format!("{} / {} / {}", sheet.spreadsheet_name, sheet.tab, column)
            }
            (Some(sheet), None) => format!("{} / {}", sheet.spreadsheet_name, sheet.tab),
            _ => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_linker_common::{FileEntry, IndexExtractor};

    fn entry(name: &str, folder: &str) -> FileEntry {
        FileEntry {
            file_name: name.to_string(),
            folder_name: folder.to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn test_folder_summary_keeps_same_named_folders_apart() {
        let mut state = AppState::default();
        let extractor = IndexExtractor::default();
        for name in ["Scan 1.pdf", "Scan 2.pdf", "Scan 3.pdf"] {
            state.session.table.push_file(entry(name, "2024"), &extractor);
        }
        assert_eq!(state.folder_summary(), vec![("2024".to_string(), 3)]);

        state.record_reports(vec![
            FolderReport { folder_name: "2024".into(), file_count: 2, error: None },
            FolderReport { folder_name: "2024".into(), file_count: 1, error: None },
        ]);
        assert_eq!(
            state.folder_summary(),
            vec![("2024".to_string(), 2), ("2024".to_string(), 1)]
        );

        state.clear();
        assert!(state.folder_summary().is_empty());
    }
}
