//! リンク付けワークフロー
//!
//! フォルダ選択 → ファイル収集 → シート/タブ/列選択 → 照合 → 書き込み先列 → 書き込み
//! の各段階を、選択状態を持つ `LinkSession` を通して順に進める。

pub mod collect;
pub mod matching;
pub mod report;
pub mod writeback;

pub use collect::{collect_files, CollectOptions, FolderReport};
pub use matching::{fetch_column_index, match_column, MatchOutcome};
pub use writeback::{write_links, write_targets, CellResult, WriteSummary};

use drive_linker_common::{IndexExtractor, LinkTable};

/// 選択中のスプレッドシートとタブ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSelection {
    pub spreadsheet_id: String,
    pub spreadsheet_name: String,
    pub tab: String,
}

/// ワークフローの状態
#[derive(Debug, Default)]
pub struct LinkSession {
    pub table: LinkTable,
    pub sheet: Option<SheetSelection>,
    pub index_column: Option<String>,
    pub target_column: Option<String>,
    pub extractor: IndexExtractor,
}

impl LinkSession {
    pub fn new(extractor: IndexExtractor) -> Self {
        Self {
            extractor,
            ..Default::default()
        }
    }

    /// 表と選択状態をすべてクリア
    pub fn reset(&mut self) {
        self.table.clear();
        self.sheet = None;
        self.index_column = None;
        self.target_column = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_linker_common::FileEntry;

    #[test]
    fn test_reset_clears_state() {
        let mut session = LinkSession::new(IndexExtractor::default());
        let extractor = session.extractor.clone();
        session.table.push_file(
            FileEntry {
                file_name: "Invoice 1.pdf".into(),
                ..Default::default()
            },
            &extractor,
        );
        session.sheet = Some(SheetSelection {
            spreadsheet_id: "id".into(),
            spreadsheet_name: "Sheet".into(),
            tab: "Tab".into(),
        });
        session.index_column = Some("B".into());

        session.reset();
        assert!(session.table.is_empty());
        assert!(session.sheet.is_none());
        assert!(session.index_column.is_none());
    }
}
