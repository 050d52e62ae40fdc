//! リンク表（ファイル一覧 + 照合結果 + 書き込み結果）
//!
//! ファイルを見つけるたびに行を追加し、照合・書き込みの結果が
//! 分かった時点で該当行を更新する。

use crate::cell::{normalize_column, CellRef};
use crate::column::ColumnIndex;
use crate::error::Result;
use crate::index::IndexExtractor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// 書き込み結果マーク
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckMark {
    #[default]
    Pending,
    Linked,
    Failed,
    /// 同じセルへの書き込みが先行行で行われた
    Duplicate,
}

impl CheckMark {
    pub fn symbol(&self) -> &'static str {
        match self {
            CheckMark::Pending => "",
            CheckMark::Linked => "✔️",
            CheckMark::Failed => "❌",
            CheckMark::Duplicate => "=",
        }
    }
}

/// Driveで見つかったファイル
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file_name: String,
    pub folder_name: String,
    pub url: String,
}

/// 表の1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRow {
    pub check: CheckMark,
    /// 1始まりの行番号
    pub number: usize,
    /// 一致したインデックス列のセル
    pub matched_cell: Option<CellRef>,
    pub index: Option<u64>,
    pub file_name: String,
    pub folder_name: String,
    /// リンクの書き込み先セル
    pub target_cell: Option<CellRef>,
    pub url: String,
}

/// 書き込み対象（セル + URL）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub cell: CellRef,
    pub url: String,
    pub row_number: usize,
}

/// 照合結果の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub matched: usize,
    pub unmatched: usize,
    /// 番号を抽出できなかった行
    pub without_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    rows: Vec<LinkRow>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[LinkRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// ファイルを行として追加（行番号は現在の行数の続き）
    pub fn push_file(&mut self, entry: FileEntry, extractor: &IndexExtractor) -> &LinkRow {
        let index = extractor.extract(&entry.file_name);
        let row = LinkRow {
            number: self.rows.len() + 1,
            index,
            file_name: entry.file_name,
            folder_name: entry.folder_name,
            url: entry.url,
            ..Default::default()
        };
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// インデックス列と照合
    ///
    /// 以前の照合結果・書き込み先・マークはリセットされる。
    pub fn apply_matches(&mut self, column: &ColumnIndex) -> MatchSummary {
        let mut summary = MatchSummary::default();
        for row in &mut self.rows {
            row.matched_cell = None;
            row.target_cell = None;
            row.check = CheckMark::Pending;

            let Some(index) = row.index else {
                summary.without_index += 1;
                continue;
            };
            match column.get(index) {
                Some(cell) => {
                    row.matched_cell = Some(cell.clone());
                    summary.matched += 1;
                }
                None => summary.unmatched += 1,
            }
        }
        summary
    }

    /// 一致した行に書き込み先列を設定し、設定した行数を返す
    pub fn assign_target_column(&mut self, column: &str) -> Result<usize> {
        let column = normalize_column(column)?;
        let mut assigned = 0;
        for row in &mut self.rows {
            row.target_cell = match &row.matched_cell {
                Some(cell) => {
                    assigned += 1;
                    Some(cell.with_column(&column)?)
                }
                None => None,
            };
        }
        Ok(assigned)
    }

    /// 書き込み対象を列挙
    ///
    /// 同じセルを指す行が複数ある場合は先の行を採用し、
    /// 後の行は `Duplicate` にする。
    pub fn link_targets(&mut self) -> Vec<LinkTarget> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for row in &mut self.rows {
            let Some(cell) = &row.target_cell else {
                continue;
            };
            if seen.insert(cell.clone()) {
                targets.push(LinkTarget {
                    cell: cell.clone(),
                    url: row.url.clone(),
                    row_number: row.number,
                });
            } else {
                row.check = CheckMark::Duplicate;
            }
        }
        targets
    }

    /// 書き込み先セルが一致する最初の行にマークを付ける
    pub fn mark(&mut self, cell: &CellRef, check: CheckMark) -> bool {
        match self
            .rows
            .iter_mut()
            .find(|r| r.target_cell.as_ref() == Some(cell) && r.check != CheckMark::Duplicate)
        {
            Some(row) => {
                row.check = check;
                true
            }
            None => false,
        }
    }

    /// フォルダごとのファイル数
    pub fn folder_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.folder_name.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// 行番号からURLを取得（空URLは None）
    pub fn url_of(&self, number: usize) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.number == number)
            .map(|r| r.url.as_str())
            .filter(|u| !u.is_empty())
    }

    pub fn count_marked(&self, check: CheckMark) -> usize {
        self.rows.iter().filter(|r| r.check == check).count()
    }
}
