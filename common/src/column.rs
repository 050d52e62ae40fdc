//! シート列の値から照合用インデックスを組み立てる

use crate::cell::{column_to_letter, normalize_column, CellRef};
use crate::error::Result;
use crate::index::parse_index;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 見出し行の列情報（列名 + 列文字）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub letter: String,
}

impl std::fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.letter)
    }
}

/// 見出し行の値を列情報に変換
pub fn header_columns(header: &[String]) -> Vec<ColumnInfo> {
    header
        .iter()
        .enumerate()
        .map(|(idx, name)| ColumnInfo {
            name: name.clone(),
            letter: column_to_letter(idx as u32 + 1),
        })
        .collect()
}

/// 整数に変換できなかったセル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedValue {
    pub cell: CellRef,
    pub value: String,
}

/// 列の値 → セル参照の辞書
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    column: String,
    entries: HashMap<u64, CellRef>,
    skipped: Vec<SkippedValue>,
}

impl ColumnIndex {
    /// Sheets APIの `values`（行ごとの配列）から作成
    ///
    /// - 行番号は1始まり
    /// - 空セル・空行は無視
    /// - 整数でない値は `skipped` に記録（全角数字は整数として読む）
    /// - 同じ値が複数行にある場合は後の行で上書き
    pub fn from_values(column: &str, values: &[Vec<String>]) -> Result<Self> {
        let column = normalize_column(column)?;
        let mut entries = HashMap::new();
        let mut skipped = Vec::new();

        for (i, row) in values.iter().enumerate() {
            let Some(raw) = row.first() else {
                continue;
            };
            let item = raw.trim();
            if item.is_empty() {
                continue;
            }
            let cell = CellRef {
                column: column.clone(),
                row: i as u32 + 1,
            };
            match parse_index(item) {
                Some(value) => {
                    entries.insert(value, cell);
                }
                None => skipped.push(SkippedValue {
                    cell,
                    value: item.to_string(),
                }),
            }
        }

        Ok(Self {
            column,
            entries,
            skipped,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn get(&self, value: u64) -> Option<&CellRef> {
        self.entries.get(&value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 整数に変換できなかった値
    pub fn skipped(&self) -> &[SkippedValue] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_columns() {
        let header = vec!["ID".to_string(), "Name".to_string(), "Link".to_string()];
        let columns = header_columns(&header);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].letter, "A");
        assert_eq!(columns[2].name, "Link");
        assert_eq!(columns[2].letter, "C");
        assert_eq!(columns[1].to_string(), "Name (B)");
    }

    #[test]
    fn test_from_values_row_numbers() {
        let values = rows(&[&["ID"], &["101"], &[], &["103"]]);
        let index = ColumnIndex::from_values("b", &values).unwrap();

        assert_eq!(index.column(), "B");
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(101).unwrap().to_string(), "B2");
        assert_eq!(index.get(103).unwrap().to_string(), "B4");
        assert!(index.get(102).is_none());
    }

    #[test]
    fn test_from_values_skips_non_integer() {
        let values = rows(&[&["ID"], &["12a"], &["  7 "], &[""]]);
        let index = ColumnIndex::from_values("A", &values).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(7).unwrap().to_string(), "A3");
        assert_eq!(index.skipped().len(), 2);
        assert_eq!(index.skipped()[0].value, "ID");
        assert_eq!(index.skipped()[1].cell.to_string(), "A2");
    }

    #[test]
    fn test_from_values_fullwidth() {
        let values = rows(&[&["番号"], &["１２３"], &[" ４５ "]]);
        let index = ColumnIndex::from_values("B", &values).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(123).unwrap().to_string(), "B2");
        assert_eq!(index.get(45).unwrap().to_string(), "B3");
        assert_eq!(index.skipped().len(), 1);
    }

    #[test]
    fn test_from_values_duplicate_last_wins() {
        let values = rows(&[&["5"], &["5"]]);
        let index = ColumnIndex::from_values("C", &values).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(5).unwrap().to_string(), "C2");
    }

    #[test]
    fn test_from_values_invalid_column() {
        assert!(ColumnIndex::from_values("1", &[]).is_err());
    }

    #[test]
    fn test_from_values_empty() {
        let index = ColumnIndex::from_values("A", &[]).unwrap();
        assert!(index.is_empty());
        assert!(index.skipped().is_empty());
    }
}
