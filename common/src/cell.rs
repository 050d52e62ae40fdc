//! A1表記のセル参照ユーティリティ
//!
//! 列番号 ↔ 列文字の変換、`B12` 形式のセル参照、
//! タブ名付きレンジ（`'Tab'!B:B`）の組み立てを扱う。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 列番号（1始まり）を列文字に変換
///
/// 0 は空文字列を返す。
///
/// # Examples
/// ```
/// use drive_linker_common::column_to_letter;
///
/// assert_eq!(column_to_letter(1), "A");
/// assert_eq!(column_to_letter(28), "AB");
/// ```
pub fn column_to_letter(column: u32) -> String {
    let mut letters = Vec::new();
    let mut n = column;
    while n > 0 {
        let remainder = (n - 1) % 26;
        letters.push(b'A' + remainder as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// 列文字を列番号（1始まり）に変換
///
/// 大文字小文字は区別しない。空文字列・英字以外はエラー。
pub fn letter_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidColumn(letters.to_string()));
    }

    let mut column: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(Error::InvalidColumn(letters.to_string()));
        }
        let value = (ch.to_ascii_uppercase() as u8 - b'A' + 1) as u32;
        column = column
            .checked_mul(26)
            .and_then(|c| c.checked_add(value))
            .ok_or_else(|| Error::InvalidColumn(letters.to_string()))?;
    }
    Ok(column)
}

/// ユーザー入力の列指定を正規化（trim + 大文字化 + 検証）
pub fn normalize_column(input: &str) -> Result<String> {
    let column = input.trim().to_ascii_uppercase();
    letter_to_column(&column)?;
    Ok(column)
}

/// タブ名で修飾したレンジを組み立てる
///
/// タブ名はシングルクォートで囲み、内部のクォートは二重化する。
pub fn qualified_range(tab: &str, range: &str) -> String {
    format!("'{}'!{}", tab.replace('\'', "''"), range)
}

/// セル参照（例: `B12`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub column: String,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: &str, row: u32) -> Result<Self> {
        if row == 0 {
            return Err(Error::InvalidCell(format!("{}{}", column, row)));
        }
        Ok(Self {
            column: normalize_column(column)?,
            row,
        })
    }

    /// `B12` 形式をパース
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidCell(text.to_string()))?;
        let (letters, digits) = text.split_at(split);
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidCell(text.to_string()))?;
        Self::new(letters, row).map_err(|_| Error::InvalidCell(text.to_string()))
    }

    /// 行はそのままで列だけ差し替えた参照を返す
    pub fn with_column(&self, column: &str) -> Result<Self> {
        Self::new(column, self.row)
    }

    /// 単一セルのA1レンジ（`T5:T5`）
    pub fn as_range(&self) -> String {
        format!("{}:{}", self, self)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl std::str::FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
