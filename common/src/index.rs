//! ファイル名からの番号抽出
//!
//! `Invoice 123.pdf` のようなファイル名から照合用の数値インデックスを取り出す。
//! パターンは設定で差し替え可能で、最初のキャプチャグループを番号として扱う。

use crate::error::{Error, Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// デフォルトの抽出パターン（英字＋番号＋任意の `(n)` ＋ `.pdf`）
pub const DEFAULT_INDEX_PATTERN: &str = r"[a-zA-Z\s]*\s*(\d+)\s*(?:\(\d+\))?\s*\.pdf";

lazy_static::lazy_static! {
    static ref DEFAULT_RE: Regex = Regex::new(DEFAULT_INDEX_PATTERN).unwrap();
}

/// 番号抽出器
#[derive(Debug, Clone)]
pub struct IndexExtractor {
    regex: Regex,
}

impl IndexExtractor {
    /// パターンから抽出器を作成
    ///
    /// キャプチャグループを持たないパターンはエラー。
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::Pattern(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(Error::Pattern(format!(
                "pattern has no capture group: {}",
                pattern
            )));
        }
        Ok(Self { regex })
    }

    /// 設定値（未指定ならデフォルト）から作成
    pub fn from_optional(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            Some(p) if !p.trim().is_empty() => Self::new(p),
            _ => Ok(Self::default()),
        }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// ファイル名から番号を抽出
    ///
    /// 一致しない場合、または u64 に収まらない場合は `None`。
    pub fn extract(&self, file_name: &str) -> Option<u64> {
        let caps = self.regex.captures(file_name)?;
        parse_index(caps.get(1)?.as_str())
    }
}

impl Default for IndexExtractor {
    fn default() -> Self {
        Self {
            regex: DEFAULT_RE.clone(),
        }
    }
}

/// デフォルトパターンで番号を抽出
pub fn extract_index(file_name: &str) -> Option<u64> {
    DEFAULT_RE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_index(m.as_str()))
}

/// 数字列を番号に変換
///
/// 全角数字（`１２３`）はNFKC正規化で半角にしてから読む。
pub fn parse_index(text: &str) -> Option<u64> {
    let digits: String = text.trim().nfkc().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple() {
        assert_eq!(extract_index("Invoice 123.pdf"), Some(123));
        assert_eq!(extract_index("123.pdf"), Some(123));
        assert_eq!(extract_index("Scan45.pdf"), Some(45));
    }

    #[test]
    fn test_extract_with_copy_suffix() {
        assert_eq!(extract_index("Scan 45 (2).pdf"), Some(45));
        assert_eq!(extract_index("Report 7(1).pdf"), Some(7));
    }

    #[test]
    fn test_extract_fullwidth_digits() {
        assert_eq!(extract_index("請求書１２３.pdf"), Some(123));
        assert_eq!(extract_index("Scan ４５ (2).pdf"), Some(45));
        let extractor = IndexExtractor::new(r"No\.(\d+)").unwrap();
        assert_eq!(extractor.extract("No.０７"), Some(7));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index(" 42 "), Some(42));
        assert_eq!(parse_index("１２３"), Some(123));
        assert_eq!(parse_index("12a"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn test_extract_leading_zeros() {
        assert_eq!(extract_index("Doc 007.pdf"), Some(7));
    }

    #[test]
    fn test_extract_no_match() {
        assert_eq!(extract_index("notes.txt"), None);
        assert_eq!(extract_index("Invoice.pdf"), None);
        assert_eq!(extract_index(""), None);
    }

    #[test]
    fn test_extract_overflow_is_none() {
        assert_eq!(extract_index("Big 99999999999999999999999.pdf"), None);
    }

    #[test]
    fn test_custom_pattern() {
        let extractor = IndexExtractor::new(r"ID-(\d+)").unwrap();
        assert_eq!(extractor.extract("photo ID-88 final.jpg"), Some(88));
        assert_eq!(extractor.extract("Invoice 123.pdf"), None);
    }

    #[test]
    fn test_pattern_without_group_rejected() {
        let err = IndexExtractor::new(r"\d+").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        assert!(IndexExtractor::new(r"(\d+").is_err());
    }

    #[test]
    fn test_from_optional() {
        let extractor = IndexExtractor::from_optional(None).unwrap();
        assert_eq!(extractor.pattern(), DEFAULT_INDEX_PATTERN);

        let extractor = IndexExtractor::from_optional(Some("  ")).unwrap();
        assert_eq!(extractor.pattern(), DEFAULT_INDEX_PATTERN);

        let extractor = IndexExtractor::from_optional(Some(r"No\.(\d+)")).unwrap();
        assert_eq!(extractor.extract("No.12"), Some(12));
    }
}
