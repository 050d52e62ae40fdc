//! 対話式の選択（フォルダ・シート・タブ・列）
//!
//! コマンドライン引数で指定された場合は `resolve_*` で非対話に解決する。

use crate::error::{LinkerError, Result};
use crate::google::{DriveFile, TabInfo};
use drive_linker_common::{normalize_column, ColumnInfo};
use dialoguer::{Input, MultiSelect, Select};

fn prompt_err(e: dialoguer::Error) -> LinkerError {
    LinkerError::Prompt(e.to_string())
}

/// フォルダを複数選択
pub fn select_folders(folders: &[DriveFile]) -> Result<Vec<DriveFile>> {
    if folders.is_empty() {
        return Err(LinkerError::FolderNotFound("選択できるフォルダがありません".into()));
    }
    let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
    let picked = MultiSelect::new()
        .with_prompt("フォルダを選択 (Space:選択 Enter:決定)")
        .items(&names)
        .interact()
        .map_err(prompt_err)?;

    if picked.is_empty() {
        return Err(LinkerError::FolderNotFound("フォルダが選択されていません".into()));
    }
    Ok(picked.into_iter().map(|i| folders[i].clone()).collect())
}

/// スプレッドシートを1つ選択
pub fn select_spreadsheet(sheets: &[DriveFile]) -> Result<DriveFile> {
    if sheets.is_empty() {
        return Err(LinkerError::SheetNotFound("スプレッドシートがありません".into()));
    }
    let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
    let i = Select::new()
        .with_prompt("スプレッドシートを選択")
        .items(&names)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(sheets[i].clone())
}

/// タブを1つ選択
pub fn select_tab(tabs: &[TabInfo]) -> Result<String> {
    if tabs.is_empty() {
        return Err(LinkerError::TabNotFound("(なし)".into()));
    }
    let names: Vec<&str> = tabs.iter().map(|t| t.title.as_str()).collect();
    let i = Select::new()
        .with_prompt("タブを選択")
        .items(&names)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(tabs[i].title.clone())
}

/// 見出しからインデックス列を選択し、列記号を返す
pub fn select_index_column(columns: &[ColumnInfo]) -> Result<String> {
    if columns.is_empty() {
        return Err(LinkerError::ColumnNotFound("見出し行が空です".into()));
    }
    let labels: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let i = Select::new()
        .with_prompt("インデックス列を選択")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(columns[i].letter.clone())
}

/// 書き込み先の列記号を入力
pub fn input_target_column() -> Result<String> {
    let input: String = Input::new()
        .with_prompt("リンクを書き込む列 (例: T)")
        .validate_with(|text: &String| -> std::result::Result<(), String> {
            normalize_column(text).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;
    Ok(normalize_column(&input)?)
}

/// 名前またはIDで一致するものを探す（IDを優先）
pub fn resolve_by_name_or_id<'a>(items: &'a [DriveFile], query: &str) -> Vec<&'a DriveFile> {
    if let Some(item) = items.iter().find(|f| f.id == query) {
        return vec![item];
    }
    items.iter().filter(|f| f.name == query).collect()
}

/// 1件に絞り込む（同名が複数あれば先頭を使い警告）
pub fn resolve_one<'a>(items: &'a [DriveFile], query: &str) -> Option<&'a DriveFile> {
    let found = resolve_by_name_or_id(items, query);
    if found.len() > 1 {
        tracing::warn!("'{}' に一致するものが {}件 あります。先頭を使用します", query, found.len());
    }
    found.into_iter().next()
}

/// 列記号または見出し名から列記号を決める
pub fn resolve_column(columns: &[ColumnInfo], query: &str) -> Result<String> {
    if let Some(column) = columns.iter().find(|c| c.name == query.trim()) {
        return Ok(column.letter.clone());
    }
    normalize_column(query).map_err(|_| LinkerError::ColumnNotFound(query.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, name: &str) -> DriveFile {
        DriveFile {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_prefers_id() {
        let items = vec![file("abc", "Receipts"), file("Receipts", "Other")];
        let found = resolve_by_name_or_id(&items, "Receipts");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Other");
    }

    #[test]
    fn test_resolve_duplicate_names() {
        let items = vec![file("1", "Scans"), file("2", "Scans"), file("3", "Misc")];
        assert_eq!(resolve_by_name_or_id(&items, "Scans").len(), 2);
        assert_eq!(resolve_one(&items, "Scans").unwrap().id, "1");
        assert!(resolve_one(&items, "Missing").is_none());
    }

    #[test]
    fn test_resolve_column_by_header_or_letter() {
        let columns = vec![
            ColumnInfo { name: "Date".into(), letter: "A".into() },
            ColumnInfo { name: "Number".into(), letter: "B".into() },
        ];
        assert_eq!(resolve_column(&columns, "Number").unwrap(), "B");
        assert_eq!(resolve_column(&columns, "aa").unwrap(), "AA");
        assert!(matches!(
            resolve_column(&columns, "No such"),
            Err(LinkerError::ColumnNotFound(_))
        ));
    }
}
