use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use drive_linker_common::export::write_link_table;
use drive_linker_common::LinkRow;

pub fn export_rows(path: &Path, rows: &[LinkRow], title: &str) -> Result<()> {
    write_link_table(rows, path, title).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// シート名から出力ファイル名を決める
pub fn default_export_name(sheet_name: Option<&str>) -> PathBuf {
    let stem: String = sheet_name
        .unwrap_or_default()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        PathBuf::from("links.xlsx")
    } else {
        PathBuf::from(format!("{stem}.links.xlsx"))
    }
}
