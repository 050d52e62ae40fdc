//! インデックス列との照合

use super::LinkSession;
use crate::error::{LinkerError, Result};
use crate::google::SheetsClient;
use drive_linker_common::{ColumnIndex, MatchSummary, SkippedValue};

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub summary: MatchSummary,
    /// インデックス列で整数に変換できた値の数
    pub column_size: usize,
    pub skipped: Vec<SkippedValue>,
}

/// インデックス列を取得して辞書化
pub async fn fetch_column_index(
    sheets: &SheetsClient,
    spreadsheet_id: &str,
    tab: &str,
    column: &str,
) -> Result<ColumnIndex> {
    let values = sheets.column_values(spreadsheet_id, tab, column).await?;
    let index = ColumnIndex::from_values(column, &values)?;

    for skipped in index.skipped() {
        tracing::warn!("{} の値 '{}' は整数に変換できません", skipped.cell, skipped.value);
    }
    tracing::debug!("column {}: {} values", index.column(), index.len());
    Ok(index)
}

/// セッションの選択に従って照合し、表を更新
pub async fn match_column(sheets: &SheetsClient, session: &mut LinkSession) -> Result<MatchOutcome> {
    let sheet = session.sheet.as_ref().ok_or(LinkerError::NoSheetSelected)?;
    let column = session
        .index_column
        .as_deref()
        .ok_or_else(|| LinkerError::ColumnNotFound("インデックス列が未選択です".into()))?;

    let index = fetch_column_index(sheets, &sheet.spreadsheet_id, &sheet.tab, column).await?;
    let summary = session.table.apply_matches(&index);

    Ok(MatchOutcome {
        summary,
        column_size: index.len(),
        skipped: index.skipped().to_vec(),
    })
}
