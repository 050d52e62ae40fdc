//! 照合済みセルへのリンク書き込み

use super::{LinkSession, SheetSelection};
use crate::error::{LinkerError, Result};
use crate::google::SheetsClient;
use drive_linker_common::{CellRef, CheckMark, LinkTarget};

/// 1セル分の書き込み結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellResult {
    pub cell: CellRef,
    pub url: String,
    pub error: Option<String>,
}

impl CellResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub linked: usize,
    pub failed: usize,
    pub duplicates: usize,
    /// ドライランで書き込まなかった件数
    pub planned: usize,
}

/// 書き込み対象を順に書き込む（失敗しても続行）
pub async fn write_targets<F>(
    sheets: &SheetsClient,
    sheet: &SheetSelection,
    targets: &[LinkTarget],
    mut on_result: F,
) -> Vec<CellResult>
where
    F: FnMut(&CellResult),
{
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let outcome = sheets
            .update_cell(&sheet.spreadsheet_id, &sheet.tab, &target.cell, &target.url)
            .await;
        let result = CellResult {
            cell: target.cell.clone(),
            url: target.url.clone(),
            error: outcome.err().map(|e| e.to_string()),
        };
        match &result.error {
            None => tracing::info!("URL '{}' をセル {} に書き込みました", result.url, result.cell),
            Some(e) => tracing::error!("セル {} への書き込みに失敗: {}", result.cell, e),
        }
        on_result(&result);
        results.push(result);
    }
    results
}

/// セッションの書き込み先列に従ってリンクを書き込み、表にマークを付ける
pub async fn write_links<F>(
    sheets: &SheetsClient,
    session: &mut LinkSession,
    dry_run: bool,
    on_result: F,
) -> Result<WriteSummary>
where
    F: FnMut(&CellResult),
{
    let sheet = session.sheet.clone().ok_or(LinkerError::NoSheetSelected)?;
    let column = session
        .target_column
        .clone()
        .ok_or_else(|| LinkerError::ColumnNotFound("書き込み先列が未指定です".into()))?;

    session.table.assign_target_column(&column)?;
    let targets = session.table.link_targets();
    let mut summary = WriteSummary {
        duplicates: session.table.count_marked(CheckMark::Duplicate),
        ..Default::default()
    };

    if dry_run {
        summary.planned = targets.len();
        return Ok(summary);
    }

    let results = write_targets(sheets, &sheet, &targets, on_result).await;
    for result in &results {
        if result.is_ok() {
            session.table.mark(&result.cell, CheckMark::Linked);
            summary.linked += 1;
        } else {
            session.table.mark(&result.cell, CheckMark::Failed);
            summary.failed += 1;
        }
    }
    Ok(summary)
}
