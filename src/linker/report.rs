//! 端末向けの表示

use super::{FolderReport, MatchOutcome, WriteSummary};
use drive_linker_common::LinkRow;
use std::fmt::Write as _;

const HEADERS: [&str; 8] = [
    "Check",
    "NO",
    "GS-name",
    "Index",
    "File Name",
    "Folder Name",
    "GS-Column",
    "URL",
];

fn row_cells(row: &LinkRow) -> [String; 8] {
    [
        row.check.symbol().to_string(),
        row.number.to_string(),
        row.matched_cell.as_ref().map(|c| c.to_string()).unwrap_or_default(),
        row.index.map(|i| i.to_string()).unwrap_or_default(),
        row.file_name.clone(),
        row.folder_name.clone(),
        row.target_cell.as_ref().map(|c| c.to_string()).unwrap_or_default(),
        row.url.clone(),
    ]
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// 表を整形した文字列に
pub fn format_table(rows: &[LinkRow]) -> String {
    let cells: Vec<[String; 8]> = rows.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS.iter().zip(widths).map(|(h, w)| pad(h, w)).collect();
    let _ = writeln!(out, "{}", header.join(" | ").trim_end());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &cells {
        let line: Vec<String> = row.iter().zip(widths).map(|(c, w)| pad(c, w)).collect();
        let _ = writeln!(out, "{}", line.join(" | ").trim_end());
    }
    out
}

pub fn print_table(rows: &[LinkRow]) {
    if rows.is_empty() {
        println!("（表は空です）");
        return;
    }
    print!("{}", format_table(rows));
}

pub fn print_folder_reports(reports: &[FolderReport]) {
    for report in reports {
        match &report.error {
            None => println!("  {} : {}", report.folder_name, report.file_count),
            Some(e) => println!("  {} : {} (エラー: {})", report.folder_name, report.file_count, e),
        }
    }
}

pub fn print_match_outcome(outcome: &MatchOutcome) {
    println!(
        "✔ 照合: 一致 {}件 / 不一致 {}件 / インデックスなし {}件",
        outcome.summary.matched, outcome.summary.unmatched, outcome.summary.without_index
    );
    if !outcome.skipped.is_empty() {
        println!("  ⚠ 整数でない値を {}件 スキップしました", outcome.skipped.len());
    }
}

pub fn print_write_summary(summary: &WriteSummary, dry_run: bool) {
    if dry_run {
        println!("✔ ドライラン: {}件 を書き込み予定", summary.planned);
    } else {
        println!("✔ 書き込み: 成功 {}件 / 失敗 {}件", summary.linked, summary.failed);
    }
    if summary.duplicates > 0 {
        println!("  ⚠ 書き込み先が重複した行: {}件", summary.duplicates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_linker_common::{CellRef, CheckMark};

    #[test]
    fn test_format_table_columns() {
        let rows = vec![LinkRow {
            check: CheckMark::Linked,
            number: 1,
            matched_cell: Some(CellRef::new("B", 12).unwrap()),
            index: Some(45),
            file_name: "Scan 45.pdf".into(),
            folder_name: "Receipts".into(),
            target_cell: Some(CellRef::new("T", 12).unwrap()),
            url: "https://drive.google.com/file/d/abc/view".into(),
        }];
        let text = format_table(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Check | NO | GS-name"));
        assert!(lines[2].contains("B12"));
        assert!(lines[2].contains("T12"));
        assert!(lines[2].ends_with("https://drive.google.com/file/d/abc/view"));
    }

    #[test]
    fn test_format_table_empty_optionals() {
        let rows = vec![LinkRow {
            number: 3,
            file_name: "notes.txt".into(),
            ..Default::default()
        }];
        let text = format_table(&rows);
        assert!(text.lines().nth(2).unwrap().contains("notes.txt"));
    }
}
