//! Excel生成（共通ライブラリ）
//!
//! リンク表を1シートの一覧として書き出す。URL列はハイパーリンク。

use crate::error::{Error, Result};
use crate::table::LinkRow;
use rust_xlsxwriter::*;
use std::path::Path;

/// 見出しと列幅
const HEADERS: &[(&str, f64)] = &[
    ("Check", 8.0),
    ("NO", 6.0),
    ("GS-name", 10.0),
    ("Index", 10.0),
    ("File Name", 36.0),
    ("Folder Name", 24.0),
    ("GS-Column", 10.0),
    ("URL", 60.0),
];

/// リンク表をExcelファイルに保存
pub fn write_link_table(rows: &[LinkRow], output_path: &Path, title: &str) -> Result<()> {
    let buffer = generate_excel_buffer(rows, title)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}

/// リンク表をExcelバッファに生成
pub fn generate_excel_buffer(rows: &[LinkRow], title: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xE8F5F0))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(title)).map_err(xlsx_err)?;

    for (col, (label, width)) in HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width).map_err(xlsx_err)?;
        worksheet
            .write_string_with_format(0, col, *label, &header_format)
            .map_err(xlsx_err)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(xlsx_err)?;

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        let matched = row.matched_cell.as_ref().map(|c| c.to_string()).unwrap_or_default();
        let target = row.target_cell.as_ref().map(|c| c.to_string()).unwrap_or_default();

        worksheet
            .write_string_with_format(r, 0, row.check.symbol(), &value_format)
            .map_err(xlsx_err)?;
        worksheet.write_number(r, 1, row.number as f64).map_err(xlsx_err)?;
        worksheet
            .write_string_with_format(r, 2, &matched, &value_format)
            .map_err(xlsx_err)?;
        match row.index {
            Some(index) => {
                worksheet.write_number(r, 3, index as f64).map_err(xlsx_err)?;
            }
            None => {
                worksheet
                    .write_string_with_format(r, 3, "", &value_format)
                    .map_err(xlsx_err)?;
            }
        }
        worksheet
            .write_string_with_format(r, 4, &row.file_name, &value_format)
            .map_err(xlsx_err)?;
        worksheet
            .write_string_with_format(r, 5, &row.folder_name, &value_format)
            .map_err(xlsx_err)?;
        worksheet
            .write_string_with_format(r, 6, &target, &value_format)
            .map_err(xlsx_err)?;
        if !row.url.is_empty() {
            worksheet.write_url(r, 7, row.url.as_str()).map_err(xlsx_err)?;
        }
    }

    if !rows.is_empty() {
        worksheet
            .autofilter(0, 0, rows.len() as u32, HEADERS.len() as u16 - 1)
            .map_err(xlsx_err)?;
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Excelのシート名制約（31文字、禁止文字）に合わせる
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Links".to_string()
    } else {
        cleaned
    }
}

fn xlsx_err(e: XlsxError) -> Error {
    Error::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellRef;
    use crate::table::CheckMark;

    #[test]
    fn test_sheet_name() {
        assert_eq!(sheet_name("Links"), "Links");
        assert_eq!(sheet_name("a/b:c"), "abc");
        assert_eq!(sheet_name(""), "Links");
        assert_eq!(sheet_name("[]"), "Links");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn test_write_link_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.xlsx");
        let rows = vec![
            LinkRow {
                check: CheckMark::Linked,
                number: 1,
                matched_cell: Some(CellRef::parse("B2").unwrap()),
                index: Some(101),
                file_name: "Invoice 101.pdf".into(),
                folder_name: "2024".into(),
                target_cell: Some(CellRef::parse("T2").unwrap()),
                url: "https://drive.google.com/file/d/abc/view".into(),
            },
            LinkRow {
                number: 2,
                file_name: "readme.txt".into(),
                folder_name: "misc".into(),
                ..Default::default()
            },
        ];

        write_link_table(&rows, &path, "Links").unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_generate_empty_table() {
        let buffer = generate_excel_buffer(&[], "Empty").unwrap();
        assert!(!buffer.is_empty());
    }
}
