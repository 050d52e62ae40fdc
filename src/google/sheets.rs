//! Google Sheets API v4

use super::{endpoint, GoogleClient};
use crate::error::{LinkerError, Result};
use drive_linker_common::{column_to_letter, header_columns, qualified_range, CellRef, ColumnInfo};
use serde::{Deserialize, Serialize};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// タブ（シート）情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub title: String,
    pub row_count: u32,
    pub column_count: u32,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    title: String,
    #[serde(default)]
    grid_properties: Option<GridProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u32,
    #[serde(default)]
    column_count: u32,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
    major_dimension: &'a str,
    values: Vec<Vec<&'a str>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    updated_cells: u32,
}

/// セル値を文字列に（数値・真偽値も表示形式の文字列へ）
fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_strings(values: Vec<Vec<serde_json::Value>>) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect()
}

#[derive(Clone)]
pub struct SheetsClient {
    client: GoogleClient,
    base_url: String,
}

impl SheetsClient {
    pub fn new(client: GoogleClient) -> Self {
        Self::with_base_url(client, SHEETS_API_BASE.to_string())
    }

    pub fn with_base_url(client: GoogleClient, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// タブ一覧
    pub async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<TabInfo>> {
        let mut url = endpoint(&self.base_url, &["spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut().append_pair(
            "fields",
            "sheets.properties(title,gridProperties(rowCount,columnCount))",
        );
        let sheet: Spreadsheet = self.client.get_json(url).await?;

        Ok(sheet
            .sheets
            .into_iter()
            .map(|s| {
                let grid = s.properties.grid_properties;
                TabInfo {
                    title: s.properties.title,
                    row_count: grid.as_ref().map(|g| g.row_count).unwrap_or(0),
                    column_count: grid.as_ref().map(|g| g.column_count).unwrap_or(0),
                }
            })
            .collect())
    }

    /// レンジの値を取得
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = endpoint(
            &self.base_url,
            &["spreadsheets", spreadsheet_id, "values", range],
        )?;
        let value_range: ValueRange = self.client.get_json(url).await?;
        Ok(to_strings(value_range.values))
    }

    /// 1行目（見出し）から列一覧を作る
    pub async fn header_columns(&self, spreadsheet_id: &str, tab: &str) -> Result<Vec<ColumnInfo>> {
        let tabs = self.list_tabs(spreadsheet_id).await?;
        let info = tabs
            .iter()
            .find(|t| t.title == tab)
            .ok_or_else(|| LinkerError::TabNotFound(tab.to_string()))?;

        let last = column_to_letter(info.column_count.max(1));
        let range = qualified_range(tab, &format!("A1:{}1", last));
        let values = self.get_values(spreadsheet_id, &range).await?;

        Ok(values
            .into_iter()
            .next()
            .map(|header| header_columns(&header))
            .unwrap_or_default())
    }

    /// 列全体の値（`B:B`）
    pub async fn column_values(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        column: &str,
    ) -> Result<Vec<Vec<String>>> {
        let range = qualified_range(tab, &format!("{}:{}", column, column));
        self.get_values(spreadsheet_id, &range).await
    }

    /// 1セルに値を書き込む（RAW）
    pub async fn update_cell(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        cell: &CellRef,
        value: &str,
    ) -> Result<u32> {
        let range = qualified_range(tab, &cell.as_range());
        let mut url = endpoint(
            &self.base_url,
            &["spreadsheets", spreadsheet_id, "values", range.as_str()],
        )?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = UpdateBody {
            major_dimension: "ROWS",
            values: vec![vec![value]],
        };
        let response: UpdateResponse = self.client.put_json(url, &body).await?;
        Ok(response.updated_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&serde_json::json!("101")), "101");
        assert_eq!(cell_to_string(&serde_json::json!(42)), "42");
        assert_eq!(cell_to_string(&serde_json::json!(true)), "true");
        assert_eq!(cell_to_string(&serde_json::Value::Null), "");
    }

    #[test]
    fn test_spreadsheet_deserialize() {
        let json = r#"{"sheets": [
            {"properties": {"title": "Sheet1", "gridProperties": {"rowCount": 1000, "columnCount": 26}}},
            {"properties": {"title": "Notes"}}
        ]}"#;
        let sheet: Spreadsheet = serde_json::from_str(json).unwrap();
        assert_eq!(sheet.sheets.len(), 2);
        assert_eq!(sheet.sheets[0].properties.grid_properties.as_ref().unwrap().column_count, 26);
        assert!(sheet.sheets[1].properties.grid_properties.is_none());
    }

    #[test]
    fn test_update_body_shape() {
        let body = UpdateBody {
            major_dimension: "ROWS",
            values: vec![vec!["https://drive.google.com/x"]],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["majorDimension"], "ROWS");
        assert_eq!(json["values"][0][0], "https://drive.google.com/x");
    }
}
