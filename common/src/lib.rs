//! Drive Linker Common Library
//!
//! CLIとデスクトップ版で共有される型と照合ロジック

pub mod cell;
pub mod column;
pub mod error;
pub mod export;
pub mod index;
pub mod table;

pub use cell::{column_to_letter, letter_to_column, normalize_column, qualified_range, CellRef};
pub use column::{header_columns, ColumnIndex, ColumnInfo, SkippedValue};
pub use error::{Error, Result};
pub use index::{extract_index, parse_index, IndexExtractor, DEFAULT_INDEX_PATTERN};
pub use table::{CheckMark, FileEntry, LinkRow, LinkTable, LinkTarget, MatchSummary};
