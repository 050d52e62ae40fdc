//! Drive Linker
//!
//! Google Drive のフォルダ内ファイルを列挙し、ファイル名の番号とスプレッドシートの
//! インデックス列を照合して、該当行にファイルURLを書き込む。

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod google;
pub mod linker;
pub mod selector;
