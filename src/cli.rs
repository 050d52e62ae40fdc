use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drive-linker")]
#[command(about = "Google Drive のファイルURLをスプレッドシートの該当行に書き込むツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ファイル名からインデックスを取り出す正規表現（設定より優先）
    #[arg(long, global = true)]
    pub pattern: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// フォルダ収集から書き込みまで一括実行（未指定の項目は対話で選択）
    Run {
        /// 対象フォルダ（名前またはID、複数指定可）
        #[arg(short, long)]
        folder: Vec<String>,

        /// スプレッドシート（名前またはID）
        #[arg(short, long)]
        sheet: Option<String>,

        /// タブ名
        #[arg(short, long)]
        tab: Option<String>,

        /// インデックス列（列記号または見出し名）
        #[arg(short, long)]
        index_column: Option<String>,

        /// リンクを書き込む列（列記号）
        #[arg(short = 'c', long)]
        target_column: Option<String>,

        /// 書き込まずに結果だけ表示
        #[arg(long)]
        dry_run: bool,

        /// 表をExcelファイルに出力
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Drive のフォルダ一覧
    Folders,

    /// スプレッドシート一覧
    Sheets,

    /// スプレッドシートのタブ一覧
    Tabs {
        /// スプレッドシート（名前またはID）
        #[arg(required = true)]
        sheet: String,
    },

    /// 認証してトークンを保存
    Auth,

    /// ファイル名から取り出されるインデックスを確認
    Extract {
        /// ファイル名
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// OAuth クライアント情報ファイルを設定
        #[arg(long)]
        set_credentials: Option<PathBuf>,

        /// トークン保存先を設定
        #[arg(long)]
        set_token_path: Option<PathBuf>,

        /// インデックス抽出の正規表現を設定
        #[arg(long)]
        set_pattern: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::parse_from([
            "drive-linker", "run", "--folder", "Receipts", "--folder", "Scans",
            "--sheet", "Ledger", "--tab", "2024", "-i", "B", "-c", "T", "--dry-run",
        ]);
        match cli.command {
            Commands::Run { folder, sheet, tab, index_column, target_column, dry_run, export } => {
                assert_eq!(folder, vec!["Receipts", "Scans"]);
                assert_eq!(sheet.as_deref(), Some("Ledger"));
                assert_eq!(tab.as_deref(), Some("2024"));
                assert_eq!(index_column.as_deref(), Some("B"));
                assert_eq!(target_column.as_deref(), Some("T"));
                assert!(dry_run);
                assert!(export.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["drive-linker", "extract", "a 1.pdf", "--verbose", "--pattern", r"(\d+)"]);
        assert!(cli.verbose);
        assert_eq!(cli.pattern.as_deref(), Some(r"(\d+)"));
    }
}
