use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("認証情報ファイルが見つかりません: {0}。`drive-linker config --set-credentials PATH` で設定してください")]
    MissingCredentials(String),

    #[error("認証エラー: {0}")]
    Auth(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] drive_linker_common::Error),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("スプレッドシートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("タブ '{0}' がスプレッドシートにありません")]
    TabNotFound(String),

    #[error("列が見つかりません: {0}")]
    ColumnNotFound(String),

    #[error("スプレッドシートが選択されていません")]
    NoSheetSelected,

    #[error("入力エラー: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, LinkerError>;
