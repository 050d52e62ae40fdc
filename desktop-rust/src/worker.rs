//! バックグラウンド処理
//!
//! API呼び出しはすべて tokio ランタイム上で実行し、結果は `UiMessage` として
//! UIスレッドへ送る。表の更新はUIスレッドだけが行う。

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use eframe::egui;

use drive_linker::auth::Authenticator;
use drive_linker::config::Config;
use drive_linker::google::{DriveFile, GoogleApis, TabInfo};
use drive_linker::linker::{self, CellResult, CollectOptions, FolderReport, SheetSelection};
use drive_linker_common::{ColumnIndex, ColumnInfo, FileEntry, LinkTarget};

pub enum UiMessage {
    AuthUrl(String),
    Failed { action: &'static str, message: String },
    FoldersListed(Vec<DriveFile>),
    FileFound(FileEntry),
    CollectDone(Vec<FolderReport>),
    SheetsListed(Vec<DriveFile>),
    TabsListed { sheet: DriveFile, tabs: Vec<TabInfo> },
    ColumnsListed { selection: SheetSelection, columns: Vec<ColumnInfo> },
    ColumnIndexReady { selection: SheetSelection, index: ColumnIndex },
    CellWritten(CellResult),
    WriteDone { total: usize },
}

pub struct Worker {
    runtime: tokio::runtime::Runtime,
    apis: GoogleApis,
    page_delay: std::time::Duration,
    tx: Sender<UiMessage>,
    ctx: egui::Context,
}

impl Worker {
    pub fn start(config: &Config, ctx: egui::Context) -> Result<(Self, Receiver<UiMessage>)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("start tokio runtime")?;

        let (tx, rx) = mpsc::channel();
        let auth_tx = tx.clone();
        let auth_ctx = ctx.clone();
        let auth = Authenticator::from_config(config)
            .context("load credentials")?
            .with_auth_url_callback(Box::new(move |url: &str| {
                let _ = auth_tx.send(UiMessage::AuthUrl(url.to_string()));
                auth_ctx.request_repaint();
            }));
        tracing::info!("auth: {}", auth.describe());
        let apis = GoogleApis::new(auth, config).context("build API client")?;

        let worker = Self {
            runtime,
            apis,
            page_delay: config.page_delay(),
            tx,
            ctx,
        };
        Ok((worker, rx))
    }

    fn sender(&self) -> Notifier {
        Notifier {
            tx: self.tx.clone(),
            ctx: self.ctx.clone(),
        }
    }

    pub fn list_folders(&self) {
        let drive = self.apis.drive.clone();
        let notify = self.sender();
        self.runtime.spawn(async move {
            match drive.list_folders().await {
                Ok(folders) => notify.send(UiMessage::FoldersListed(folders)),
                Err(e) => notify.fail("フォルダ一覧", e),
            }
        });
    }

    pub fn collect_files(&self, folders: Vec<DriveFile>) {
        let drive = self.apis.drive.clone();
        let notify = self.sender();
        let options = CollectOptions {
            page_delay: self.page_delay,
        };
        self.runtime.spawn(async move {
            let result = linker::collect_files(&drive, &folders, &options, |entry| {
                notify.send(UiMessage::FileFound(entry));
            })
            .await;
            match result {
                Ok(reports) => notify.send(UiMessage::CollectDone(reports)),
                Err(e) => notify.fail("ファイル収集", e),
            }
        });
    }

    pub fn list_sheets(&self) {
        let drive = self.apis.drive.clone();
        let notify = self.sender();
        self.runtime.spawn(async move {
            match drive.list_spreadsheets().await {
                Ok(sheets) => notify.send(UiMessage::SheetsListed(sheets)),
                Err(e) => notify.fail("スプレッドシート一覧", e),
            }
        });
    }

    pub fn list_tabs(&self, sheet: DriveFile) {
        let sheets = self.apis.sheets.clone();
        let notify = self.sender();
        self.runtime.spawn(async move {
            match sheets.list_tabs(&sheet.id).await {
                Ok(tabs) => notify.send(UiMessage::TabsListed { sheet, tabs }),
                Err(e) => notify.fail("タブ一覧", e),
            }
        });
    }

    pub fn list_columns(&self, selection: SheetSelection) {
        let sheets = self.apis.sheets.clone();
        let notify = self.sender();
        self.runtime.spawn(async move {
            match sheets.header_columns(&selection.spreadsheet_id, &selection.tab).await {
                Ok(columns) => notify.send(UiMessage::ColumnsListed { selection, columns }),
                Err(e) => notify.fail("見出し取得", e),
            }
        });
    }

    pub fn fetch_index(&self, selection: SheetSelection, column: String) {
        let sheets = self.apis.sheets.clone();
        let notify = self.sender();
        self.runtime.spawn(async move {
            let result = linker::fetch_column_index(
                &sheets,
                &selection.spreadsheet_id,
                &selection.tab,
                &column,
            )
            .await;
            match result {
                Ok(index) => notify.send(UiMessage::ColumnIndexReady { selection, index }),
                Err(e) => notify.fail("インデックス列取得", e),
            }
        });
    }

    pub fn write_links(&self, selection: SheetSelection, targets: Vec<LinkTarget>) {
        let sheets = self.apis.sheets.clone();
        let notify = self.sender();
        self.runtime.spawn(async move {
            let results = linker::write_targets(&sheets, &selection, &targets, |result| {
                notify.send(UiMessage::CellWritten(result.clone()));
            })
            .await;
            notify.send(UiMessage::WriteDone {
                total: results.len(),
            });
        });
    }
}

/// 送信してUIを起こす
struct Notifier {
    tx: Sender<UiMessage>,
    ctx: egui::Context,
}

impl Notifier {
    fn send(&self, message: UiMessage) {
        if self.tx.send(message).is_ok() {
            self.ctx.request_repaint();
        }
    }

    fn fail(&self, action: &'static str, err: impl std::fmt::Display) {
        tracing::error!("{} failed: {}", action, err);
        self.send(UiMessage::Failed {
            action,
            message: err.to_string(),
        });
    }
}
