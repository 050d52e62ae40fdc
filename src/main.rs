use clap::Parser;
use drive_linker::{auth, cli, config, error, google, linker, selector};
use drive_linker_common::{export, normalize_column, IndexExtractor, DEFAULT_INDEX_PATTERN};
use cli::{Cli, Commands};
use config::Config;
use error::{LinkerError, Result};
use google::{DriveFile, GoogleApis};
use indicatif::{ProgressBar, ProgressStyle};
use linker::{CollectOptions, LinkSession, SheetSelection};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "drive_linker=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn connect(config: &Config) -> Result<GoogleApis> {
    let authenticator = auth::Authenticator::from_config(config)?;
    tracing::debug!("auth: {}", authenticator.describe());
    GoogleApis::new(authenticator, config)
}

fn extractor(cli_pattern: Option<&str>, config: &Config) -> Result<IndexExtractor> {
    let pattern = cli_pattern.or(config.index_pattern.as_deref());
    Ok(IndexExtractor::from_optional(pattern)?)
}

struct RunArgs {
    folder: Vec<String>,
    sheet: Option<String>,
    tab: Option<String>,
    index_column: Option<String>,
    target_column: Option<String>,
    dry_run: bool,
    export: Option<PathBuf>,
}

async fn pick_folders(apis: &GoogleApis, queries: &[String]) -> Result<Vec<DriveFile>> {
    let pb = spinner("フォルダ一覧を取得中...");
    let folders = apis.drive.list_folders().await;
    pb.finish_and_clear();
    let folders = folders?;

    if queries.is_empty() {
        return selector::select_folders(&folders);
    }

    let mut picked = Vec::with_capacity(queries.len());
    for query in queries {
        let found = match selector::resolve_one(&folders, query) {
            Some(folder) => folder.clone(),
            None => apis
                .drive
                .find_folders_by_name(query)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| LinkerError::FolderNotFound(query.clone()))?,
        };
        picked.push(found);
    }
    Ok(picked)
}

async fn pick_sheet(apis: &GoogleApis, query: Option<&str>) -> Result<DriveFile> {
    let pb = spinner("スプレッドシート一覧を取得中...");
    let sheets = apis.drive.list_spreadsheets().await;
    pb.finish_and_clear();
    let sheets = sheets?;

    match query {
        Some(q) => selector::resolve_one(&sheets, q)
            .cloned()
            .ok_or_else(|| LinkerError::SheetNotFound(q.to_string())),
        None => selector::select_spreadsheet(&sheets),
    }
}

async fn pick_tab(apis: &GoogleApis, sheet: &DriveFile, query: Option<&str>) -> Result<String> {
    let tabs = apis.sheets.list_tabs(&sheet.id).await?;
    match query {
        Some(q) => tabs
            .iter()
            .find(|t| t.title == q)
            .map(|t| t.title.clone())
            .ok_or_else(|| LinkerError::TabNotFound(q.to_string())),
        None => selector::select_tab(&tabs),
    }
}

async fn run(config: &Config, extractor: IndexExtractor, args: RunArgs) -> Result<()> {
    println!("🔗 drive-linker - リンク書き込み\n");
    let apis = connect(config)?;
    let mut session = LinkSession::new(extractor);

    // 1. フォルダ選択
    println!("[1/5] フォルダを選択...");
    let folders = pick_folders(&apis, &args.folder).await?;
    println!("✔ {}フォルダを選択\n", folders.len());

    // 2. ファイル収集
    println!("[2/5] ファイルを収集中...");
    let pb = spinner("取得中...");
    let options = CollectOptions {
        page_delay: config.page_delay(),
    };
    let extractor = session.extractor.clone();
    let reports = linker::collect_files(&apis.drive, &folders, &options, |entry| {
        pb.set_message(format!("{} / {}", entry.folder_name, entry.file_name));
        session.table.push_file(entry, &extractor);
    })
    .await?;
    pb.finish_and_clear();
    linker::report::print_folder_reports(&reports);
    println!("✔ {}件のファイルを取得\n", session.table.len());

    // 3. シート・タブ・インデックス列
    println!("[3/5] スプレッドシートを選択...");
    let sheet = pick_sheet(&apis, args.sheet.as_deref()).await?;
    let tab = pick_tab(&apis, &sheet, args.tab.as_deref()).await?;
    let columns = apis.sheets.header_columns(&sheet.id, &tab).await?;
    let index_column = match args.index_column.as_deref() {
        Some(q) => selector::resolve_column(&columns, q)?,
        None => selector::select_index_column(&columns)?,
    };
    println!("✔ {} / {} / {}列\n", sheet.name, tab, index_column);
    session.sheet = Some(SheetSelection {
        spreadsheet_id: sheet.id.clone(),
        spreadsheet_name: sheet.name.clone(),
        tab,
    });
    session.index_column = Some(index_column);

    // 4. 照合
    println!("[4/5] インデックス列と照合中...");
    let outcome = linker::match_column(&apis.sheets, &mut session).await?;
    linker::report::print_match_outcome(&outcome);
    println!();

    // 5. 書き込み
    let target = match args.target_column.as_deref() {
        Some(c) => normalize_column(c)?,
        None => selector::input_target_column()?,
    };
    session.target_column = Some(target.clone());
    println!("[5/5] {}列へ書き込み中...{}", target, if args.dry_run { " (ドライラン)" } else { "" });
    let pb = spinner("書き込み中...");
    let summary = linker::write_links(&apis.sheets, &mut session, args.dry_run, |result| {
        pb.set_message(format!("{}", result.cell));
    })
    .await?;
    pb.finish_and_clear();

    println!();
    linker::report::print_table(session.table.rows());
    println!();
    linker::report::print_write_summary(&summary, args.dry_run);

    if let Some(path) = args.export {
        export::write_link_table(session.table.rows(), &path, &sheet.name)?;
        println!("✔ Excelに出力: {}", path.display());
    }

    println!("\n✅ 完了");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Run { folder, sheet, tab, index_column, target_column, dry_run, export } => {
            let extractor = extractor(cli.pattern.as_deref(), &config)?;
            let args = RunArgs { folder, sheet, tab, index_column, target_column, dry_run, export };
            run(&config, extractor, args).await?;
        }

        Commands::Folders => {
            let apis = connect(&config)?;
            for folder in apis.drive.list_folders().await? {
                println!("{}\t{}", folder.id, folder.name);
            }
        }

        Commands::Sheets => {
            let apis = connect(&config)?;
            for sheet in apis.drive.list_spreadsheets().await? {
                println!("{}\t{}", sheet.id, sheet.name);
            }
        }

        Commands::Tabs { sheet } => {
            let apis = connect(&config)?;
            let sheet = pick_sheet(&apis, Some(sheet.as_str())).await?;
            for tab in apis.sheets.list_tabs(&sheet.id).await? {
                println!("{}\t{}行 x {}列", tab.title, tab.row_count, tab.column_count);
            }
        }

        Commands::Auth => {
            let authenticator = auth::Authenticator::from_config(&config)?;
            authenticator.access_token().await?;
            println!("✔ 認証しました: {}", authenticator.describe());
        }

        Commands::Extract { names } => {
            let extractor = extractor(cli.pattern.as_deref(), &config)?;
            for name in names {
                match extractor.extract(&name) {
                    Some(index) => println!("{}\t{}", index, name),
                    None => println!("-\t{}", name),
                }
            }
        }

        Commands::Config { show, set_credentials, set_token_path, set_pattern } => {
            let mut config = config;
            let changed = set_credentials.is_some() || set_token_path.is_some() || set_pattern.is_some();

            if let Some(path) = set_credentials {
                config.set_credentials_path(path)?;
                println!("✔ 認証情報ファイルを設定しました");
            }
            if let Some(path) = set_token_path {
                config.set_token_path(path)?;
                println!("✔ トークン保存先を設定しました");
            }
            if let Some(pattern) = set_pattern {
                config.set_index_pattern(pattern)?;
                println!("✔ インデックス抽出パターンを設定しました");
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  認証情報: {}", config.credentials_path()?.display());
                println!("  トークン: {}", config.token_path()?.display());
                println!(
                    "  サービスアカウント: {}",
                    config
                        .service_account_key
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!(
                    "  パターン: {}",
                    config.index_pattern.as_deref().unwrap_or(DEFAULT_INDEX_PATTERN)
                );
                println!("  ページサイズ: {}", config.page_size);
                println!("  ページ間隔: {}ms", config.page_delay_ms);
            }
        }
    }

    Ok(())
}
