use std::sync::mpsc::Receiver;

use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};

use drive_linker::config::Config;
use drive_linker::google::DriveFile;
use drive_linker::linker::SheetSelection;
use drive_linker_common::{normalize_column, CheckMark, IndexExtractor, LinkRow};

use crate::io::{default_export_name, export_rows};
use crate::model::{AppState, Dialog};
use crate::worker::{UiMessage, Worker};

const COLUMNS: &[(&str, f32)] = &[
    ("Check", 44.0),
    ("NO", 40.0),
    ("GS-name", 70.0),
    ("Index", 60.0),
    ("File Name", 220.0),
    ("Folder Name", 140.0),
    ("GS-Column", 80.0),
    ("URL", 320.0),
];

pub struct DesktopApp {
    state: AppState,
    worker: Option<Worker>,
    rx: Option<Receiver<UiMessage>>,
    busy: bool,
    status: String,
    error: String,
}

impl DesktopApp {
    pub fn new(ctx: &egui::Context) -> Self {
        let mut app = Self {
            state: AppState::default(),
            worker: None,
            rx: None,
            busy: false,
            status: String::new(),
            error: String::new(),
        };

        let setup = Config::load()
            .map_err(anyhow::Error::from)
            .and_then(|config| {
                let extractor = IndexExtractor::from_optional(config.index_pattern.as_deref())?;
                let (worker, rx) = Worker::start(&config, ctx.clone())?;
                Ok((extractor, worker, rx))
            });
        match setup {
            Ok((extractor, worker, rx)) => {
                app.state.session.extractor = extractor;
                app.worker = Some(worker);
                app.rx = Some(rx);
                app.status = "Ready".to_string();
            }
            Err(err) => app.error = format!("Setup failed: {err:#}"),
        }
        app
    }

    fn start(&mut self, status: &str, run: impl FnOnce(&Worker)) {
        let Some(worker) = &self.worker else {
            self.error = "API client is not available".to_string();
            return;
        };
        self.busy = true;
        self.error.clear();
        self.status = status.to_string();
        run(worker);
    }

    fn poll_messages(&mut self) {
        let Some(rx) = &self.rx else {
            return;
        };
        let messages: Vec<UiMessage> = rx.try_iter().collect();
        for message in messages {
            self.handle_message(message);
        }
    }

    fn handle_message(&mut self, message: UiMessage) {
        match message {
            UiMessage::AuthUrl(url) => {
                self.status = "Waiting for browser sign-in...".to_string();
                self.state.auth_url = Some(url);
            }
            UiMessage::Failed { action, message } => {
                self.busy = false;
                self.state.auth_url = None;
                self.error = format!("{action}: {message}");
            }
            UiMessage::FoldersListed(folders) => {
                self.busy = false;
                self.state.auth_url = None;
                self.status = format!("{} folders", folders.len());
                self.state.dialog = Dialog::folders(folders);
            }
            UiMessage::FileFound(entry) => {
                let extractor = self.state.session.extractor.clone();
                let row = self.state.session.table.push_file(entry, &extractor);
                self.status = format!("Fetching... {}", row.file_name);
            }
            UiMessage::CollectDone(reports) => {
                self.busy = false;
                let failed: Vec<String> = reports
                    .iter()
                    .filter_map(|r| r.error.as_ref().map(|e| format!("{}: {}", r.folder_name, e)))
                    .collect();
                if !failed.is_empty() {
                    self.error = failed.join(" / ");
                }
                self.state.record_reports(reports);
                self.status = format!("{} files", self.state.session.table.len());
            }
            UiMessage::SheetsListed(sheets) => {
                self.busy = false;
                self.state.auth_url = None;
                self.status = format!("{} spreadsheets", sheets.len());
                self.state.dialog = Dialog::Sheets {
                    items: sheets,
                    selected: None,
                };
            }
            UiMessage::TabsListed { sheet, tabs } => {
                self.busy = false;
                self.state.dialog = Dialog::Tabs {
                    sheet,
                    tabs,
                    selected: None,
                };
            }
            UiMessage::ColumnsListed { selection, columns } => {
                self.busy = false;
                self.state.dialog = Dialog::IndexColumn {
                    selection,
                    columns,
                    selected: None,
                };
            }
            UiMessage::ColumnIndexReady { selection, index } => {
                self.busy = false;
                let summary = self.state.session.table.apply_matches(&index);
                self.state.session.sheet = Some(selection);
                self.state.session.index_column = Some(index.column().to_string());
                self.state.session.target_column = None;
                self.status = format!(
                    "Matched {} / unmatched {} / no index {}",
                    summary.matched, summary.unmatched, summary.without_index
                );
                if !index.skipped().is_empty() {
                    self.error = format!("{} non-integer values skipped", index.skipped().len());
                }
            }
            UiMessage::CellWritten(result) => {
                let check = if result.is_ok() { CheckMark::Linked } else { CheckMark::Failed };
                self.state.session.table.mark(&result.cell, check);
                self.status = format!("Wrote {}", result.cell);
                if let Some(err) = result.error {
                    self.error = format!("{}: {}", result.cell, err);
                }
            }
            UiMessage::WriteDone { total } => {
                self.busy = false;
                let table = &self.state.session.table;
                self.status = format!(
                    "Linked {} / failed {} / duplicate {} ({} cells)",
                    table.count_marked(CheckMark::Linked),
                    table.count_marked(CheckMark::Failed),
                    table.count_marked(CheckMark::Duplicate),
                    total
                );
            }
        }
    }

    fn clear_tree(&mut self) {
        self.state.clear();
        self.error.clear();
        self.status = "Cleared".to_string();
    }

    fn link_urls(&mut self, column: String) {
        let Some(selection) = self.state.session.sheet.clone() else {
            self.error = "Select a sheet first".to_string();
            return;
        };
        if let Err(err) = self.state.session.table.assign_target_column(&column) {
            self.error = err.to_string();
            return;
        }
        self.state.session.target_column = Some(column);
        let targets = self.state.session.table.link_targets();
        if targets.is_empty() {
            self.status = "Nothing to link".to_string();
            return;
        }
        let count = targets.len();
        self.start(&format!("Writing {count} cells..."), |w| w.write_links(selection, targets));
    }

    fn export(&mut self) {
        let name = default_export_name(
            self.state.session.sheet.as_ref().map(|s| s.spreadsheet_name.as_str()),
        );
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Excel", &["xlsx"])
            .set_file_name(name.to_string_lossy().as_ref())
            .save_file()
        else {
            return;
        };
        let title = self
            .state
            .session
            .sheet
            .as_ref()
            .map(|s| s.tab.clone())
            .unwrap_or_else(|| "Links".to_string());
        match export_rows(&path, self.state.session.table.rows(), &title) {
            Ok(_) => self.status = format!("Exported {}", path.display()),
            Err(err) => self.error = format!("Export failed: {err:#}"),
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let idle = !self.busy && self.worker.is_some();
        ui.horizontal(|ui| {
            if ui.add_enabled(!self.busy, egui::Button::new("Clear Tree")).clicked() {
                self.clear_tree();
            }
            if ui.add_enabled(idle, egui::Button::new("Select Folders")).clicked() {
                self.start("Listing folders...", |w| w.list_folders());
            }
            if ui.add_enabled(idle, egui::Button::new("Select Sheet")).clicked() {
                self.start("Listing spreadsheets...", |w| w.list_sheets());
            }
            let can_link = idle && self.state.session.sheet.is_some();
            if ui.add_enabled(can_link, egui::Button::new("Link URL")).clicked() {
                self.state.dialog = Dialog::TargetColumn {
                    input: self.state.session.target_column.clone().unwrap_or_default(),
                    error: None,
                };
            }
            let can_export = !self.state.session.table.is_empty();
            if ui.add_enabled(can_export, egui::Button::new("Export")).clicked() {
                self.export();
            }
            if self.busy {
                ui.spinner();
            }
        });
    }

    fn render_summary(&self, ui: &mut egui::Ui) {
        ui.heading("Folders");
        ui.separator();
        let counts = self.state.folder_summary();
        if counts.is_empty() {
            ui.label("No files yet.");
        }
        egui::Grid::new("folder_counts").striped(true).show(ui, |ui| {
            for (i, (folder, count)) in counts.iter().enumerate() {
                ui.label(if folder.is_empty() { "-" } else { folder.as_str() });
                ui.label(count.to_string());
                if let Some(err) = self.state.folder_reports.get(i).and_then(|r| r.error.as_deref()) {
                    ui.label(RichText::new("!").color(Color32::from_rgb(230, 90, 90)))
                        .on_hover_text(err);
                }
                ui.end_row();
            }
        });
        ui.separator();
        ui.label(RichText::new("Sheet").strong());
        ui.label(self.state.sheet_label());
        if let Some(column) = &self.state.session.target_column {
            ui.label(format!("Link column: {column}"));
        }
        ui.separator();
        ui.label(format!("{} rows", self.state.session.table.len()));
    }

    fn render_table(&mut self, ui: &mut egui::Ui) {
        let table = &self.state.session.table;
        let rows = table.rows();
        let mut clicked: Option<usize> = None;
        let mut copied: Option<String> = None;

        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            egui::Grid::new("link_table")
                .striped(true)
                .min_col_width(30.0)
                .show(ui, |ui| {
                    for (label, width) in COLUMNS {
                        ui.add_sized([*width, 18.0], egui::Label::new(RichText::new(*label).strong()));
                    }
                    ui.end_row();

                    for (i, row) in rows.iter().enumerate() {
                        let selected = self.state.selected_row == Some(i);
                        for (col, (_, width)) in COLUMNS.iter().enumerate() {
                            let text = cell_text(row, col);
                            let label = egui::SelectableLabel::new(selected, colored(row, col, text));
                            let response = ui.add_sized([*width, 18.0], label);
                            if response.clicked() {
                                clicked = Some(i);
                            }
                            if response.double_clicked() {
                                copied = table.url_of(row.number).map(String::from);
                            }
                        }
                        ui.end_row();
                    }
                });
        });

        if let Some(i) = clicked {
            self.state.selected_row = Some(i);
        }
        if let Some(url) = copied {
            ui.output_mut(|o| o.copied_text = url);
            self.status = "URL copied".to_string();
        }
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let mut dialog = std::mem::take(&mut self.state.dialog);
        let mut close = false;

        match &mut dialog {
            Dialog::None => {}
            Dialog::Folders { items, checked } => {
                egui::Window::new("Select Folders").collapsible(false).show(ctx, |ui| {
                    egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                        for (item, on) in items.iter().zip(checked.iter_mut()) {
                            ui.checkbox(on, item.name.as_str());
                        }
                    });
                    ui.separator();
                    ui.horizontal(|ui| {
                        let picked: Vec<DriveFile> = items
                            .iter()
                            .zip(checked.iter())
                            .filter(|(_, on)| **on)
                            .map(|(f, _)| f.clone())
                            .collect();
                        if ui.add_enabled(!picked.is_empty(), egui::Button::new("OK")).clicked() {
                            let count = picked.len();
                            self.start(&format!("Fetching {count} folders..."), |w| w.collect_files(picked));
                            close = true;
                        }
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                    });
                });
            }
            Dialog::Sheets { items, selected } => {
                egui::Window::new("Select Spreadsheet").collapsible(false).show(ctx, |ui| {
                    egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                        for (i, item) in items.iter().enumerate() {
                            ui.radio_value(&mut *selected, Some(i), item.name.as_str());
                        }
                    });
                    ui.separator();
                    ui.horizontal(|ui| {
                        let pick = selected.and_then(|i| items.get(i)).cloned();
                        if ui.add_enabled(pick.is_some(), egui::Button::new("OK")).clicked() {
                            if let Some(sheet) = pick {
                                self.start("Listing tabs...", |w| w.list_tabs(sheet));
                            }
                            close = true;
                        }
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                    });
                });
            }
            Dialog::Tabs { sheet, tabs, selected } => {
                egui::Window::new(format!("Select Tab ({})", sheet.name))
                    .collapsible(false)
                    .show(ctx, |ui| {
                        for (i, tab) in tabs.iter().enumerate() {
                            ui.radio_value(&mut *selected, Some(i), tab.title.as_str());
                        }
                        ui.separator();
                        ui.horizontal(|ui| {
                            let pick = selected.and_then(|i| tabs.get(i));
                            if ui.add_enabled(pick.is_some(), egui::Button::new("OK")).clicked() {
                                if let Some(tab) = pick {
                                    let selection = SheetSelection {
                                        spreadsheet_id: sheet.id.clone(),
                                        spreadsheet_name: sheet.name.clone(),
                                        tab: tab.title.clone(),
                                    };
                                    self.start("Reading header...", |w| w.list_columns(selection));
                                }
                                close = true;
                            }
                            if ui.button("Cancel").clicked() {
                                close = true;
                            }
                        });
                    });
            }
            Dialog::IndexColumn { selection, columns, selected } => {
                egui::Window::new("Select Index Column").collapsible(false).show(ctx, |ui| {
                    if columns.is_empty() {
                        ui.label("The header row is empty.");
                    }
                    egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                        for (i, column) in columns.iter().enumerate() {
                            ui.radio_value(&mut *selected, Some(i), column.to_string());
                        }
                    });
                    ui.separator();
                    ui.horizontal(|ui| {
                        let pick = selected.and_then(|i| columns.get(i));
                        if ui.add_enabled(pick.is_some(), egui::Button::new("OK")).clicked() {
                            if let Some(column) = pick {
                                let (selection, letter) = (selection.clone(), column.letter.clone());
                                self.start("Matching...", |w| w.fetch_index(selection, letter));
                            }
                            close = true;
                        }
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                    });
                });
            }
            Dialog::TargetColumn { input, error } => {
                egui::Window::new("Link Column").collapsible(false).show(ctx, |ui| {
                    ui.label("Column letter to write the links into:");
                    ui.text_edit_singleline(input);
                    if let Some(err) = error.as_ref() {
                        ui.label(RichText::new(err).color(Color32::from_rgb(230, 90, 90)));
                    }
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            match normalize_column(input) {
                                Ok(column) => {
                                    self.link_urls(column);
                                    close = true;
                                }
                                Err(e) => *error = Some(e.to_string()),
                            }
                        }
                        if ui.button("Cancel").clicked() {
                            close = true;
                        }
                    });
                });
            }
        }

        if !close && !self.state.dialog.is_open() {
            self.state.dialog = dialog;
        }
    }

    fn render_auth(&mut self, ctx: &egui::Context) {
        let Some(url) = self.state.auth_url.clone() else {
            return;
        };
        egui::Window::new("Google Sign-in").collapsible(false).show(ctx, |ui| {
            ui.label("Open this URL in a browser and allow access:");
            ui.hyperlink_to("Open sign-in page", &url);
            if ui.button("Copy URL").clicked() {
                ui.output_mut(|o| o.copied_text = url.clone());
            }
        });
    }
}

fn cell_text(row: &LinkRow, col: usize) -> String {
    match col {
        0 => row.check.symbol().to_string(),
        1 => row.number.to_string(),
        2 => row.matched_cell.as_ref().map(|c| c.to_string()).unwrap_or_default(),
        3 => row.index.map(|i| i.to_string()).unwrap_or_default(),
        4 => row.file_name.clone(),
        5 => row.folder_name.clone(),
        6 => row.target_cell.as_ref().map(|c| c.to_string()).unwrap_or_default(),
        _ => row.url.clone(),
    }
}

fn colored(row: &LinkRow, col: usize, text: String) -> RichText {
    let text = RichText::new(text).size(12.0);
    if col != 0 {
        return text;
    }
    match row.check {
        CheckMark::Linked => text.color(Color32::from_rgb(90, 200, 120)),
        CheckMark::Failed => text.color(Color32::from_rgb(230, 90, 90)),
        CheckMark::Duplicate => text.color(Color32::from_rgb(246, 196, 69)),
        CheckMark::Pending => text,
    }
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("jp_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .insert(0, "jp_fallback".to_string());
            fonts.families
                .entry(FontFamily::Monospace)
                .or_default()
                .insert(0, "jp_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                if !self.error.is_empty() {
                    ui.separator();
                    ui.label(RichText::new(&self.error).color(Color32::from_rgb(230, 90, 90)));
                }
            });
        });

        egui::SidePanel::left("summary").resizable(true).show(ctx, |ui| {
            self.render_summary(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_table(ui);
        });

        self.render_dialog(ctx);
        self.render_auth(ctx);
    }
}
