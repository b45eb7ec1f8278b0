mod state;

use std::path::Path;

use anyhow::anyhow;
use eframe::egui;
use log::{error, info, warn};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

use crate::cli::SplitSettings;
use state::{Action, Notice, NoticeLevel, SplitterState};

const WINDOW_TITLE: &str = "Audio Splitter";
const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];
const PATH_FIELD_WIDTH: f32 = 480.0;

/// Open the splitter window and block until it is closed.
pub fn launch(settings: SplitSettings) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([750.0, 450.0])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(SplitterApp::new(settings)))),
    )
    .map_err(|err| anyhow!("failed to open the graphical interface: {err}"))
}

struct SplitterApp {
    state: SplitterState,
}

impl SplitterApp {
    fn new(settings: SplitSettings) -> Self {
        Self {
            state: SplitterState::new(settings),
        }
    }
}

impl eframe::App for SplitterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);

            ui.label("Select the audio file:");
            ui.horizontal(|ui| {
                path_field(ui, self.state.input());
                if ui.button("Select File").clicked() {
                    if let Some(path) = FileDialog::new()
                        .set_title("Select the audio file")
                        .add_filter("Audio files", &AUDIO_EXTENSIONS)
                        .pick_file()
                    {
                        actions.push(Action::SelectInput(path));
                    }
                }
            });

            ui.add_space(8.0);
            ui.label("Select the output folder:");
            ui.horizontal(|ui| {
                path_field(ui, self.state.output());
                if ui.button("Select Folder").clicked() {
                    if let Some(path) = FileDialog::new()
                        .set_title("Select the output folder")
                        .pick_folder()
                    {
                        actions.push(Action::SelectOutput(path));
                    }
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Chunk duration:");
                let mut text = self.state.duration_text().to_owned();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut text)
                        .desired_width(120.0)
                        .hint_text("180, 3m, 2m30s"),
                );
                if response.changed() {
                    actions.push(Action::EditDuration(text));
                }
            });

            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                if ui.button("Split Audio").clicked() {
                    actions.push(Action::Split);
                }
            });
        });

        for action in actions {
            self.state.apply(action, chunksplit_core::run);
        }

        if let Some(notice) = self.state.take_notice() {
            show_notice(&notice);
        }
    }
}

fn path_field(ui: &mut egui::Ui, path: Option<&Path>) {
    let text = path
        .map(|path| path.display().to_string())
        .unwrap_or_default();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(PATH_FIELD_WIDTH);
        ui.add(egui::Label::new(text).truncate());
    });
}

fn show_notice(notice: &Notice) {
    let level = match notice.level {
        NoticeLevel::Info => {
            info!("{}", notice.message);
            MessageLevel::Info
        }
        NoticeLevel::Warning => {
            warn!("{}", notice.message);
            MessageLevel::Warning
        }
        NoticeLevel::Error => {
            error!("{}", notice.message);
            MessageLevel::Error
        }
    };

    MessageDialog::new()
        .set_level(level)
        .set_title(notice.title)
        .set_description(notice.message.as_str())
        .set_buttons(MessageButtons::Ok)
        .show();
}
