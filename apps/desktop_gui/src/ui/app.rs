use std::time::{Duration, Instant};

use client_core::{
    view::{APP_TITLE, SUBMIT_LABEL},
    ListView, SubmitPolicy,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::validation::Field;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent, orchestration::dispatch_backend_command, reducer::UiState,
};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xd9, 0x3f, 0x3f);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(0x3f, 0xa3, 0x5b);

pub struct KodersApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: UiState,
}

impl KodersApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        policy: SubmitPolicy,
    ) -> Self {
        let mut state = UiState::new(policy);
        dispatch_backend_command(&cmd_tx, BackendCommand::Load, &mut state.status);
        Self {
            cmd_tx,
            ui_rx,
            state,
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.state.status);
    }

    fn process_ui_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.ui_rx.try_recv() {
            self.state.apply(event, now);
        }
        self.state.prune_toasts(now);
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let mut edits = Vec::new();
        egui::Grid::new("koder_form")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for field in Field::ALL {
                    ui.label(field.label());
                    ui.vertical(|ui| {
                        let mut text = self.state.input(field).to_string();
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut text)
                                .hint_text(field.placeholder())
                                .desired_width(260.0),
                        );
                        if self.state.focus_request == Some(field) {
                            response.request_focus();
                            self.state.focus_request = None;
                        }
                        if response.changed() {
                            edits.push((field, text));
                        }
                        if let Some(message) = self.state.form.error_message(field) {
                            ui.colored_label(ERROR_COLOR, message);
                        }
                    });
                    ui.end_row();
                }
            });
        for (field, value) in edits {
            let cmd = self.state.edit_field(field, value);
            self.dispatch(cmd);
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let submit = ui.add_enabled(
                self.state.form.submit_enabled,
                egui::Button::new(SUBMIT_LABEL),
            );
            if submit.clicked() {
                self.dispatch(BackendCommand::Submit);
            }
            if let Some(status) = self.state.view().status_line() {
                ui.colored_label(SUCCESS_COLOR, status);
            }
        });
    }

    fn show_list(&mut self, ui: &mut egui::Ui) {
        let mut delete = None;
        match self.state.view().list {
            ListView::Placeholder(text) => {
                ui.weak(text);
            }
            ListView::Rows(rows) => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::Grid::new("koder_rows")
                        .num_columns(3)
                        .striped(true)
                        .spacing([16.0, 4.0])
                        .show(ui, |ui| {
                            for row in rows {
                                ui.label(row.display_name.as_str());
                                ui.label(row.email.as_str());
                                if ui.small_button("Delete").clicked() {
                                    delete = Some(row.id.clone());
                                }
                                ui.end_row();
                            }
                        });
                });
            }
        }
        if let Some(koder_id) = delete {
            self.dispatch(BackendCommand::Delete { koder_id });
        }
    }

    fn show_toasts(&self, ctx: &egui::Context) {
        if self.state.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("koder_toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .show(ctx, |ui| {
                for toast in &self.state.toasts {
                    let color = if toast.notification.is_error() {
                        ERROR_COLOR
                    } else {
                        SUCCESS_COLOR
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(color, toast.notification.message.as_str());
                    });
                }
            });
    }
}

impl eframe::App for KodersApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(self.state.status.as_str());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(APP_TITLE);
            if let Some(err) = &self.state.startup_error {
                ui.colored_label(ERROR_COLOR, err.as_str());
            }
            ui.separator();
            self.show_form(ui);
            ui.separator();
            self.show_list(ui);
        });

        self.show_toasts(ctx);
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
