use std::sync::Arc;

use client_core::{CascadeEvent, CascadeState, ListNode, Notice};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::Directory;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::run_effects,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Success,
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

impl StatusBanner {
    fn from_notice(notice: &Notice) -> Self {
        let severity = if notice.is_error() {
            StatusBannerSeverity::Error
        } else {
            StatusBannerSeverity::Success
        };
        Self {
            severity,
            message: notice.message().to_string(),
        }
    }
}

pub struct BookingApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    cascade: CascadeState,
    /// Date is edited as a draft and committed on focus loss or Enter.
    date_draft: String,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl BookingApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        directory: Arc<Directory>,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            cascade: CascadeState::new(directory),
            date_draft: String::new(),
            status: "Loading appointments...".to_string(),
            status_banner: None,
        };
        app.apply(CascadeEvent::Started);
        app
    }

    fn apply(&mut self, event: CascadeEvent) {
        let date_before = self.cascade.date().to_string();
        let effects = self.cascade.apply(event);
        let outcome = run_effects(&self.cmd_tx, effects);
        if let Some(notice) = outcome.notices.last() {
            self.status_banner = Some(StatusBanner::from_notice(notice));
        }
        if let Some(err) = outcome.error {
            self.show_error(err);
        }
        // A reset after a save clears the date behind the draft.
        if self.cascade.date() != date_before {
            self.date_draft = self.cascade.date().to_string();
        }
    }

    fn show_error(&mut self, err: UiError) {
        self.status = format!("{} error: {}", err.kind().label(), err.message());
        if err.is_blocking() {
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: self.status.clone(),
            });
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Cascade(event) => {
                    if let CascadeEvent::AppointmentsLoaded {
                        outcome: Ok(records),
                        ..
                    } = &event
                    {
                        self.status = format!("{} appointments loaded", records.len());
                    }
                    self.apply(event);
                }
                UiEvent::Error(err) => self.show_error(err),
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
                StatusBannerSeverity::Success => (
                    egui::Color32::from_rgb(44, 94, 62),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(92, 160, 112)),
                ),
            };

            egui::Frame::new()
                .fill(fill)
                .stroke(stroke)
                .corner_radius(egui::CornerRadius::same(8))
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    /// Select-style picker. Returns the new value when the user picked a different one.
    fn option_picker(
        ui: &mut egui::Ui,
        id: &'static str,
        placeholder: &str,
        current: &str,
        options: &[String],
    ) -> Option<String> {
        let mut selected = current.to_string();
        let selected_text = if current.is_empty() {
            placeholder.to_string()
        } else {
            current.to_string()
        };

        egui::ComboBox::from_id_salt(id)
            .selected_text(selected_text)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut selected, String::new(), placeholder);
                for option in options {
                    ui.selectable_value(&mut selected, option.clone(), option.as_str());
                }
            });

        (selected != current).then_some(selected)
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let departments: Vec<String> = self
            .cascade
            .directory()
            .departments()
            .map(str::to_string)
            .collect();

        egui::Grid::new("booking_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Department");
                let picked = Self::option_picker(
                    ui,
                    "department_select",
                    "Select Department",
                    self.cascade.department(),
                    &departments,
                );
                if let Some(department) = picked {
                    self.apply(CascadeEvent::DepartmentChanged(department));
                }
                ui.end_row();

                ui.label("Doctor");
                let doctors = self.cascade.doctor_options().to_vec();
                let picked = Self::option_picker(
                    ui,
                    "doctor_select",
                    "Select Doctor",
                    self.cascade.doctor(),
                    &doctors,
                );
                if let Some(doctor) = picked {
                    self.apply(CascadeEvent::DoctorChanged(doctor));
                }
                ui.end_row();

                ui.label("Date");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.date_draft)
                        .id_salt("date_input")
                        .hint_text("YYYY-MM-DD")
                        .desired_width(f32::INFINITY),
                );
                if response.lost_focus() && self.date_draft.trim() != self.cascade.date() {
                    let date = self.date_draft.clone();
                    self.apply(CascadeEvent::DateChanged(date));
                }
                ui.end_row();

                ui.label("Time");
                let times = self.cascade.time_options().to_vec();
                let picked = Self::option_picker(
                    ui,
                    "time_select",
                    "Select Time",
                    self.cascade.time(),
                    &times,
                );
                if let Some(time) = picked {
                    self.apply(CascadeEvent::TimeChanged(time));
                }
                ui.end_row();

                ui.label("Issue");
                let mut issue = self.cascade.issue().to_string();
                let response = ui.add(
                    egui::TextEdit::multiline(&mut issue)
                        .id_salt("issue_input")
                        .hint_text("Describe the reason for your visit")
                        .desired_rows(3)
                        .desired_width(f32::INFINITY),
                );
                if response.changed() {
                    self.apply(CascadeEvent::IssueChanged(issue));
                }
                ui.end_row();
            });

        ui.add_space(8.0);
        if ui.button("Book Appointment").clicked() {
            // Commit a date still being typed before validating.
            if self.date_draft.trim() != self.cascade.date() {
                let date = self.date_draft.clone();
                self.apply(CascadeEvent::DateChanged(date));
            }
            self.apply(CascadeEvent::Submitted);
        }
    }

    fn show_appointments(&self, ui: &mut egui::Ui) {
        ui.heading("Appointments");
        ui.separator();

        let view = self.cascade.appointments();
        if !view.is_loaded() {
            ui.weak("Loading...");
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for node in view.nodes() {
                    match node {
                        ListNode::Placeholder(text) => {
                            ui.weak(text.as_str());
                        }
                        ListNode::Record(record) => {
                            ui.label(egui::RichText::new(record.heading.as_str()).strong());
                            ui.label(record.detail.as_str());
                            ui.add_space(6.0);
                        }
                    }
                }
            });
    }
}

impl eframe::App for BookingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(self.status.as_str());
        });

        egui::SidePanel::right("appointments_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.show_appointments(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.heading("Book an Appointment");
            ui.add_space(8.0);
            self.show_form(ui);
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
