//! Activity view: recent notifications and the transfer log

use crate::gui::app::DappApp;
use eframe::egui::{self, RichText};

impl DappApp {
    pub(crate) fn view_activity(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[A]", "ACTIVITY");
        ui.add_space(self.theme.spacing_md);

        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Recent Notifications").size(16.0).strong());
            ui.add_space(self.theme.spacing_sm);
            if self.notifications.is_empty() {
                ui.label(RichText::new("Nothing yet.").color(self.theme.text_secondary));
            }
            for entry in self.notifications.iter().rev() {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(entry.time_ago())
                            .small()
                            .color(self.theme.text_secondary),
                    );
                    ui.label(&entry.message);
                });
            }
        });

        ui.add_space(self.theme.spacing_lg);

        if !self.log_view.loaded {
            self.reload_transfer_log();
        }

        let mut refresh = false;
        self.theme.frame_panel().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Transfer Log").size(16.0).strong());
                if ui.add(self.theme.button_small("Refresh")).clicked() {
                    refresh = true;
                }
            });
            let path = self.transfer_log.path().display().to_string();
            ui.horizontal(|ui| {
                ui.label(RichText::new(&path).small().color(self.theme.text_secondary));
                if ui
                    .add(egui::Button::new("📋").small())
                    .on_hover_text("Copy path")
                    .clicked()
                {
                    ui.output_mut(|o| o.copied_text = path.clone());
                }
            });
            ui.add_space(self.theme.spacing_sm);
            egui::ScrollArea::vertical()
                .id_source("transfer_log_scroll")
                .max_height(320.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.log_view.content.as_str())
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY),
                    );
                });
        });

        if refresh {
            self.reload_transfer_log();
        }
    }

    fn reload_transfer_log(&mut self) {
        self.log_view.content = match self.transfer_log.read() {
            Ok(content) if content.is_empty() => "No transfers logged yet.".to_string(),
            Ok(content) => content,
            Err(e) => format!("Failed to read transfer log: {}", e),
        };
        self.log_view.loaded = true;
    }
}
