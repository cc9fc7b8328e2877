//! Settings view implementation
//!
//! Edits the persisted settings file. Saved values take effect on the next
//! start; environment variables still override them.

use crate::gui::app::{DappApp, SettingsForm};
use crate::user_settings::UserSettings;
use eframe::egui::{self, RichText};

impl DappApp {
    /// Render the settings view
    pub(crate) fn view_settings(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[*]", "SETTINGS");
        ui.add_space(self.theme.spacing_md);

        let mut save = false;
        let mut reset = false;

        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Wallet & Network").size(18.0).strong());
            ui.add_space(self.theme.spacing_sm);

            let form = &mut self.settings_form;
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([self.theme.spacing_sm, self.theme.spacing_xs])
                .show(ui, |ui| {
                    ui.label("Wallet URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut form.rpc_url)
                            .hint_text("empty = no wallet")
                            .desired_width(400.0),
                    );
                    ui.end_row();

                    ui.label("Expected network id:");
                    ui.add(egui::TextEdit::singleline(&mut form.network_id).desired_width(120.0));
                    ui.end_row();

                    ui.label("Network label:");
                    ui.add(egui::TextEdit::singleline(&mut form.network_label).desired_width(200.0));
                    ui.end_row();

                    ui.label("Contracts directory:");
                    ui.add(egui::TextEdit::singleline(&mut form.contracts_dir).desired_width(400.0));
                    ui.end_row();

                    ui.label("Token address:");
                    ui.add(
                        egui::TextEdit::singleline(&mut form.token_address)
                            .hint_text("from contract-address.json")
                            .desired_width(400.0)
                            .font(egui::TextStyle::Monospace),
                    );
                    ui.end_row();

                    ui.label("Poll interval (ms):");
                    ui.add(egui::TextEdit::singleline(&mut form.poll_interval_ms).desired_width(120.0));
                    ui.end_row();
                });

            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                if ui.add(self.theme.button_primary("Save")).clicked() {
                    save = true;
                }
                if ui.add(self.theme.button_secondary("Reset to defaults")).clicked() {
                    reset = true;
                }
            });

            if let Some(status) = &self.settings_form.status {
                ui.add_space(self.theme.spacing_xs);
                ui.label(RichText::new(status).color(self.theme.accent_orange));
            }

            ui.add_space(self.theme.spacing_xs);
            ui.label(
                RichText::new("Changes take effect on the next start. DAPP_* environment variables override these values.")
                    .small()
                    .color(self.theme.text_secondary),
            );
            ui.label(
                RichText::new(format!("Settings file: {}", UserSettings::settings_path_display()))
                    .small()
                    .color(self.theme.text_secondary),
            );
        });

        if reset {
            self.settings_form = SettingsForm::from_settings(&UserSettings::default());
            self.settings_form.status = Some("Defaults restored (unsaved)".to_string());
        }
        if save {
            self.save_settings();
        }
    }

    fn save_settings(&mut self) {
        let result = self.settings_form.to_settings().and_then(|settings| settings.save());
        match result {
            Ok(()) => {
                self.settings_form.status = Some("Saved. Restart to apply.".to_string());
                self.notify("Settings saved.");
            }
            Err(e) => {
                self.settings_form.status = Some(format!("Not saved: {}", e));
                self.notify(format!("Failed to save settings: {}", e));
            }
        }
    }
}
