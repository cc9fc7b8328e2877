//! Status banners shown above the token screens

use crate::gui::app::DappApp;
use eframe::egui::{self, RichText};

impl DappApp {
    pub(crate) fn render_banners(&mut self, ui: &mut egui::Ui) {
        let banners = self.dapp.banners();
        if banners.is_empty() {
            return;
        }

        if let Some(text) = &banners.network_error {
            if self.render_banner(ui, text, self.theme.warning, true) {
                self.dapp.dismiss_network_error();
            }
        }

        // Cleared when the transaction settles, never by the user
        if let Some(text) = &banners.pending_tx {
            self.render_banner(ui, text, self.theme.accent_blue, false);
        }

        if let Some(text) = &banners.transaction_error {
            if self.render_banner(ui, text, self.theme.error, true) {
                self.dapp.dismiss_transaction_error();
            }
        }

        ui.add_space(self.theme.spacing_sm);
    }

    /// Returns true when the dismiss button was clicked
    fn render_banner(
        &self,
        ui: &mut egui::Ui,
        text: &str,
        color: egui::Color32,
        dismissible: bool,
    ) -> bool {
        let mut dismissed = false;
        self.theme.frame_banner(color).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(text).color(color));
                if dismissible {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(self.theme.button_small("Dismiss")).clicked() {
                            dismissed = true;
                        }
                    });
                }
            });
        });
        ui.add_space(self.theme.spacing_xs);
        dismissed
    }
}
