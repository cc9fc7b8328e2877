//! Wallet status in the top bar.
//!
//! Laid out right to left: the network the node last reported first, then
//! the account selector and disconnect button when a node wallet is connected.

use crate::config::{network_display_name, Config};
use crate::gui::app::DappApp;
use crate::utils::short_address;
use eframe::egui::{self, RichText};

/// What the node wallet last reported, relative to the configured network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NetworkIndicator {
    /// The node is on the expected network
    Expected(String),
    /// The node reports some other network
    Other(String),
    /// The watcher hasn't heard from the node yet
    Unknown(String),
}

pub(crate) fn network_indicator(config: &Config, seen: Option<&str>) -> NetworkIndicator {
    match seen {
        Some(id) if id == config.expected_network_id => {
            NetworkIndicator::Expected(config.network_label.clone())
        }
        Some(id) => NetworkIndicator::Other(network_display_name(id)),
        None => NetworkIndicator::Unknown(config.network_label.clone()),
    }
}

impl DappApp {
    pub(crate) fn render_wallet_panel(&mut self, ui: &mut egui::Ui) {
        let Some(wallet) = self.node_wallet.clone() else {
            ui.label(RichText::new("● No wallet").color(self.theme.error));
            return;
        };

        let network = wallet.network();
        let (text, color) = match network_indicator(self.dapp.config(), network.as_deref()) {
            NetworkIndicator::Expected(name) => (format!("● {}", name), self.theme.success),
            NetworkIndicator::Other(name) => {
                (format!("● {} (wrong network)", name), self.theme.warning)
            }
            NetworkIndicator::Unknown(name) => {
                (format!("○ {} (no reply)", name), self.theme.text_secondary)
            }
        };

        let Some(account) = self.dapp.session().account else {
            ui.label(RichText::new(format!("Not connected · {}", text)).color(color));
            return;
        };

        ui.label(RichText::new(text).color(color));
        ui.add_space(self.theme.spacing_sm);

        if ui.add(self.theme.button_small("Disconnect")).clicked() {
            wallet.disconnect();
        }

        let known = wallet.known_accounts();
        let mut selected = None;
        egui::ComboBox::from_id_source("account_selector")
            .selected_text(RichText::new(short_address(&account)).monospace())
            .width(160.0)
            .show_ui(ui, |ui| {
                for (idx, candidate) in known.iter().enumerate() {
                    let label = format!("#{} {}", idx, short_address(candidate));
                    if ui
                        .selectable_label(*candidate == account, RichText::new(label).monospace())
                        .clicked()
                        && *candidate != account
                    {
                        selected = Some(idx);
                    }
                }
            });

        if let Some(idx) = selected {
            if let Err(e) = wallet.select_account(idx) {
                self.notify(format!("Failed to switch account: {}", e));
            }
        }
    }
}
