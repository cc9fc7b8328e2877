//! Token screens
//!
//! Exactly one of these is shown, chosen by `Dapp::screen`.

use crate::gui::app::DappApp;
use crate::gui::notifications::NotificationEntry;
use crate::screen::Screen;
use crate::utils::format_address;
use eframe::egui::{self, RichText};

const METAMASK_URL: &str = "http://metamask.io";

/// Command that mints test tokens to `address` on the local node
pub(crate) fn faucet_command(address: &str) -> String {
    format!("npx hardhat --network localhost faucet {}", address)
}

impl DappApp {
    pub(crate) fn view_token(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[T]", "TOKEN");
        ui.add_space(self.theme.spacing_md);

        self.render_banners(ui);

        match self.dapp.screen() {
            Screen::NoWallet => self.render_no_wallet(ui),
            Screen::Connect => self.render_connect(ui),
            Screen::Loading => self.render_loading(ui),
            Screen::NoTokens => self.render_no_tokens(ui),
            Screen::Transfer => self.render_transfer(ui),
        }
    }

    fn render_no_wallet(&mut self, ui: &mut egui::Ui) {
        self.theme.frame_panel().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label("No Ethereum wallet was detected.");
                ui.label("Please install");
                if ui
                    .link(RichText::new("MetaMask").color(self.theme.accent_blue))
                    .clicked()
                {
                    if let Err(e) = open::that(METAMASK_URL) {
                        self.notifications
                            .push_back(NotificationEntry::new(format!("Failed to open URL: {}", e)));
                    }
                }
                ui.label(".");
            });
            ui.add_space(self.theme.spacing_xs);
            ui.label(
                RichText::new("Set a wallet URL in Settings to use a local node.")
                    .small()
                    .color(self.theme.text_secondary),
            );
        });
    }

    fn render_connect(&mut self, ui: &mut egui::Ui) {
        self.theme.frame_panel().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Please connect to your wallet.").size(16.0));
                ui.add_space(self.theme.spacing_sm);

                let connecting = self.dapp.is_connecting();
                let label = if connecting { "Connecting..." } else { "Connect Wallet" };
                if ui
                    .add_enabled(!connecting, self.theme.button_primary(label))
                    .clicked()
                {
                    self.dapp.connect();
                }
            });
        });
    }

    fn render_loading(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(self.theme.spacing_lg);
            ui.spinner();
            ui.add_space(self.theme.spacing_xs);
            ui.label(RichText::new("Loading...").color(self.theme.text_secondary));
        });
    }

    fn render_no_tokens(&mut self, ui: &mut egui::Ui) {
        let address = self
            .dapp
            .session()
            .account
            .map(|a| format_address(&a))
            .unwrap_or_default();
        let command = faucet_command(&address);

        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("You don't have tokens to transfer").size(16.0).strong());
            ui.add_space(self.theme.spacing_sm);
            ui.label("To get some tokens, open a terminal in the root of the repository and run:");
            ui.add_space(self.theme.spacing_xs);
            ui.horizontal(|ui| {
                ui.monospace(RichText::new(&command).color(self.theme.accent_orange));
                if ui
                    .add(egui::Button::new("📋").small())
                    .on_hover_text("Copy command")
                    .clicked()
                {
                    ui.output_mut(|o| o.copied_text = command.clone());
                }
            });
            ui.add_space(self.theme.spacing_xs);
            ui.label(
                RichText::new(format!("Here {} is your address.", address))
                    .small()
                    .color(self.theme.text_secondary),
            );
        });
    }

    fn render_transfer(&mut self, ui: &mut egui::Ui) {
        let session = self.dapp.session();
        let (Some(data), Some(balance), Some(account)) =
            (session.token_data.clone(), session.balance, session.account)
        else {
            return;
        };

        self.theme.frame_panel().show(ui, |ui| {
            ui.label(
                RichText::new(format!("{} ({})", data.name, data.symbol))
                    .size(22.0)
                    .strong(),
            );
            ui.horizontal_wrapped(|ui| {
                ui.label("Welcome");
                ui.label(RichText::new(format_address(&account)).strong().monospace());
                ui.label(", you have");
                ui.label(
                    RichText::new(format!("{} {}", balance, data.symbol))
                        .strong()
                        .color(self.theme.accent_green),
                );
                ui.label(".");
            });
        });

        ui.add_space(self.theme.spacing_md);

        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Transfer").size(18.0).strong());
            ui.add_space(self.theme.spacing_sm);

            egui::Grid::new("transfer_grid")
                .num_columns(2)
                .spacing([self.theme.spacing_sm, self.theme.spacing_xs])
                .show(ui, |ui| {
                    ui.label(format!("Amount of {}", data.symbol));
                    ui.add(
                        egui::TextEdit::singleline(&mut self.transfer_form.amount)
                            .hint_text("1")
                            .desired_width(200.0),
                    );
                    ui.end_row();

                    ui.label("Recipient address");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.transfer_form.recipient)
                            .hint_text("0x...")
                            .desired_width(420.0)
                            .font(egui::TextStyle::Monospace),
                    );
                    ui.end_row();
                });

            ui.add_space(self.theme.spacing_sm);
            let ready = self.transfer_form.is_complete();
            if ui
                .add_enabled(ready, self.theme.button_primary("Transfer"))
                .clicked()
            {
                self.dapp.transfer(self.transfer_form.clone());
            }
        });
    }
}
