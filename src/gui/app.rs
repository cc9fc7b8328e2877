//! Main GUI application module
//!
//! Contains the DappApp struct, launch and the per-frame update loop.

use crate::{
    config::Config,
    dapp::Dapp,
    node_wallet::NodeWallet,
    operation_log::TransferLog,
    submitter::TransferRequest,
    user_settings::UserSettings,
    wallet::WalletProvider,
};
use anyhow::{anyhow, Context, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

use super::notifications::{push_notification, NotificationEntry};
use super::theme::{configure_style, AppTheme};

/// GUI section enum for navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuiSection {
    Token,
    Activity,
    Settings,
}

/// Editable copy of the persisted settings
#[derive(Default)]
pub(crate) struct SettingsForm {
    pub(crate) rpc_url: String,
    pub(crate) network_id: String,
    pub(crate) network_label: String,
    pub(crate) contracts_dir: String,
    pub(crate) token_address: String,
    pub(crate) poll_interval_ms: String,
    pub(crate) status: Option<String>,
}

impl SettingsForm {
    pub(crate) fn from_settings(settings: &UserSettings) -> Self {
        Self {
            rpc_url: settings.rpc_url.clone(),
            network_id: settings.expected_network_id.clone(),
            network_label: settings.network_label.clone(),
            contracts_dir: settings.contracts_dir.clone(),
            token_address: settings.token_address.clone().unwrap_or_default(),
            poll_interval_ms: settings.poll_interval_ms.to_string(),
            status: None,
        }
    }

    /// Settings as they would be saved, or why they can't be
    pub(crate) fn to_settings(&self) -> Result<UserSettings> {
        let poll_interval_ms = self
            .poll_interval_ms
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow!("Poll interval must be a whole number of milliseconds"))?;
        let token_address = Some(self.token_address.trim().to_string()).filter(|s| !s.is_empty());

        let mut settings = UserSettings {
            expected_network_id: self.network_id.trim().to_string(),
            network_label: self.network_label.trim().to_string(),
            contracts_dir: self.contracts_dir.trim().to_string(),
            token_address,
            poll_interval_ms,
            ..UserSettings::default()
        };
        settings.set_rpc_url(&self.rpc_url);
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Default)]
pub(crate) struct TransferLogView {
    pub(crate) content: String,
    pub(crate) loaded: bool,
}

pub struct DappApp {
    // Dropped before the runtime so the poller and listeners are cancelled first
    pub(crate) dapp: Dapp,
    pub(crate) node_wallet: Option<Arc<NodeWallet>>,
    /// Worker threads for everything `dapp` spawns
    _runtime: Runtime,
    pub(crate) transfer_log: TransferLog,
    pub(crate) theme: AppTheme,
    pub(crate) section: GuiSection,
    pub(crate) notifications: VecDeque<NotificationEntry>,
    pub(crate) transfer_form: TransferRequest,
    pub(crate) settings_form: SettingsForm,
    pub(crate) log_view: TransferLogView,
}

impl DappApp {
    fn new(config: Config, ctx: &egui::Context) -> Result<Self> {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("token-dapp-worker")
            .build()
            .context("Failed to start async runtime")?;

        let contract = config
            .load_token_contract()
            .context("Failed to load the token contract")?;
        tracing::info!(address = ?contract.address, "Token contract loaded");

        let node_wallet = NodeWallet::detect(&config, runtime.handle())?.map(Arc::new);
        let wallet = node_wallet
            .clone()
            .map(|w| w as Arc<dyn WalletProvider>);

        let transfer_log = TransferLog::default_location();
        let dapp = Dapp::new(config, runtime.handle().clone(), wallet, contract)
            .with_transfer_log(transfer_log.clone());

        let user_settings = UserSettings::load();

        Ok(Self {
            dapp,
            node_wallet,
            _runtime: runtime,
            transfer_log,
            theme,
            section: GuiSection::Token,
            notifications: VecDeque::with_capacity(20),
            transfer_form: TransferRequest::default(),
            settings_form: SettingsForm::from_settings(&user_settings),
            log_view: TransferLogView::default(),
        })
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        push_notification(&mut self.notifications, message);
    }

    /// Apply background results. A settled transfer invalidates the loaded transfer log.
    fn poll_events(&mut self) {
        let had_pending = self.dapp.session().pending_tx.is_some();
        for message in self.dapp.pump() {
            self.notify(message);
        }
        if had_pending && self.dapp.session().pending_tx.is_none() {
            self.log_view.loaded = false;
        }
    }

    /// Render a consistent section header with retro ASCII styling
    pub(crate) fn render_section_header(&self, ui: &mut egui::Ui, icon: &str, title: &str) {
        let header_text = self.theme.section_header_text(icon, title);
        let separator = "=".repeat(40);

        ui.label(RichText::new(&separator).size(14.0).color(self.theme.primary));
        ui.label(RichText::new(&header_text).size(24.0).strong().color(self.theme.text_primary));
        ui.label(RichText::new(&separator).size(14.0).color(self.theme.primary));
    }
}

impl App for DappApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_events();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_sm);
            ui.horizontal_wrapped(|ui| {
                ui.heading(RichText::new("Token dApp").size(24.0).color(self.theme.text_primary));
                ui.label(
                    RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                        .size(12.0)
                        .color(self.theme.text_secondary),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_wallet_panel(ui);
                });
            });
            ui.add_space(self.theme.spacing_sm);
        });

        egui::SidePanel::left("nav")
            .resizable(false)
            .exact_width(170.0)
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_md);
                for (section, label) in [
                    (GuiSection::Token, "[T] Token"),
                    (GuiSection::Activity, "[A] Activity"),
                    (GuiSection::Settings, "[*] Settings"),
                ] {
                    let selected = self.section == section;
                    if ui
                        .selectable_label(selected, RichText::new(label).size(15.0))
                        .clicked()
                    {
                        self.section = section;
                    }
                    ui.add_space(self.theme.spacing_xs);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(self.theme.spacing_md);
            egui::ScrollArea::vertical().show(ui, |ui| match self.section {
                GuiSection::Token => self.view_token(ui),
                GuiSection::Activity => self.view_activity(ui),
                GuiSection::Settings => self.view_settings(ui),
            });
        });

        // Background tasks report through a channel; repaint to pick their results up
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

pub fn launch(config: Config) -> Result<()> {
    // Surface setup failures before a window exists
    let (tx, rx) = std::sync::mpsc::channel();
    let app_creator = move |cc: &eframe::CreationContext<'_>| -> Box<dyn App> {
        match DappApp::new(config, &cc.egui_ctx) {
            Ok(app) => Box::new(app),
            Err(e) => {
                tracing::error!("Failed to start: {:#}", e);
                let _ = tx.send(e);
                cc.egui_ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                Box::new(StartupFailed)
            }
        }
    };

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([960.0, 680.0])
        .with_min_inner_size([640.0, 480.0]);

    let native_options = NativeOptions {
        viewport,
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native("Token dApp", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))?;

    match rx.try_recv() {
        Ok(err) => Err(err),
        Err(_) => Ok(()),
    }
}

/// Placeholder app shown for the single frame before the window closes
struct StartupFailed;

impl App for StartupFailed {
    fn update(&mut self, _ctx: &egui::Context, _frame: &mut Frame) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_form_round_trips_defaults() {
        let defaults = UserSettings::default();
        let form = SettingsForm::from_settings(&defaults);
        let settings = form.to_settings().unwrap();
        assert_eq!(settings.rpc_url, defaults.rpc_url);
        assert_eq!(settings.expected_network_id, "1337");
        assert_eq!(settings.token_address, None);
    }

    #[test]
    fn test_settings_form_rejects_bad_interval() {
        let mut form = SettingsForm::from_settings(&UserSettings::default());
        form.poll_interval_ms = "soon".into();
        assert!(form.to_settings().is_err());
        form.poll_interval_ms = "0".into();
        assert!(form.to_settings().is_err());
    }

    #[test]
    fn test_settings_form_blank_rpc_means_no_wallet() {
        let mut form = SettingsForm::from_settings(&UserSettings::default());
        form.rpc_url = "   ".into();
        form.token_address = " 0x5FbDB2315678afecb367f032d93F642f64180aa3 ".into();
        let settings = form.to_settings().unwrap();
        assert_eq!(settings.rpc_url, "");
        assert_eq!(
            settings.token_address.as_deref(),
            Some("0x5FbDB2315678afecb367f032d93F642f64180aa3")
        );
    }
}
