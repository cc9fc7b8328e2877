//! GUI module for the token dApp
//!
//! This module provides the graphical user interface built with egui/eframe.
//!
//! ## Module Structure
//!
//! - `app` - Main DappApp struct, launch and the frame loop
//! - `theme` - Centralized theme and styling system (AppTheme)
//! - `notifications` - Activity list entries
//! - `views` - View rendering functions (token screens, banners, wallet panel, activity, settings)
//!
//! ## Usage
//!
//! ```no_run
//! use token_dapp::config::Config;
//! use token_dapp::gui;
//!
//! let config = Config::load().expect("Failed to load config");
//! gui::launch(config).expect("Failed to launch GUI");
//! ```

mod app;
pub mod notifications;
pub mod theme;
pub mod views;

pub use app::{launch, DappApp, GuiSection};
pub use notifications::NotificationEntry;
pub use theme::{configure_style, AppTheme};
