// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Codepad - Main Entry Point
//!
//! A small C/C++ code editor that re-indents the whole file in the
//! background once you stop typing. Built with Rust and egui.

mod app;
mod config;
mod editor;
mod error;
mod ids;
mod indent;
mod layout;
mod state;
mod theme;
mod ui;
mod view_model;

use app::CodepadApp;
use config::load_config;
use log::info;

/// Application name constant.
const APP_NAME: &str = "Codepad";

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    // Load settings to get window configuration
    let settings = load_config();
    let window_size = &settings.window_size;

    info!(
        "Window configuration: {}x{}, maximized: {}",
        window_size.width, window_size.height, window_size.maximized
    );

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([400.0, 300.0])
        .with_maximized(window_size.maximized);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(CodepadApp::new(cc, settings)))),
    )
}
