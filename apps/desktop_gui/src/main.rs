use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::anyhow;
use backend_bridge::{
    commands::BackendCommand,
    runtime::{self, BridgeConfig},
};
use clap::Parser;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::{AcademyApp, PersistedShellSettings};

const APP_TITLE: &str = "Red Consult Academy";

#[derive(Parser, Debug)]
#[command(name = "academy-desktop", about = "Red Consult Academy desktop app")]
struct Args {
    /// Settings file (defaults to academy.toml in the working directory).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where the signed-in session is kept between runs.
    #[arg(long, conflicts_with = "ephemeral_session")]
    session_file: Option<PathBuf>,
    /// Keep the session in memory only.
    #[arg(long)]
    ephemeral_session: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(
        config = ?args.config,
        ephemeral_session = args.ephemeral_session,
        "starting desktop app"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(
        cmd_rx,
        ui_tx,
        BridgeConfig {
            config_path: args.config,
            session_file: args.session_file,
            ephemeral_session: args.ephemeral_session,
        },
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|cc| {
            let persisted = PersistedShellSettings::load(cc.storage);
            Ok(Box::new(AcademyApp::new(cmd_tx, ui_rx, persisted)))
        }),
    )
    .map_err(|err| anyhow!("desktop app exited with an error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_flags_parse() {
        let args = Args::try_parse_from([
            "academy-desktop",
            "--config",
            "conf/academy.toml",
            "--ephemeral-session",
        ])
        .expect("args");
        assert_eq!(args.config, Some(PathBuf::from("conf/academy.toml")));
        assert!(args.ephemeral_session);
        assert!(args.session_file.is_none());
    }

    #[test]
    fn session_file_and_ephemeral_session_conflict() {
        let parsed = Args::try_parse_from([
            "academy-desktop",
            "--session-file",
            "/tmp/session.json",
            "--ephemeral-session",
        ]);
        assert!(parsed.is_err());
    }
}
