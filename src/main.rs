//! Entry point for the headless **deskpager** daemon.
//!
//! Builds a [`Desktop`](deskpager::desktop::Desktop) on the configured
//! output, spawns the Unix-socket
//! [`CommandSource`](deskpager::traits::CommandSource) on a background
//! thread and processes incoming commands on the main thread.  With no
//! compositor attached, shell requests (panels, cursor) are only logged.

use deskpager::command::Command;
use deskpager::config::Config;
use deskpager::desktop::Desktop;
use deskpager::ipc::listener::UnixSocketListener;
use deskpager::traits::{CommandSource, Cursor, Shell};
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

/// Resolve the config directory (`$XDG_CONFIG_HOME/deskpager`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("deskpager")
}

/// Try to load the config from `$XDG_CONFIG_HOME/deskpager/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Headless shell

/// A shell with no panels and no fullscreen windows.
struct LoggingShell;

impl Shell for LoggingShell {
    fn hide_panels(&self) {
        info!("shell: hide panels");
    }

    fn show_panels(&self) {
        info!("shell: show panels");
    }

    fn in_fullscreen(&self) -> bool {
        false
    }

    fn set_cursor(&self, cursor: Cursor) {
        info!("shell: cursor {:?}", cursor);
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let mut desktop = Desktop::new(LoggingShell, &config);
    desktop
        .move_ended()
        .connect(|surface| info!("move ended for surface {}", surface.raw()));

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    info!("deskpager running");
    for cmd in cmd_rx {
        desktop.handle(cmd);
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::at_default_path();
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
