// This file is part of gnome-firmware, an application to manage device firmware through the fwupd daemon.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// gnome-firmware is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// gnome-firmware is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! gnome-firmware - terminal client for the fwupd firmware daemon.
//!
//! Connects to `org.freedesktop.fwupd` on the system DBus, lists the devices it manages and
//! reads commands from standard input. Type `help` at the prompt for the list of commands.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level. Defaults to `warn`, or `debug` with `--verbose`
//! - `XDG_CACHE_HOME`, `HOME` - Location of the download cache
//! - `https_proxy`, `http_proxy` - Proxy used for downloads

use clap::Parser;
use gnome_firmware::client::FwupdClient;
use gnome_firmware::config::{APP_NAME, AppConfig};
use gnome_firmware::frontend::{Frontend, TerminalFrontend};
use gnome_firmware::main_window::MainWindow;
use gnome_firmware::system_control::SystemPower;
use log::{debug, info};
use std::error::Error;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "gnome-firmware")]
#[command(bin_name = "gnome-firmware")]
#[command(version, about = "Install firmware on devices")]
struct Cli {
    /// Show extra debugging information
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cancel: CancellationToken) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    debug!("using cache directory {:?}", config.cache_dir);

    let client = match FwupdClient::connect().await {
        Ok(client) => client,
        Err(e) => {
            TerminalFrontend::stdio().show_error("Error connecting to fwupd", Some(&e.to_string()));
            return Err(e.into());
        }
    };
    match client.daemon_version().await {
        Ok(version) => info!("connected to fwupd {version}"),
        Err(e) => debug!("ignoring: {e}"),
    }

    let events = client.subscribe(cancel.clone()).await?;
    let power = SystemPower::new(client.connection().clone());
    let mut window = MainWindow::new(
        client,
        TerminalFrontend::stdio(),
        power,
        config,
        events,
        cancel,
    );
    window.run().await?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    debug!("parsed cli command with {cli:?}");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let cancel = CancellationToken::new();
    runtime.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("{APP_NAME} interrupted");
                on_interrupt.cancel();
            }
        });
        run(cancel).await
    })
}
