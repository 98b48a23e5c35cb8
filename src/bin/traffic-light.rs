//! Runs the standard mode cycle with a logging light output.
//!
//! Each line read from stdin counts as one button press. When stdin closes
//! the current mode keeps running until the process is terminated.

use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use traffic_light_modes::config::{DEFAULT_UPDATE_TIMEOUT, WatchdogConfig, default_controller};
use traffic_light_modes::{LightOutput, LightState};

#[derive(Parser)]
#[command(name = "traffic-light")]
#[command(about = "Button-cycled traffic light modes with a UDP watchdog")]
#[command(version)]
struct Cli {
    /// Address the UDP command socket binds to
    #[arg(long, default_value_t = WatchdogConfig::default().bind_addr)]
    bind: SocketAddr,

    /// Seconds of command silence before falling back to amber
    #[arg(long, default_value_t = DEFAULT_UPDATE_TIMEOUT.as_secs_f64())]
    timeout_secs: f64,
}

/// Logs every update instead of driving pins.
struct ConsoleLight;

impl LightOutput for ConsoleLight {
    fn set(&self, lights: LightState) {
        info!(
            red = lights.red(),
            amber = lights.amber(),
            green = lights.green(),
            "lights: {}",
            lights
        );
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let update_timeout = match Duration::try_from_secs_f64(cli.timeout_secs) {
        Ok(timeout) if !timeout.is_zero() => timeout,
        _ => {
            error!(
                timeout_secs = cli.timeout_secs,
                "update timeout must be a positive number of seconds"
            );
            return ExitCode::FAILURE;
        }
    };

    let config = WatchdogConfig {
        bind_addr: cli.bind,
        update_timeout,
    };

    let mut controller = match default_controller(Arc::new(ConsoleLight), &config) {
        Ok(controller) => controller,
        Err(err) => {
            error!(%err, "cannot start traffic light");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = controller.start() {
        error!(%err, "cannot start mode controller");
        return ExitCode::FAILURE;
    }

    info!(modes = controller.mode_count(), "press Enter to switch mode");

    for line in io::stdin().lock().lines() {
        if let Err(err) = line {
            warn!(%err, "failed to read button input");
            break;
        }

        match controller.advance() {
            Ok(index) => info!(index, kind = controller.current_mode().kind(), "mode switched"),
            Err(err) => warn!(%err, "mode switch rejected"),
        }
    }

    info!("button input closed; keeping current mode");
    loop {
        thread::park();
    }
}
