//! Sends light commands to a traffic light's UDP watchdog.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use traffic_light_modes::LightState;
use traffic_light_modes::command::encode_command;
use traffic_light_modes::config::DEFAULT_UDP_PORT;

#[derive(Parser)]
#[command(name = "traffic-light-send")]
#[command(about = "Send a light command to a traffic light")]
#[command(version)]
struct Cli {
    /// Traffic light command address
    #[arg(short, long, default_value_t = SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_UDP_PORT)))]
    target: SocketAddr,

    /// State to show: a name such as `red-amber`, or a number 0-7
    state: LightState,

    /// Resend every N milliseconds until interrupted
    #[arg(long)]
    repeat_ms: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let local: SocketAddr = if cli.target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = match UdpSocket::bind(local) {
        Ok(socket) => socket,
        Err(err) => {
            error!(%err, "failed to open socket");
            return ExitCode::FAILURE;
        }
    };

    let datagram = encode_command(cli.state);

    loop {
        if let Err(err) = socket.send_to(&datagram, cli.target) {
            error!(%err, addr = %cli.target, "failed to send command");
            return ExitCode::FAILURE;
        }
        info!(addr = %cli.target, state = %cli.state, "command sent");

        match cli.repeat_ms {
            Some(ms) => thread::sleep(Duration::from_millis(ms)),
            None => return ExitCode::SUCCESS,
        }
    }
}
