//! Network-driven light control with a silence fallback.
//!
//! [`NetworkWatchdog`] owns a bound UDP socket and two worker threads that
//! run until the process exits:
//!
//! - the **receiver** decodes each datagram (see [`crate::command`]), stores
//!   valid states as the last-known state and raises the "updated" signal.
//!   It keeps running while the mode is inactive, so re-entering shows the
//!   most recent command at once.
//! - the **timeout monitor** waits for "updated" with a bounded window. If the
//!   window elapses it forces the caution state, then waits without a bound
//!   for the next update. The fallback therefore fires at most once per
//!   silence period.
//!
//! Updates to the last-known state always happen; writes to the output only
//! happen while the mode is active.
//!
//! A command and its "updated" signal are recorded under the state lock, and
//! the monitor checks the signal under that same lock before falling back. A
//! command that lands just as the window expires is never replaced by the
//! caution state.
//!
//! Receive errors are logged and retried after [`RECEIVE_RETRY_DELAY`].

use std::fmt;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::command::{MAX_DATAGRAM_SIZE, decode_command};
use crate::config::WatchdogConfig;
use crate::mode::Mode;
use crate::output::LightOutput;
use crate::types::LightState;

/// Pause after a failed receive before the socket is polled again.
pub const RECEIVE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Errors that can occur while creating a watchdog.
#[derive(Debug)]
pub enum WatchdogError {
    /// The command socket could not be bound.
    Bind { addr: SocketAddr, source: io::Error },

    /// A worker thread could not be started.
    Spawn(io::Error),

    /// The silence window is zero, so every command would be replaced at once.
    ZeroTimeout,
}

impl fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchdogError::Bind { addr, source } => {
                write!(f, "failed to bind command socket on {}: {}", addr, source)
            }
            WatchdogError::Spawn(err) => write!(f, "failed to spawn watchdog worker: {}", err),
            WatchdogError::ZeroTimeout => write!(f, "update timeout must be non-zero"),
        }
    }
}

impl std::error::Error for WatchdogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WatchdogError::Bind { source, .. } => Some(source),
            WatchdogError::Spawn(err) => Some(err),
            WatchdogError::ZeroTimeout => None,
        }
    }
}

/// A consumable wake-up flag.
#[derive(Debug, Default)]
struct UpdateSignal {
    raised: Mutex<bool>,
    cond: Condvar,
}

impl UpdateSignal {
    fn raise(&self) {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cond.notify_all();
    }

    fn is_raised(&self) -> bool {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits up to `timeout`. Returns true and clears the flag if it was raised.
    fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut raised, _) = self
            .cond
            .wait_timeout_while(guard, timeout, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *raised)
    }

    /// Waits without a bound and clears the flag.
    fn wait(&self) {
        let guard = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        let mut raised = self
            .cond
            .wait_while(guard, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);
        *raised = false;
    }
}

#[derive(Debug)]
struct WatchdogState {
    lights: LightState,
    active: bool,
}

struct Shared<O> {
    state: Mutex<WatchdogState>,
    updated: UpdateSignal,
    output: Arc<O>,
}

impl<O: LightOutput> Shared<O> {
    fn lock(&self) -> MutexGuard<'_, WatchdogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `lights` and shows it if the mode is active.
    fn apply(state: &mut WatchdogState, output: &O, lights: LightState) {
        state.lights = lights;
        if state.active {
            output.set(lights);
        }
    }

    /// Applies a received command and raises the update signal.
    fn command(&self, lights: LightState) {
        let mut state = self.lock();
        Self::apply(&mut state, &self.output, lights);
        self.updated.raise();
    }

    /// Forces the caution state unless a command arrived since the window
    /// expired. Returns true if the fallback was applied.
    fn fall_back(&self) -> bool {
        let mut state = self.lock();
        if self.updated.is_raised() {
            return false;
        }
        Self::apply(&mut state, &self.output, LightState::CAUTION);
        true
    }
}

/// Shows light states received over UDP, falling back to caution on silence.
pub struct NetworkWatchdog<O> {
    shared: Arc<Shared<O>>,
    local_addr: SocketAddr,
    update_timeout: Duration,
}

impl<O> NetworkWatchdog<O>
where
    O: LightOutput + Send + Sync + 'static,
{
    /// Binds the command socket and spawns the receiver and timeout monitor.
    ///
    /// The last-known state starts as [`LightState::CAUTION`] and the mode
    /// starts inactive.
    ///
    /// # Errors
    /// * `ZeroTimeout` - `update_timeout` is zero
    /// * `Bind` - The socket could not be bound; there is no retry
    /// * `Spawn` - A worker thread could not be created
    pub fn bind(config: &WatchdogConfig, output: Arc<O>) -> Result<Self, WatchdogError> {
        if config.update_timeout.is_zero() {
            return Err(WatchdogError::ZeroTimeout);
        }

        let addr = config.bind_addr;
        let socket = UdpSocket::bind(addr).map_err(|source| WatchdogError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| WatchdogError::Bind { addr, source })?;

        let shared = Arc::new(Shared {
            state: Mutex::new(WatchdogState {
                lights: LightState::CAUTION,
                active: false,
            }),
            updated: UpdateSignal::default(),
            output,
        });

        let receiver_shared = Arc::clone(&shared);
        thread::Builder::new()
            .name("watchdog-receiver".into())
            .spawn(move || run_receiver(&socket, &receiver_shared))
            .map_err(WatchdogError::Spawn)?;

        let monitor_shared = Arc::clone(&shared);
        let update_timeout = config.update_timeout;
        thread::Builder::new()
            .name("watchdog-monitor".into())
            .spawn(move || run_monitor(&monitor_shared, update_timeout))
            .map_err(WatchdogError::Spawn)?;

        info!(%local_addr, timeout = ?update_timeout, "listening for light commands");

        Ok(Self {
            shared,
            local_addr,
            update_timeout,
        })
    }
}

impl<O: LightOutput> NetworkWatchdog<O> {
    /// The address the command socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn update_timeout(&self) -> Duration {
        self.update_timeout
    }

    /// Last-known state, updated whether or not the mode is active.
    pub fn lights(&self) -> LightState {
        self.shared.lock().lights
    }

    /// Returns true between `enter` and `exit`.
    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }
}

impl<O: LightOutput> Mode for NetworkWatchdog<O> {
    fn enter(&mut self) {
        // Same lock as incoming commands, so a concurrent update cannot be overwritten
        // by a stale push.
        let mut state = self.shared.lock();
        debug!(lights = %state.lights, "watchdog mode entered");
        self.shared.output.set(state.lights);
        state.active = true;
    }

    fn exit(&mut self) {
        debug!("watchdog mode exited");
        self.shared.lock().active = false;
    }
}

/// Receives and handles one datagram.
fn receive<O: LightOutput>(
    socket: &UdpSocket,
    shared: &Shared<O>,
    buf: &mut [u8; MAX_DATAGRAM_SIZE],
) -> io::Result<()> {
    let (len, peer) = socket.recv_from(buf)?;
    match decode_command(&buf[..len]) {
        Some(lights) => {
            trace!(%peer, %lights, "light command received");
            shared.command(lights);
        }
        None => {
            debug!(%peer, len, first = ?buf[..len].first(), "ignoring invalid datagram");
        }
    }
    Ok(())
}

fn run_receiver<O: LightOutput>(socket: &UdpSocket, shared: &Shared<O>) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    loop {
        if let Err(err) = receive(socket, shared, &mut buf) {
            warn!(%err, "command socket receive failed");
            thread::sleep(RECEIVE_RETRY_DELAY);
        }
    }
}

fn run_monitor<O: LightOutput>(shared: &Shared<O>, update_timeout: Duration) {
    loop {
        if shared.updated.wait_timeout(update_timeout) {
            continue;
        }

        if !shared.fall_back() {
            trace!("command arrived as the window expired; fallback skipped");
            continue;
        }
        warn!(timeout = ?update_timeout, "no light command received; falling back to caution");
        shared.updated.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[derive(Default)]
    struct Recorder {
        history: Mutex<Vec<LightState>>,
    }

    impl LightOutput for Recorder {
        fn set(&self, lights: LightState) {
            self.history.lock().unwrap().push(lights);
        }
    }

    fn shared(active: bool) -> Shared<Recorder> {
        Shared {
            state: Mutex::new(WatchdogState {
                lights: LightState::CAUTION,
                active,
            }),
            updated: UpdateSignal::default(),
            output: Arc::new(Recorder::default()),
        }
    }

    #[test]
    fn fallback_yields_to_pending_command() {
        let shared = shared(true);

        shared.command(LightState::Red);
        assert!(!shared.fall_back());
        assert_eq!(shared.lock().lights, LightState::Red);
        assert_eq!(*shared.output.history.lock().unwrap(), [LightState::Red]);

        // The monitor consumes the signal on its next wait.
        assert!(shared.updated.wait_timeout(Duration::from_millis(10)));
        assert!(shared.fall_back());
        assert_eq!(shared.lock().lights, LightState::CAUTION);
        assert_eq!(
            *shared.output.history.lock().unwrap(),
            [LightState::Red, LightState::CAUTION]
        );
    }

    #[test]
    fn fallback_while_inactive_only_records() {
        let shared = shared(false);

        shared.command(LightState::Green);
        assert!(shared.updated.wait_timeout(Duration::from_millis(10)));
        assert!(shared.fall_back());
        assert_eq!(shared.lock().lights, LightState::CAUTION);
        assert!(shared.output.history.lock().unwrap().is_empty());
    }

    #[test]
    fn receive_reports_socket_errors() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_nonblocking(true).unwrap();
        let shared = shared(true);
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        let err = receive(&socket, &shared, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert_eq!(shared.lock().lights, LightState::CAUTION);
    }

    #[test]
    fn receiver_backs_off_and_recovers_after_errors() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_nonblocking(true).unwrap();
        let addr = socket.local_addr().unwrap();
        let shared = Arc::new(shared(true));

        let worker = Arc::clone(&shared);
        thread::spawn(move || run_receiver(&socket, &worker));

        let started = Instant::now();
        thread::sleep(Duration::from_millis(50));
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(&[0x04], addr).unwrap();

        // The first receive failed with no data queued, so the datagram is
        // picked up only after the retry delay.
        while shared.lock().lights != LightState::Red {
            assert!(started.elapsed() < Duration::from_secs(2));
            thread::sleep(Duration::from_millis(5));
        }
        assert!(started.elapsed() >= RECEIVE_RETRY_DELAY);
    }
}
