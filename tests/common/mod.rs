//! Shared test infrastructure for traffic-light-modes integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use traffic_light_modes::{LightOutput, LightState, Mode};

// ============================================================================
// Recording Output
// ============================================================================

/// Output that records every `set` call in order
#[derive(Default)]
pub struct RecordingOutput {
    history: Mutex<Vec<LightState>>,
}

impl RecordingOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn history(&self) -> Vec<LightState> {
        self.history.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.history.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<LightState> {
        self.history.lock().unwrap().last().copied()
    }
}

impl LightOutput for RecordingOutput {
    fn set(&self, lights: LightState) {
        self.history.lock().unwrap().push(lights);
    }
}

// ============================================================================
// Recording Mode
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    Enter(usize),
    Exit(usize),
}

/// Mode that appends its enter/exit calls to a shared log
pub struct RecordingMode {
    id: usize,
    log: Arc<Mutex<Vec<ModeEvent>>>,
}

impl RecordingMode {
    /// Creates `n` modes with ids `0..n` sharing one log
    pub fn set(n: usize) -> (Vec<RecordingMode>, Arc<Mutex<Vec<ModeEvent>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let modes = (0..n)
            .map(|id| RecordingMode {
                id,
                log: Arc::clone(&log),
            })
            .collect();
        (modes, log)
    }
}

impl Mode for RecordingMode {
    fn enter(&mut self) {
        self.log.lock().unwrap().push(ModeEvent::Enter(self.id));
    }

    fn exit(&mut self) {
        self.log.lock().unwrap().push(ModeEvent::Exit(self.id));
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Polls `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// Sends raw bytes to `target` from an ephemeral local socket
pub fn send_datagram(target: SocketAddr, bytes: &[u8]) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.send_to(bytes, target).unwrap();
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
