//! Wire format for network light commands.
//!
//! A command is a single datagram whose first byte is a [`LightState`] bit
//! mask. Trailing bytes are ignored. There is no framing, acknowledgment or
//! sequence number: the last valid datagram received wins.

use crate::types::LightState;

/// Receive buffer size; longer datagrams are truncated, which is harmless
/// since only the first byte is read.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Decodes a received datagram.
///
/// Returns `None` for an empty datagram or a first byte outside `0..=7`.
#[inline]
pub fn decode_command(datagram: &[u8]) -> Option<LightState> {
    datagram.first().copied().and_then(LightState::from_bits)
}

/// Encodes a command datagram.
#[inline]
pub fn encode_command(lights: LightState) -> [u8; 1] {
    [lights.bits()]
}
