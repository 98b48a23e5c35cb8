//! Core value types: channel combinations and timed steps.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

/// Which of the red, amber and green channels are lit.
///
/// Backed by a 3-bit mask: bit 2 is red, bit 1 is amber, bit 0 is green.
/// Every value 0-7 is a valid state; anything else is rejected by
/// [`LightState::from_bits`] and the `TryFrom<u8>` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LightState {
    /// All channels dark.
    Off = 0b000,
    Green = 0b001,
    Amber = 0b010,
    AmberGreen = 0b011,
    Red = 0b100,
    RedGreen = 0b101,
    RedAmber = 0b110,
    /// All channels lit.
    All = 0b111,
}

const RED_BIT: u8 = 0b100;
const AMBER_BIT: u8 = 0b010;
const GREEN_BIT: u8 = 0b001;

impl LightState {
    /// Every state, in bit order.
    pub const ALL_STATES: [LightState; 8] = [
        LightState::Off,
        LightState::Green,
        LightState::Amber,
        LightState::AmberGreen,
        LightState::Red,
        LightState::RedGreen,
        LightState::RedAmber,
        LightState::All,
    ];

    /// The state shown when commands stop arriving.
    pub const CAUTION: LightState = LightState::Amber;

    /// Decodes a raw bit mask, returning `None` outside `0..=7`.
    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(LightState::Off),
            1 => Some(LightState::Green),
            2 => Some(LightState::Amber),
            3 => Some(LightState::AmberGreen),
            4 => Some(LightState::Red),
            5 => Some(LightState::RedGreen),
            6 => Some(LightState::RedAmber),
            7 => Some(LightState::All),
            _ => None,
        }
    }

    /// Builds a state from individual channel values.
    pub const fn from_channels(red: bool, amber: bool, green: bool) -> Self {
        let mut bits = 0;
        if red {
            bits |= RED_BIT;
        }
        if amber {
            bits |= AMBER_BIT;
        }
        if green {
            bits |= GREEN_BIT;
        }
        // Three bits always decode.
        match Self::from_bits(bits) {
            Some(state) => state,
            None => LightState::Off,
        }
    }

    /// Returns the raw bit mask.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn red(self) -> bool {
        self.bits() & RED_BIT != 0
    }

    #[inline]
    pub const fn amber(self) -> bool {
        self.bits() & AMBER_BIT != 0
    }

    #[inline]
    pub const fn green(self) -> bool {
        self.bits() & GREEN_BIT != 0
    }

    /// Channel values as `[red, amber, green]`.
    pub const fn channels(self) -> [bool; 3] {
        [self.red(), self.amber(), self.green()]
    }

    /// Kebab-case name, as used by `Display` and `FromStr`.
    pub const fn name(self) -> &'static str {
        match self {
            LightState::Off => "off",
            LightState::Green => "green",
            LightState::Amber => "amber",
            LightState::AmberGreen => "amber-green",
            LightState::Red => "red",
            LightState::RedGreen => "red-green",
            LightState::RedAmber => "red-amber",
            LightState::All => "all",
        }
    }
}

impl From<LightState> for u8 {
    fn from(lights: LightState) -> Self {
        lights.bits()
    }
}

/// A raw value outside the 3-bit light space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLightState(pub u8);

impl fmt::Display for InvalidLightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "light state {} is outside 0..=7", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidLightState {}

impl TryFrom<u8> for LightState {
    type Error = InvalidLightState;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        LightState::from_bits(bits).ok_or(InvalidLightState(bits))
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A string that names no light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseLightStateError;

impl fmt::Display for ParseLightStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected a light state name (e.g. red-amber) or a number in 0..=7"
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseLightStateError {}

impl FromStr for LightState {
    type Err = ParseLightStateError;

    /// Accepts a name in any case with `-` or `_` separators, or a decimal `0..=7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(bits) = s.parse::<u8>() {
            return LightState::from_bits(bits).ok_or(ParseLightStateError);
        }

        LightState::ALL_STATES
            .iter()
            .copied()
            .find(|state| names_match(state.name(), s))
            .ok_or(ParseLightStateError)
    }
}

/// Case-insensitive comparison treating `_` as `-`.
fn names_match(name: &str, input: &str) -> bool {
    name.len() == input.len()
        && name.bytes().zip(input.bytes()).all(|(n, i)| {
            let i = if i == b'_' { b'-' } else { i.to_ascii_lowercase() };
            n == i
        })
}

/// A single step of a timed sequence: show `lights`, then hold for `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedStep {
    /// Channels to light.
    pub lights: LightState,

    /// How long to hold before the next step.
    pub duration: Duration,
}

impl TimedStep {
    /// Creates a new timed step.
    #[inline]
    pub const fn new(lights: LightState, duration: Duration) -> Self {
        Self { lights, duration }
    }
}
