//! Integration tests for LightState

use traffic_light_modes::{InvalidLightState, LightState, ParseLightStateError};

#[test]
fn every_value_in_range_round_trips() {
    for v in 0u8..=7 {
        let state = LightState::try_from(v).unwrap();
        assert_eq!(u8::from(state), v);
        assert_eq!(LightState::from_bits(v), Some(state));
    }
}

#[test]
fn values_outside_range_are_rejected() {
    for v in 8u8..=255 {
        assert_eq!(LightState::from_bits(v), None);
        assert_eq!(LightState::try_from(v), Err(InvalidLightState(v)));
    }
}

#[test]
fn channels_follow_bit_layout() {
    for v in 0u8..=7 {
        let state = LightState::from_bits(v).unwrap();
        assert_eq!(state.red(), v & 0b100 != 0);
        assert_eq!(state.amber(), v & 0b010 != 0);
        assert_eq!(state.green(), v & 0b001 != 0);
    }
}

#[test]
fn named_values_match_bit_masks() {
    assert_eq!(LightState::Off.bits(), 0);
    assert_eq!(LightState::Green.bits(), 1);
    assert_eq!(LightState::Amber.bits(), 2);
    assert_eq!(LightState::AmberGreen.bits(), 3);
    assert_eq!(LightState::Red.bits(), 4);
    assert_eq!(LightState::RedGreen.bits(), 5);
    assert_eq!(LightState::RedAmber.bits(), 6);
    assert_eq!(LightState::All.bits(), 7);
}

#[test]
fn parses_names_and_numbers() {
    assert_eq!("red-amber".parse::<LightState>(), Ok(LightState::RedAmber));
    assert_eq!("RED_GREEN".parse::<LightState>(), Ok(LightState::RedGreen));
    assert_eq!(" off ".parse::<LightState>(), Ok(LightState::Off));
    assert_eq!("5".parse::<LightState>(), Ok(LightState::RedGreen));
    assert_eq!("8".parse::<LightState>(), Err(ParseLightStateError));
    assert_eq!("blue".parse::<LightState>(), Err(ParseLightStateError));
}

#[test]
fn display_uses_parseable_names() {
    for state in LightState::ALL_STATES {
        assert_eq!(state.to_string().parse::<LightState>(), Ok(state));
    }
    assert_eq!(LightState::AmberGreen.to_string(), "amber-green");
}

#[test]
fn error_messages_format_correctly_for_display() {
    assert_eq!(
        InvalidLightState(9).to_string(),
        "light state 9 is outside 0..=7"
    );
    assert!(ParseLightStateError.to_string().contains("0..=7"));
}
