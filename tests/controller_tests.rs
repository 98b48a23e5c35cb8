//! Integration tests for ModeController

mod common;
use common::*;

use std::sync::Arc;

use traffic_light_modes::{ControllerError, FixedMode, LightState, Mode, ModeController};

#[test]
fn advance_requires_start() {
    let (modes, log) = RecordingMode::set(2);
    let mut controller = ModeController::<_, 4>::new(modes).unwrap();

    assert_eq!(controller.advance(), Err(ControllerError::NotStarted));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn start_twice_is_rejected() {
    let (modes, log) = RecordingMode::set(2);
    let mut controller = ModeController::<_, 4>::new(modes).unwrap();

    controller.start().unwrap();
    assert_eq!(controller.start(), Err(ControllerError::AlreadyStarted));
    assert_eq!(*log.lock().unwrap(), vec![ModeEvent::Enter(0)]);
}

#[test]
fn n_advances_visit_every_mode_once_and_return_to_first() {
    const N: usize = 5;
    let (modes, log) = RecordingMode::set(N);
    let mut controller = ModeController::<_, 8>::new(modes).unwrap();

    controller.start().unwrap();
    assert_eq!(controller.current_index(), 0);

    let mut visited = Vec::new();
    for _ in 0..N {
        visited.push(controller.advance().unwrap());
    }

    assert_eq!(visited, vec![1, 2, 3, 4, 0]);
    assert_eq!(controller.current_index(), 0);

    let entered: Vec<usize> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            ModeEvent::Enter(id) => Some(*id),
            ModeEvent::Exit(_) => None,
        })
        .collect();
    assert_eq!(entered, vec![0, 1, 2, 3, 4, 0]);
}

#[test]
fn outgoing_exit_precedes_incoming_enter() {
    let (modes, log) = RecordingMode::set(3);
    let mut controller = ModeController::<_, 3>::new(modes).unwrap();

    controller.start().unwrap();
    controller.advance().unwrap();
    controller.advance().unwrap();
    controller.advance().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ModeEvent::Enter(0),
            ModeEvent::Exit(0),
            ModeEvent::Enter(1),
            ModeEvent::Exit(1),
            ModeEvent::Enter(2),
            ModeEvent::Exit(2),
            ModeEvent::Enter(0),
        ]
    );
}

#[test]
fn exactly_one_mode_active_after_each_transition() {
    let (modes, log) = RecordingMode::set(4);
    let mut controller = ModeController::<_, 4>::new(modes).unwrap();

    controller.start().unwrap();
    for _ in 0..9 {
        controller.advance().unwrap();

        let mut active = [0i32; 4];
        for event in log.lock().unwrap().iter() {
            match event {
                ModeEvent::Enter(id) => active[*id] += 1,
                ModeEvent::Exit(id) => active[*id] -= 1,
            }
        }
        assert_eq!(active.iter().sum::<i32>(), 1);
        assert_eq!(active[controller.current_index()], 1);
    }
}

#[test]
fn fixed_modes_alternate_output() {
    let output = RecordingOutput::new();
    let modes = [
        FixedMode::new(Arc::clone(&output), LightState::All),
        FixedMode::new(Arc::clone(&output), LightState::Off),
    ];
    let mut controller = ModeController::<_, 2>::new(modes).unwrap();

    controller.start().unwrap();
    assert_eq!(output.last(), Some(LightState::All));

    controller.advance().unwrap();
    assert_eq!(output.last(), Some(LightState::Off));

    controller.advance().unwrap();
    assert_eq!(output.last(), Some(LightState::All));

    assert_eq!(
        output.history(),
        vec![LightState::All, LightState::Off, LightState::All]
    );
}

#[test]
fn fixed_mode_enter_is_idempotent() {
    let output = RecordingOutput::new();
    let mut mode = FixedMode::new(Arc::clone(&output), LightState::RedAmber);

    mode.enter();
    let once = output.last();
    mode.enter();

    assert_eq!(output.last(), once);
    assert!(output.history().iter().all(|l| *l == LightState::RedAmber));

    mode.exit();
    assert_eq!(output.calls(), 2);
}

#[test]
fn boxed_modes_share_one_controller() {
    let output = RecordingOutput::new();
    let (recording, log) = RecordingMode::set(1);
    let mut modes: Vec<Box<dyn Mode>> = Vec::new();
    modes.push(Box::new(FixedMode::new(Arc::clone(&output), LightState::Green)));
    for mode in recording {
        modes.push(Box::new(mode));
    }

    let mut controller = ModeController::<_, 4>::new(modes).unwrap();
    controller.start().unwrap();
    controller.advance().unwrap();

    assert_eq!(output.history(), vec![LightState::Green]);
    assert_eq!(*log.lock().unwrap(), vec![ModeEvent::Enter(0)]);
    assert_eq!(controller.mode_count(), 2);
}

#[test]
fn error_messages_format_correctly_for_display() {
    assert_eq!(
        ControllerError::CapacityExceeded { capacity: 8 }.to_string(),
        "mode list exceeds controller capacity of 8"
    );
    assert_eq!(
        ControllerError::NotStarted.to_string(),
        "controller has not been started"
    );
}
