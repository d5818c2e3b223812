//! Integration tests for the light hysteresis controller

mod common;

use std::time::{Duration, Instant};

use aether_eye::core::{LightController, LightDecision};
use aether_eye::types::LightState;
use common::RecordingActuator;

fn at(t0: Instant, secs: f64) -> Instant {
    t0 + Duration::from_secs_f64(secs)
}

/// Dark at t=0 (adopted, no command), bright at t=0.5 (too soon),
/// still bright at t=2.1 (cooldown over, toggles off)
#[test]
fn test_toggle_waits_for_cooldown() {
    let hw = RecordingActuator::default();
    let mut light = LightController::new(Duration::from_secs(2));
    let t0 = Instant::now();

    assert_eq!(light.observe(true, true, t0, &hw), LightDecision::Initialized(true));
    assert_eq!(light.observe(false, true, at(t0, 0.5), &hw), LightDecision::CoolingDown);
    assert_eq!(light.observe(false, true, at(t0, 2.1), &hw), LightDecision::Toggled(false));

    assert_eq!(*hw.commands.lock().unwrap(), vec![false]);
    assert_eq!(light.light_state(), LightState::Off);
}

/// A reading that flips back before the cooldown ends causes no command
#[test]
fn test_flicker_inside_window_is_ignored() {
    let hw = RecordingActuator::default();
    let mut light = LightController::new(Duration::from_secs(2));
    let t0 = Instant::now();

    light.observe(true, true, t0, &hw);
    light.observe(false, true, at(t0, 0.5), &hw);
    assert_eq!(light.observe(true, true, at(t0, 2.1), &hw), LightDecision::Held);
    assert!(hw.commands.lock().unwrap().is_empty());
}

/// Auto mode off: readings are only tracked
#[test]
fn test_auto_off_never_commands() {
    let hw = RecordingActuator::default();
    let mut light = LightController::new(Duration::from_secs(2));
    let t0 = Instant::now();

    light.observe(true, false, t0, &hw);
    assert_eq!(light.observe(false, false, at(t0, 5.0), &hw), LightDecision::Held);
    assert!(hw.commands.lock().unwrap().is_empty());
    assert_eq!(light.state(), Some(true));
}

/// Failed command keeps the state and paces the retry
#[test]
fn test_failed_toggle_retries_after_cooldown() {
    let broken = RecordingActuator {
        fail: true,
        ..Default::default()
    };
    let mut light = LightController::new(Duration::from_secs(2));
    let t0 = Instant::now();

    light.observe(true, true, t0, &broken);
    assert_eq!(light.observe(false, true, at(t0, 2.5), &broken), LightDecision::Failed);
    assert_eq!(light.state(), Some(true));
    assert_eq!(light.observe(false, true, at(t0, 3.0), &broken), LightDecision::CoolingDown);

    let fixed = RecordingActuator::default();
    assert_eq!(light.observe(false, true, at(t0, 4.6), &fixed), LightDecision::Toggled(false));
}

/// Manual commands become the tracked state
#[test]
fn test_manual_command_recorded() {
    let hw = RecordingActuator::default();
    let mut light = LightController::new(Duration::from_secs(2));
    let t0 = Instant::now();

    light.record_manual(true, t0);
    assert_eq!(light.light_state(), LightState::On);
    // Dark room, light already on: nothing to do
    assert_eq!(light.observe(true, true, at(t0, 3.0), &hw), LightDecision::Held);
}
