//! Light hysteresis controller
//!
//! - first reading: adopt it as the actuator state, no command
//! - afterwards (auto mode): toggle only when the reading differs from the
//!   actuator state AND the switch cooldown has elapsed

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::core::cooldown::Cooldown;
use crate::core::ports::LightActuator;
use crate::error::Result;
use crate::types::LightState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightDecision {
    /// First reading since start; state adopted without a command
    Initialized(bool),
    /// Hardware command issued and accepted
    Toggled(bool),
    /// Reading matches the actuator, or auto mode is off
    Held,
    /// Reading differs but the last toggle is too recent
    CoolingDown,
    /// Command failed; state unchanged, retry after the cooldown
    Failed,
}

/// Outcome of `LightController::decide`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightStep {
    /// Nothing to send to the hardware
    Done(LightDecision),
    /// Send this state, then `commit` the result
    Switch(bool),
}

#[derive(Debug)]
pub struct LightController {
    /// Last known actuator state, `None` until the first reading
    state: Option<bool>,
    toggle: Cooldown,
}

impl LightController {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: None,
            toggle: Cooldown::new(cooldown),
        }
    }

    pub fn state(&self) -> Option<bool> {
        self.state
    }

    pub fn light_state(&self) -> LightState {
        LightState::from(self.state)
    }

    /// Feed one "needs light" reading, calling the actuator inline.
    /// Callers sharing the controller behind a lock use `decide` and
    /// `commit` instead so the lock is not held across the command.
    pub fn observe(
        &mut self,
        needs_light: bool,
        auto_enabled: bool,
        now: Instant,
        actuator: &dyn LightActuator,
    ) -> LightDecision {
        match self.decide(needs_light, auto_enabled, now) {
            LightStep::Done(decision) => decision,
            LightStep::Switch(on) => {
                let result = actuator.set_light(on);
                self.commit(on, result, now)
            }
        }
    }

    /// First half of `observe`: everything except the hardware command
    pub fn decide(&mut self, needs_light: bool, auto_enabled: bool, now: Instant) -> LightStep {
        let current = match self.state {
            None => {
                self.state = Some(needs_light);
                self.toggle.mark(now);
                return LightStep::Done(LightDecision::Initialized(needs_light));
            }
            Some(current) => current,
        };

        if !auto_enabled || needs_light == current {
            return LightStep::Done(LightDecision::Held);
        }
        if !self.toggle.is_ready(now) {
            return LightStep::Done(LightDecision::CoolingDown);
        }
        LightStep::Switch(needs_light)
    }

    /// Second half of `observe`: apply the outcome of a `Switch` command
    pub fn commit(&mut self, on: bool, result: Result<()>, now: Instant) -> LightDecision {
        self.toggle.mark(now);
        match result {
            Ok(()) => {
                info!(on, "💡 auto light toggled");
                self.state = Some(on);
                LightDecision::Toggled(on)
            }
            Err(e) => {
                warn!(error = %e, "auto light toggle failed");
                LightDecision::Failed
            }
        }
    }

    /// Record a successful manual command so auto mode compares against it
    pub fn record_manual(&mut self, on: bool, now: Instant) {
        self.state = Some(on);
        self.toggle.mark(now);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SentryError;
    use std::sync::Mutex;

    /// Actuator that records commands and can be told to fail
    #[derive(Default)]
    pub struct RecordingActuator {
        pub commands: Mutex<Vec<bool>>,
        pub fail: bool,
    }

    impl LightActuator for RecordingActuator {
        fn set_light(&self, on: bool) -> Result<()> {
            if self.fail {
                return Err(SentryError::ActuatorUnreachable("test".into()));
            }
            self.commands.lock().unwrap().push(on);
            Ok(())
        }
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_first_reading_initialises_without_command() {
        let hw = RecordingActuator::default();
        let mut light = LightController::new(secs(2.0));
        let d = light.observe(true, true, Instant::now(), &hw);

        assert_eq!(d, LightDecision::Initialized(true));
        assert_eq!(light.state(), Some(true));
        assert!(hw.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_flip_inside_cooldown_is_held_back() {
        let t0 = Instant::now();
        let hw = RecordingActuator::default();
        let mut light = LightController::new(secs(2.0));

        assert_eq!(light.observe(true, true, t0, &hw), LightDecision::Initialized(true));
        assert_eq!(light.observe(false, true, t0 + secs(0.5), &hw), LightDecision::CoolingDown);
        assert_eq!(light.observe(false, true, t0 + secs(2.1), &hw), LightDecision::Toggled(false));
        assert_eq!(*hw.commands.lock().unwrap(), vec![false]);
    }

    #[test]
    fn test_flapping_reading_toggles_once_per_window() {
        let t0 = Instant::now();
        let hw = RecordingActuator::default();
        let mut light = LightController::new(secs(2.0));

        let mut toggles = Vec::new();
        for step in 0..40 {
            let now = t0 + secs(step as f64 * 0.25);
            if let LightDecision::Toggled(_) = light.observe(step % 2 == 0, true, now, &hw) {
                toggles.push(now);
            }
        }
        assert!(!toggles.is_empty());
        for pair in toggles.windows(2) {
            assert!(pair[1] - pair[0] >= secs(2.0));
        }
    }

    #[test]
    fn test_auto_off_never_commands() {
        let t0 = Instant::now();
        let hw = RecordingActuator::default();
        let mut light = LightController::new(secs(2.0));
        light.observe(false, false, t0, &hw);
        assert_eq!(light.observe(true, false, t0 + secs(10.0), &hw), LightDecision::Held);
        assert!(hw.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_command_keeps_state() {
        let t0 = Instant::now();
        let hw = RecordingActuator { fail: true, ..Default::default() };
        let mut light = LightController::new(secs(2.0));
        light.observe(false, true, t0, &hw);

        assert_eq!(light.observe(true, true, t0 + secs(3.0), &hw), LightDecision::Failed);
        assert_eq!(light.state(), Some(false));
        assert_eq!(light.observe(true, true, t0 + secs(3.5), &hw), LightDecision::CoolingDown);
    }

    #[test]
    fn test_decide_then_commit_splits_the_command() {
        let t0 = Instant::now();
        let mut light = LightController::new(secs(2.0));
        assert_eq!(light.decide(false, true, t0), LightStep::Done(LightDecision::Initialized(false)));

        assert_eq!(light.decide(true, true, t0 + secs(3.0)), LightStep::Switch(true));
        // nothing changes until the result is committed
        assert_eq!(light.state(), Some(false));

        let failed = light.commit(true, Err(SentryError::ActuatorUnreachable("down".into())), t0 + secs(3.0));
        assert_eq!(failed, LightDecision::Failed);
        assert_eq!(light.decide(true, true, t0 + secs(4.0)), LightStep::Done(LightDecision::CoolingDown));

        assert_eq!(light.decide(true, true, t0 + secs(5.5)), LightStep::Switch(true));
        assert_eq!(light.commit(true, Ok(()), t0 + secs(5.5)), LightDecision::Toggled(true));
        assert_eq!(light.state(), Some(true));
    }
}
