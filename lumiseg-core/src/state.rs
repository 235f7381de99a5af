//! Refresh state machine
//!
//! The driver's lifecycle is a function of the current state and an event.
//! The machine is explicit, finite and deterministic; unknown
//! (state, event) pairs leave the state unchanged.
//!
//! ```text
//! Uninitialized ──Begin──▶ Initializing ──InitSucceeded──▶ Running ◀──Resume── Suspended
//!                               │                            │                    ▲
//!                               └──InitFailed──▶ Faulted     └──────Suspend───────┘
//! ```

/// Driver states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Constructed, nothing sent yet
    Uninitialized,
    /// Power-up command sequence in progress
    Initializing,
    /// Refreshing on every tick
    Running,
    /// Ticks ignored; buffer and intensity mode retained
    Suspended,
    /// Initialization failed; terminal for this instance
    Faulted(FaultKind),
}

/// Why the driver faulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Oscillator enable rejected by the bus
    OscillatorFailed,
    /// Display on / blink setup rejected by the bus
    DisplaySetupFailed,
    /// Initial brightness rejected by the bus
    BrightnessFailed,
}

/// Lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Start the power-up sequence
    Begin,
    /// Every power-up command was acknowledged
    InitSucceeded,
    /// A power-up command failed
    InitFailed(FaultKind),
    /// Host disabled the device
    Suspend,
    /// Host enabled the device again
    Resume,
}

impl State {
    /// Check if ticks should refresh the display
    pub fn refreshes(&self) -> bool {
        matches!(self, State::Running)
    }

    /// Check if this is the fault state
    pub fn is_faulted(&self) -> bool {
        matches!(self, State::Faulted(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (Uninitialized, Begin) => Initializing,

            (Initializing, InitSucceeded) => Running,
            (Initializing, InitFailed(kind)) => Faulted(kind),

            (Running, Suspend) => Suspended,
            (Suspended, Resume) => Running,

            // Faulted is terminal; everything else stays put
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_up_flow() {
        let state = State::Uninitialized.transition(Event::Begin);
        assert_eq!(state, State::Initializing);
        assert_eq!(state.transition(Event::InitSucceeded), State::Running);
    }

    #[test]
    fn test_init_failure_faults() {
        let state = State::Initializing.transition(Event::InitFailed(FaultKind::OscillatorFailed));
        assert_eq!(state, State::Faulted(FaultKind::OscillatorFailed));
        assert!(state.is_faulted());
    }

    #[test]
    fn test_faulted_is_terminal() {
        let faulted = State::Faulted(FaultKind::BrightnessFailed);
        for event in [
            Event::Begin,
            Event::InitSucceeded,
            Event::Resume,
            Event::Suspend,
            Event::InitFailed(FaultKind::OscillatorFailed),
        ] {
            assert_eq!(faulted.transition(event), faulted);
        }
    }

    #[test]
    fn test_suspend_resume() {
        let suspended = State::Running.transition(Event::Suspend);
        assert_eq!(suspended, State::Suspended);
        assert!(!suspended.refreshes());
        assert_eq!(suspended.transition(Event::Resume), State::Running);
    }

    #[test]
    fn test_suspend_before_running_is_ignored() {
        assert_eq!(
            State::Uninitialized.transition(Event::Suspend),
            State::Uninitialized
        );
        assert_eq!(
            State::Initializing.transition(Event::Suspend),
            State::Initializing
        );
    }

    #[test]
    fn test_only_running_refreshes() {
        assert!(State::Running.refreshes());
        assert!(!State::Uninitialized.refreshes());
        assert!(!State::Initializing.refreshes());
        assert!(!State::Faulted(FaultKind::DisplaySetupFailed).refreshes());
    }
}
