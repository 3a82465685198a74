//! Submission state machine for a prediction view.
//!
//! At most one prediction request may be in flight per view. The submit
//! control is disabled while the state is `Submitting`.

/// In-flight state for prediction submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
}

impl SubmitState {
    /// True if a new submission can be started.
    pub fn can_submit(self) -> bool {
        matches!(self, SubmitState::Idle)
    }

    /// Try to start a submission. Returns the new state, or `None` if one is
    /// already in flight.
    pub fn begin(self) -> Option<Self> {
        if self.can_submit() {
            Some(SubmitState::Submitting)
        } else {
            None
        }
    }

    /// State after the in-flight submission settled (success or failure).
    pub fn on_settled(self) -> Self {
        SubmitState::Idle
    }

    /// Enter `Submitting` for as long as the returned guard lives.
    ///
    /// The state settles when the guard drops, so a submission whose future
    /// is dropped mid-flight still releases the view.
    pub fn enter(&mut self) -> Option<InFlight<'_>> {
        *self = self.begin()?;
        Some(InFlight { state: self })
    }
}

/// Marks one submission in flight; settles the state on drop.
#[derive(Debug)]
pub struct InFlight<'a> {
    state: &'a mut SubmitState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.state = self.state.on_settled();
    }
}
