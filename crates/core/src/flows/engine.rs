use thiserror::Error;

use crate::flows::states::{FlowAction, SessionEvent, SessionMode, TransitionOutcome};

/// Transition table for a booking session. `Prose` lasts for one reply and
/// then falls back to `Normal`; a closed session stays closed until it is
/// discarded.
#[derive(Clone, Debug, Default)]
pub struct SessionFlow;

impl SessionFlow {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_mode(&self) -> SessionMode {
        SessionMode::Normal
    }

    pub fn apply(
        &self,
        current: &SessionMode,
        event: &SessionEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        use FlowAction::{InjectBookingFailedDirective, MarkTransactionDone};
        use SessionEvent::{BookingAbandoned, BookingConcluded, ProseReplyDelivered};
        use SessionMode::{Closed, Normal, Prose};

        let (to, actions) = match (current, event) {
            (Normal, BookingAbandoned) => (Prose, vec![InjectBookingFailedDirective]),
            (Normal, BookingConcluded) => (Closed, vec![MarkTransactionDone]),
            (Prose, ProseReplyDelivered) => (Normal, Vec::new()),
            (Normal, ProseReplyDelivered)
            | (Prose, BookingAbandoned | BookingConcluded)
            | (Closed, _) => {
                return Err(FlowTransitionError::InvalidTransition {
                    state: *current,
                    event: *event,
                });
            }
        };

        Ok(TransitionOutcome { from: *current, to, event: *event, actions })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid session transition from {state:?} using event {event:?}")]
    InvalidTransition { state: SessionMode, event: SessionEvent },
}
