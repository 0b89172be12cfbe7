use serde::{Deserialize, Serialize};

/// Where a session stands with respect to its single booking transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// The model is asked for structured actions.
    #[default]
    Normal,
    /// A booking was attempted without a usable flight id. The next reply is
    /// prose, after which the session goes back to `Normal`.
    Prose,
    /// A booking attempt resolved. Every later turn gets the closing directive.
    Closed,
}

impl SessionMode {
    pub fn uses_natural_language(&self) -> bool {
        !matches!(self, Self::Normal)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Booking requested but no flight id survived validation.
    BookingAbandoned,
    /// Booking reached the catalog or was rejected as an unknown id.
    BookingConcluded,
    /// The one prose reply owed after an abandoned booking went out.
    ProseReplyDelivered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    InjectBookingFailedDirective,
    MarkTransactionDone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: SessionMode,
    pub to: SessionMode,
    pub event: SessionEvent,
    pub actions: Vec<FlowAction>,
}
