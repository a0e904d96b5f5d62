use evx_models::Seat;

use crate::selection::{SelectOutcome, Selection};

/// Validation message when submit is attempted with no seat chosen.
pub const NO_SEAT_SELECTED: &str = "Please select a seat.";

/// What `submit` asks the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submit {
    /// Perform the booking call with these parameters, then report the
    /// outcome through `resolve_success` / `resolve_failure`.
    Dispatch {
        event_id: String,
        seat_number: String,
    },
    /// Local validation failed; nothing was sent.
    Invalid(&'static str),
    /// A request is already outstanding; duplicate submits are dropped.
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    Confirmed,
    Failed(String),
}

/// The booking submission state machine for one event.
///
/// IO-free: `submit` hands the caller a `Dispatch` to perform and the machine
/// stays `Pending` until the result is fed back in. On failure the selection
/// is kept so the user can pick a different seat and retry explicitly; there
/// is no automatic retry.
#[derive(Debug, Default)]
pub struct BookingWorkflow {
    event_id: String,
    selection: Selection,
    phase: Phase,
}

impl BookingWorkflow {
    pub fn new(event_id: impl Into<String>) -> Self {
        BookingWorkflow {
            event_id: event_id.into(),
            selection: Selection::default(),
            phase: Phase::Idle,
        }
    }

    pub fn select(&mut self, seats: &[Seat], seat_number: &str) -> SelectOutcome {
        self.selection.select(seats, seat_number)
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.current()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn submit(&mut self) -> Submit {
        if self.phase == Phase::Pending {
            return Submit::AlreadyPending;
        }
        match self.selection.current() {
            None => Submit::Invalid(NO_SEAT_SELECTED),
            Some(seat_number) => {
                self.phase = Phase::Pending;
                Submit::Dispatch {
                    event_id: self.event_id.clone(),
                    seat_number: seat_number.to_string(),
                }
            }
        }
    }

    /// The booking call succeeded. The created ticket lives on the server;
    /// callers navigate to the ticket list and re-fetch rather than
    /// synthesizing one locally.
    pub fn resolve_success(&mut self) {
        self.selection.clear();
        self.phase = Phase::Confirmed;
    }

    /// The booking call failed; `message` is the server's rejection, shown
    /// verbatim. The selection survives for an explicit retry.
    pub fn resolve_failure(&mut self, message: impl Into<String>) {
        self.phase = Phase::Failed(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats() -> Vec<Seat> {
        vec![
            Seat { seat_number: "A1".into(), is_booked: false },
            Seat { seat_number: "A2".into(), is_booked: false },
        ]
    }

    #[test]
    fn submit_without_selection_never_dispatches() {
        let mut workflow = BookingWorkflow::new("e1");
        assert_eq!(workflow.submit(), Submit::Invalid(NO_SEAT_SELECTED));
        assert_eq!(NO_SEAT_SELECTED, "Please select a seat.");
        // Validation does not consume a retry or change phase.
        assert_eq!(*workflow.phase(), Phase::Idle);
    }

    #[test]
    fn submit_dispatches_the_selected_seat() {
        let mut workflow = BookingWorkflow::new("e1");
        workflow.select(&seats(), "A2");

        let submit = workflow.submit();
        assert_eq!(
            submit,
            Submit::Dispatch { event_id: "e1".into(), seat_number: "A2".into() }
        );
        assert_eq!(*workflow.phase(), Phase::Pending);
    }

    #[test]
    fn second_submit_while_pending_is_dropped() {
        let mut workflow = BookingWorkflow::new("e1");
        workflow.select(&seats(), "A1");

        assert!(matches!(workflow.submit(), Submit::Dispatch { .. }));
        assert_eq!(workflow.submit(), Submit::AlreadyPending);
    }

    #[test]
    fn success_clears_the_selection() {
        let mut workflow = BookingWorkflow::new("e1");
        workflow.select(&seats(), "A1");
        workflow.submit();
        workflow.resolve_success();

        assert_eq!(*workflow.phase(), Phase::Confirmed);
        assert_eq!(workflow.selection(), None);
    }

    #[test]
    fn failure_keeps_the_selection_for_retry() {
        let mut workflow = BookingWorkflow::new("e1");
        workflow.select(&seats(), "A1");
        workflow.submit();
        workflow.resolve_failure("Seat A1 is already booked");

        assert_eq!(
            *workflow.phase(),
            Phase::Failed("Seat A1 is already booked".into())
        );
        assert_eq!(workflow.selection(), Some("A1"));

        // The user may pick another seat and submit again.
        workflow.select(&seats(), "A2");
        assert!(matches!(workflow.submit(), Submit::Dispatch { seat_number, .. } if seat_number == "A2"));
    }
}
