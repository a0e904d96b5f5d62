use evx_models::Seat;

/// Outcome of a selection attempt. Anything but `Selected` leaves the
/// current selection untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    SeatTaken,
    UnknownSeat,
}

/// The single client-side seat choice for a booking session. At most one
/// seat is held; selecting another replaces it. Ephemeral: cleared after a
/// successful booking and never persisted.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Try to select `seat_number` from the event's seat collection. A seat
    /// the server reports as booked cannot be selected.
    pub fn select(&mut self, seats: &[Seat], seat_number: &str) -> SelectOutcome {
        match seats.iter().find(|s| s.seat_number == seat_number) {
            None => SelectOutcome::UnknownSeat,
            Some(seat) if seat.is_booked => SelectOutcome::SeatTaken,
            Some(seat) => {
                self.current = Some(seat.seat_number.clone());
                SelectOutcome::Selected
            }
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
