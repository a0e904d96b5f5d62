use std::collections::BTreeMap;

use evx_models::Seat;

/// One labeled row of the venue grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatRow {
    pub label: String,
    pub seats: Vec<Seat>,
}

/// Display model for an event's seating: rows sorted lexicographically,
/// seats within a row sorted by their numeric index.
#[derive(Debug, Clone)]
pub struct SeatMap {
    rows: Vec<SeatRow>,
}

/// Row label: the seat number with its digits removed ("A12" → "A").
pub fn row_label(seat_number: &str) -> String {
    seat_number.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Numeric index within the row ("A12" → 12). Seats without digits sort first.
pub fn seat_index(seat_number: &str) -> u32 {
    let digits: String = seat_number.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

impl SeatMap {
    /// Build the display grid. `None` when the event carries no seating
    /// information, which callers render as an explicit empty state instead
    /// of an empty grid.
    pub fn build(seats: &[Seat]) -> Option<SeatMap> {
        if seats.is_empty() {
            return None;
        }
        let mut grouped: BTreeMap<String, Vec<Seat>> = BTreeMap::new();
        for seat in seats {
            grouped
                .entry(row_label(&seat.seat_number))
                .or_default()
                .push(seat.clone());
        }
        let rows = grouped
            .into_iter()
            .map(|(label, mut seats)| {
                seats.sort_by_key(|s| seat_index(&s.seat_number));
                SeatRow { label, seats }
            })
            .collect();
        Some(SeatMap { rows })
    }

    pub fn rows(&self) -> &[SeatRow] {
        &self.rows
    }

    pub fn seat_count(&self) -> usize {
        self.rows.iter().map(|r| r.seats.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(number: &str) -> Seat {
        Seat {
            seat_number: number.into(),
            is_booked: false,
        }
    }

    fn numbers(row: &SeatRow) -> Vec<&str> {
        row.seats.iter().map(|s| s.seat_number.as_str()).collect()
    }

    #[test]
    fn groups_rows_and_sorts_deterministically() {
        let map = SeatMap::build(&[seat("A2"), seat("B1"), seat("A1")]).unwrap();
        let rows = map.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "A");
        assert_eq!(numbers(&rows[0]), ["A1", "A2"]);
        assert_eq!(rows[1].label, "B");
        assert_eq!(numbers(&rows[1]), ["B1"]);
    }

    #[test]
    fn order_is_independent_of_input_order() {
        let forward = SeatMap::build(&[seat("A1"), seat("A2"), seat("A10"), seat("B3")]).unwrap();
        let shuffled = SeatMap::build(&[seat("B3"), seat("A10"), seat("A2"), seat("A1")]).unwrap();
        assert_eq!(forward.rows(), shuffled.rows());
        // Numeric, not lexicographic, within a row: A2 before A10.
        assert_eq!(numbers(&forward.rows()[0]), ["A1", "A2", "A10"]);
    }

    #[test]
    fn empty_collection_has_no_map() {
        assert!(SeatMap::build(&[]).is_none());
    }

    #[test]
    fn multi_letter_rows_group_together() {
        let map = SeatMap::build(&[seat("AA1"), seat("A1"), seat("AA2")]).unwrap();
        let labels: Vec<&str> = map.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["A", "AA"]);
        assert_eq!(map.seat_count(), 3);
    }
}
