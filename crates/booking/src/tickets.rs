use chrono::{DateTime, Utc};
use evx_models::{Ticket, TicketBucket};

/// A user's tickets grouped for display, soonest event first within each
/// bucket. Rebuilt on every render, since bucket membership depends on the clock.
#[derive(Debug, Default)]
pub struct TicketBuckets {
    pub upcoming: Vec<Ticket>,
    pub used: Vec<Ticket>,
    pub expired: Vec<Ticket>,
}

impl TicketBuckets {
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.used.is_empty() && self.expired.is_empty()
    }
}

pub fn bucket_tickets(tickets: Vec<Ticket>, now: DateTime<Utc>) -> TicketBuckets {
    let mut buckets = TicketBuckets::default();
    for ticket in tickets {
        match ticket.bucket(now) {
            TicketBucket::Upcoming => buckets.upcoming.push(ticket),
            TicketBucket::Used => buckets.used.push(ticket),
            TicketBucket::Expired => buckets.expired.push(ticket),
        }
    }
    for bucket in [
        &mut buckets.upcoming,
        &mut buckets.used,
        &mut buckets.expired,
    ] {
        bucket.sort_by_key(|t| t.event_date());
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use evx_models::{Event, EventCategory, TicketStatus};

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 19, 0, 0).unwrap()
    }

    fn ticket(id: &str, status: TicketStatus, event_date: DateTime<Utc>) -> Ticket {
        Ticket {
            id: id.into(),
            event: Some(Event {
                id: format!("ev-{id}"),
                title: format!("Event {id}"),
                description: String::new(),
                date: event_date,
                time: None,
                location: "Hall".into(),
                category: EventCategory::Other,
                price: 10.0,
                total_seats: 10,
                available_seats: 5,
                seats: None,
                image: None,
            }),
            seat_number: "A1".into(),
            price: 10.0,
            status,
            qr_code: None,
        }
    }

    #[test]
    fn buckets_follow_classification() {
        let now = date(2025, 6, 1);
        let buckets = bucket_tickets(
            vec![
                ticket("t1", TicketStatus::Booked, date(2025, 7, 1)),
                ticket("t2", TicketStatus::Booked, date(2025, 5, 1)),
                ticket("t3", TicketStatus::CheckedIn, date(2025, 5, 1)),
            ],
            now,
        );
        assert_eq!(buckets.upcoming.len(), 1);
        assert_eq!(buckets.used.len(), 1);
        assert_eq!(buckets.expired.len(), 1);
        assert!(!buckets.is_empty());
    }

    #[test]
    fn buckets_sort_by_event_date_ascending() {
        let now = date(2025, 6, 1);
        let buckets = bucket_tickets(
            vec![
                ticket("late", TicketStatus::Booked, date(2025, 9, 1)),
                ticket("soon", TicketStatus::Booked, date(2025, 6, 10)),
                ticket("mid", TicketStatus::Booked, date(2025, 7, 15)),
            ],
            now,
        );
        let ids: Vec<&str> = buckets.upcoming.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["soon", "mid", "late"]);
    }

    #[test]
    fn no_tickets_is_empty() {
        assert!(bucket_tickets(vec![], date(2025, 6, 1)).is_empty());
    }
}
