use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Ticket status as stored by the server. Check-in happens out of band; the
/// client only ever reads this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Booked,
    CheckedIn,
}

/// Proof of a completed booking, binding a user, an event, and a seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: String,
    /// The event this ticket belongs to, embedded by the my-tickets endpoint.
    #[serde(default)]
    pub event: Option<Event>,
    pub seat_number: String,
    pub price: f64,
    pub status: TicketStatus,
    /// Opaque QR image payload shown at entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

/// Display bucket for a ticket. Derived per render from the stored status,
/// the event date, and the clock; never cached on the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketBucket {
    Upcoming,
    Used,
    Expired,
}

impl TicketBucket {
    /// Checked-in wins over everything, then expiry against `now`, then
    /// upcoming. A ticket whose event is unknown cannot expire.
    pub fn classify(
        status: TicketStatus,
        event_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> TicketBucket {
        if status == TicketStatus::CheckedIn {
            return TicketBucket::Used;
        }
        match event_date {
            Some(date) if date < now => TicketBucket::Expired,
            _ => TicketBucket::Upcoming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketBucket::Upcoming => "Upcoming",
            TicketBucket::Used => "Used",
            TicketBucket::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for TicketBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ticket {
    pub fn event_date(&self) -> Option<DateTime<Utc>> {
        self.event.as_ref().map(|e| e.date)
    }

    pub fn bucket(&self, now: DateTime<Utc>) -> TicketBucket {
        TicketBucket::classify(self.status, self.event_date(), now)
    }
}
