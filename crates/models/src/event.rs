use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event categories recognized by the EventX API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    // Older records carry capitalized category strings.
    #[serde(alias = "Conference")]
    Conference,
    #[serde(alias = "Workshop")]
    Workshop,
    #[serde(alias = "Concert")]
    Concert,
    #[serde(alias = "Webinar")]
    Webinar,
    #[serde(alias = "Sports")]
    Sports,
    #[serde(alias = "Networking")]
    Networking,
    #[serde(alias = "Other")]
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 7] = [
        EventCategory::Conference,
        EventCategory::Workshop,
        EventCategory::Concert,
        EventCategory::Webinar,
        EventCategory::Sports,
        EventCategory::Networking,
        EventCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Conference => "conference",
            EventCategory::Workshop => "workshop",
            EventCategory::Concert => "concert",
            EventCategory::Webinar => "webinar",
            EventCategory::Sports => "sports",
            EventCategory::Networking => "networking",
            EventCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Display status of an event, derived from its date and remaining capacity.
/// Never stored; recomputed against the caller's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Active,
    SoldOut,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::SoldOut => "sold-out",
            EventStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One bookable capacity unit of an event. The booked flag reflects server
/// state at fetch time; the client never writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_number: String,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Display time-of-day, e.g. "19:30". Kept separate from `date` on the wire.
    #[serde(default)]
    pub time: Option<String>,
    pub location: String,
    pub category: EventCategory,
    pub price: f64,
    pub total_seats: u32,
    pub available_seats: u32,
    /// Full seat collection. List endpoints omit it; the detail endpoint
    /// includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<Vec<Seat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Event {
    /// Remaining capacity. The seat collection is authoritative when the
    /// server sent one; `available_seats` is the fallback for responses that
    /// omit seats.
    pub fn seats_remaining(&self) -> u32 {
        match &self.seats {
            Some(seats) => seats.iter().filter(|s| !s.is_booked).count() as u32,
            None => self.available_seats,
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> EventStatus {
        if self.date < now {
            EventStatus::Completed
        } else if self.seats_remaining() == 0 {
            EventStatus::SoldOut
        } else {
            EventStatus::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(date: DateTime<Utc>, available: u32, seats: Option<Vec<Seat>>) -> Event {
        Event {
            id: "ev1".into(),
            title: "Jazz Night".into(),
            description: "An evening of jazz".into(),
            date,
            time: Some("19:30".into()),
            location: "Blue Hall".into(),
            category: EventCategory::Concert,
            price: 25.0,
            total_seats: 4,
            available_seats: available,
            seats,
            image: None,
        }
    }

    fn seat(number: &str, booked: bool) -> Seat {
        Seat {
            seat_number: number.into(),
            is_booked: booked,
        }
    }

    #[test]
    fn parses_wire_shape() {
        let json = serde_json::json!({
            "_id": "665f1c2e9b1e8a0012a4d3f1",
            "title": "Jazz Night",
            "description": "An evening of jazz",
            "date": "2025-07-01T19:30:00.000Z",
            "time": "19:30",
            "location": "Blue Hall",
            "category": "concert",
            "price": 25.0,
            "totalSeats": 2,
            "availableSeats": 1,
            "seats": [
                {"seatNumber": "A1", "isBooked": true},
                {"seatNumber": "A2", "isBooked": false}
            ]
        });
        let event: Event = serde_json::from_value(json).unwrap();
        assert_eq!(event.id, "665f1c2e9b1e8a0012a4d3f1");
        assert_eq!(event.category, EventCategory::Concert);
        assert_eq!(event.seats.as_ref().unwrap().len(), 2);
        assert_eq!(event.seats_remaining(), 1);
    }

    #[test]
    fn accepts_capitalized_categories() {
        let cat: EventCategory = serde_json::from_value(serde_json::json!("Workshop")).unwrap();
        assert_eq!(cat, EventCategory::Workshop);
    }

    #[test]
    fn seat_collection_wins_over_counter() {
        let date = Utc.with_ymd_and_hms(2025, 7, 1, 19, 0, 0).unwrap();
        let with_seats = event(date, 7, Some(vec![seat("A1", true), seat("A2", false)]));
        assert_eq!(with_seats.seats_remaining(), 1);

        let without_seats = event(date, 7, None);
        assert_eq!(without_seats.seats_remaining(), 7);
    }

    #[test]
    fn status_derivation() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();

        assert_eq!(event(past, 3, None).status(now), EventStatus::Completed);
        assert_eq!(event(future, 0, None).status(now), EventStatus::SoldOut);
        assert_eq!(event(future, 3, None).status(now), EventStatus::Active);
        // A full past event is completed, not sold out.
        assert_eq!(event(past, 0, None).status(now), EventStatus::Completed);
    }

    #[test]
    fn category_round_trip() {
        for cat in EventCategory::ALL {
            assert_eq!(cat.as_str().parse::<EventCategory>().unwrap(), cat);
        }
        assert!("SPORTS".parse::<EventCategory>().is_ok());
        assert!("gala".parse::<EventCategory>().is_err());
    }
}
