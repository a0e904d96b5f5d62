use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use evx_models::{Event, EventCategory, Ticket};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

mod error;

pub use error::ApiError;

use error::ErrorBody;

// --- Request/response types ---

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSuccess {
    pub token: String,
    pub role: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub search: Option<String>,
    pub category: Option<EventCategory>,
    pub page: Option<u32>,
}

/// Normalized event listing. The API answers either with a bare array or
/// with a paginated wrapper; callers see one shape.
#[derive(Debug, Clone)]
pub struct EventsPage {
    pub events: Vec<Event>,
    pub total_pages: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventsBody {
    Paged {
        events: Vec<Event>,
        #[serde(rename = "totalPages")]
        total_pages: u32,
    },
    Plain(Vec<Event>),
}

impl From<EventsBody> for EventsPage {
    fn from(body: EventsBody) -> Self {
        match body {
            EventsBody::Paged { events, total_pages } => EventsPage {
                events,
                total_pages: Some(total_pages),
            },
            EventsBody::Plain(events) => EventsPage {
                events,
                total_pages: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub event_id: String,
    pub seat_number: String,
}

/// Fields an administrator submits to create or replace an event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub category: EventCategory,
    pub price: f64,
    pub total_seats: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_events: u64,
    pub total_tickets: u64,
    pub total_revenue: f64,
    pub total_users: u64,
    pub active_events: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTicket {
    pub user_name: String,
    pub event_title: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEvent {
    pub title: String,
    pub tickets_sold: u64,
    pub revenue: f64,
}

/// Read-only aggregates for the admin dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub overview: DashboardOverview,
    #[serde(default)]
    pub latest_tickets: Vec<RecentTicket>,
    #[serde(default)]
    pub top_events: Vec<TopEvent>,
}

// --- Client ---

/// The one HTTP client for the EventX API. Owns the base URL, the request
/// timeout, and the bearer token; every remote call in the application goes
/// through here so auth and error mapping happen in a single place.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<ApiClient, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "API request");
        let req = self.http.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        let resp = req.send().await.map_err(ApiError::from)?;
        let status = resp.status();
        if status.is_success() {
            resp.json::<T>().await.map_err(ApiError::from)
        } else {
            let body = resp.json::<ErrorBody>().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), body))
        }
    }

    /// Like `send`, for endpoints whose response body carries nothing the
    /// client needs.
    async fn send_unit(req: RequestBuilder) -> Result<(), ApiError> {
        let resp = req.send().await.map_err(ApiError::from)?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.json::<ErrorBody>().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), body))
        }
    }

    // --- Auth ---

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSuccess, ApiError> {
        Self::send(self.request(Method::POST, "/auth/login").json(credentials)).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthSuccess, ApiError> {
        Self::send(self.request(Method::POST, "/auth/register").json(registration)).await
    }

    // --- Events ---

    pub async fn list_events(&self, query: &EventQuery) -> Result<EventsPage, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = query.category {
            params.push(("category", category.as_str().to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        let body: EventsBody =
            Self::send(self.request(Method::GET, "/events").query(&params)).await?;
        let page = EventsPage::from(body);
        info!("Fetched {} events", page.events.len());
        Ok(page)
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, ApiError> {
        Self::send(self.request(Method::GET, &format!("/events/{id}"))).await
    }

    // --- Tickets ---

    pub async fn book_ticket(&self, booking: &BookingRequest) -> Result<Ticket, ApiError> {
        let ticket: Ticket =
            Self::send(self.request(Method::POST, "/tickets/book").json(booking)).await?;
        info!(seat = %ticket.seat_number, "Ticket booked");
        Ok(ticket)
    }

    pub async fn my_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        let tickets: Vec<Ticket> =
            Self::send(self.request(Method::GET, "/tickets/my-tickets")).await?;
        info!("Fetched {} tickets", tickets.len());
        Ok(tickets)
    }

    pub async fn cancel_ticket(&self, id: &str) -> Result<(), ApiError> {
        Self::send_unit(self.request(Method::DELETE, &format!("/tickets/{id}"))).await
    }

    // --- Admin ---

    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        Self::send(self.request(Method::POST, "/events").json(draft)).await
    }

    pub async fn update_event(&self, id: &str, draft: &EventDraft) -> Result<Event, ApiError> {
        Self::send(
            self.request(Method::PUT, &format!("/events/{id}"))
                .json(draft),
        )
        .await
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        Self::send_unit(self.request(Method::DELETE, &format!("/events/{id}"))).await
    }

    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        Self::send(self.request(Method::GET, "/analytics/dashboard")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_listing_accepts_both_shapes() {
        let event = serde_json::json!({
            "_id": "e1",
            "title": "Jazz Night",
            "description": "",
            "date": "2025-07-01T19:30:00.000Z",
            "location": "Blue Hall",
            "category": "concert",
            "price": 25.0,
            "totalSeats": 10,
            "availableSeats": 4
        });

        let plain: EventsBody = serde_json::from_value(serde_json::json!([event])).unwrap();
        let plain = EventsPage::from(plain);
        assert_eq!(plain.events.len(), 1);
        assert_eq!(plain.total_pages, None);

        let paged: EventsBody =
            serde_json::from_value(serde_json::json!({"events": [event], "totalPages": 3}))
                .unwrap();
        let paged = EventsPage::from(paged);
        assert_eq!(paged.events.len(), 1);
        assert_eq!(paged.total_pages, Some(3));
    }

    #[test]
    fn booking_request_uses_wire_field_names() {
        let booking = BookingRequest {
            event_id: "e1".into(),
            seat_number: "A3".into(),
        };
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"eventId": "e1", "seatNumber": "A3"})
        );
    }

    #[test]
    fn event_draft_serializes_form_fields() {
        let draft = EventDraft {
            title: "Rust Workshop".into(),
            description: "Hands-on".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: "10:00".into(),
            location: "Lab 2".into(),
            category: EventCategory::Workshop,
            price: 0.0,
            total_seats: 30,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["date"], "2026-03-14");
        assert_eq!(value["totalSeats"], 30);
        assert_eq!(value["category"], "workshop");
    }

    #[test]
    fn dashboard_tolerates_missing_tables() {
        let dashboard: Dashboard = serde_json::from_value(serde_json::json!({
            "overview": {
                "totalEvents": 12,
                "totalTickets": 480,
                "totalRevenue": 9600.5,
                "totalUsers": 220,
                "activeEvents": 7
            }
        }))
        .unwrap();
        assert_eq!(dashboard.overview.total_events, 12);
        assert!(dashboard.latest_tickets.is_empty());
        assert!(dashboard.top_events.is_empty());
    }
}
