//! The booking core of the evx client: seat-map modeling, single-seat
//! selection, the booking submission state machine, catalog filtering, and
//! ticket bucketing. Everything here is IO-free; the application performs
//! the network calls these types ask for.

pub mod catalog;
pub mod requests;
pub mod seat_map;
pub mod selection;
pub mod tickets;
pub mod workflow;

pub use catalog::{CatalogBrowser, CategoryFilter, EventFilter};
pub use requests::{RequestSeq, RequestToken};
pub use seat_map::{SeatMap, SeatRow};
pub use selection::{SelectOutcome, Selection};
pub use tickets::{TicketBuckets, bucket_tickets};
pub use workflow::{BookingWorkflow, NO_SEAT_SELECTED, Phase, Submit};
