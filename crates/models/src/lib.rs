pub mod event;
pub mod ticket;

pub use event::{Event, EventCategory, EventStatus, Seat};
pub use ticket::{Ticket, TicketBucket, TicketStatus};
