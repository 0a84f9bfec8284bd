//! The announcement board and the public face of the cell: notices,
//! recruitment updates, the quote bank, and the contact inbox.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Announcement, AnnouncementId, AnnouncementKind, ContactMessage, MessageId, Quote, QuoteId,
};
pub use repository::BoardStore;
pub use router::board_router;
pub use service::{AnnouncementPayload, BoardService, ContactPayload, LandingPage, NewQuote};
