use crate::authz::Directory;
use crate::error::PortalError;
use crate::recruitment::{PostId, RecruitmentPost};

use super::domain::{Announcement, AnnouncementId, ContactMessage, Quote, QuoteId};

/// Persistence seam for the announcement board, quote bank, and contact
/// inbox.
pub trait BoardStore: Directory + Send + Sync {
    fn insert_announcement(&self, announcement: Announcement) -> Announcement;
    fn announcement(&self, id: AnnouncementId) -> Option<Announcement>;
    fn save_announcement(&self, announcement: Announcement) -> Result<(), PortalError>;
    fn delete_announcement(&self, id: AnnouncementId) -> Result<(), PortalError>;
    fn announcements(&self) -> Vec<Announcement>;

    /// Posts are read here to permission-check post updates and to render
    /// their headlines.
    fn post(&self, id: PostId) -> Option<RecruitmentPost>;

    /// Fails with a conflict when an equal text (case-insensitively) is
    /// already banked.
    fn insert_quote(&self, quote: Quote) -> Result<Quote, PortalError>;
    fn quotes(&self) -> Vec<Quote>;
    fn delete_quote(&self, id: QuoteId) -> Result<(), PortalError>;

    fn insert_message(&self, message: ContactMessage) -> ContactMessage;
    fn messages(&self) -> Vec<ContactMessage>;
}
