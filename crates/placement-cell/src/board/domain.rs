use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authz::{owner_or_admins, Directory, EligibleSet};
use crate::identity::UserId;
use crate::recruitment::PostId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AnnouncementId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct QuoteId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct MessageId(pub u64);

/// What an announcement is about: a free-standing departmental notice, or an
/// update tied to a recruitment post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnouncementKind {
    Notice,
    PostUpdate { post: PostId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    /// Detached when the author's account is removed.
    pub author: Option<UserId>,
    pub title: String,
    pub body: String,
    pub posted_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub kind: AnnouncementKind,
}

impl Announcement {
    pub fn edit_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(self.author, dir)
    }

    pub fn delete_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(self.author, dir)
    }
}

/// Motivational quote shown on the landing page. Texts are unique
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub quote: String,
    pub author: String,
    pub source: Option<String>,
    pub fictional: bool,
}

/// Enquiry left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: MessageId,
    pub name: String,
    pub designation: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}
