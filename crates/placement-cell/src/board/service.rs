use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::authz::{moderators, Action};
use crate::dispatch::{authorize, resolve, Validator};
use crate::error::PortalError;
use crate::identity::UserId;
use crate::recruitment::PostId;
use crate::settings::{keys, SettingsStore, DEFAULT_HOD_MESSAGE, DEFAULT_TPC_HEAD_MESSAGE};

use super::domain::{
    Announcement, AnnouncementId, AnnouncementKind, ContactMessage, MessageId, Quote, QuoteId,
};
use super::repository::BoardStore;

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementPayload {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuote {
    pub quote: String,
    pub author: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub fictional: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    pub message: String,
}

/// Everything the public landing page renders in one fetch.
#[derive(Debug, Clone, Serialize)]
pub struct LandingPage {
    pub notices: Vec<Announcement>,
    pub quote: Option<Quote>,
    pub message_from_hod: String,
    pub message_from_tpc_head: String,
}

/// The moderated announcement board, quote bank, and public contact inbox.
pub struct BoardService<S> {
    store: Arc<S>,
    settings: Arc<dyn SettingsStore>,
}

impl<S> BoardService<S>
where
    S: BoardStore + 'static,
{
    pub fn new(store: Arc<S>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { store, settings }
    }

    fn validate_announcement(payload: &AnnouncementPayload) -> Result<(), PortalError> {
        let mut validator = Validator::new();
        validator.require_non_empty(&payload.title, "title");
        validator.require_non_empty(&payload.body, "body");
        validator.finish()
    }

    /// Free-standing notices come from the moderation set only.
    pub fn create_notice(
        &self,
        actor: UserId,
        payload: AnnouncementPayload,
    ) -> Result<Announcement, PortalError> {
        authorize(&moderators(self.store.as_ref()), actor, Action::Edit)?;
        Self::validate_announcement(&payload)?;

        let announcement = self.store.insert_announcement(Announcement {
            id: AnnouncementId(0),
            author: Some(actor),
            title: payload.title,
            body: payload.body,
            posted_at: Utc::now(),
            edited_at: None,
            kind: AnnouncementKind::Notice,
        });
        info!(announcement = announcement.id.0, by = %actor, "posted notice");
        Ok(announcement)
    }

    /// Post updates are pushed by whoever manages the post.
    pub fn create_post_update(
        &self,
        actor: UserId,
        post_id: PostId,
        payload: AnnouncementPayload,
    ) -> Result<Announcement, PortalError> {
        let post = resolve(self.store.post(post_id), "recruitment post", post_id.0)?;
        authorize(
            &post.add_update_users(self.store.as_ref()),
            actor,
            Action::AddUpdate,
        )?;
        Self::validate_announcement(&payload)?;

        let announcement = self.store.insert_announcement(Announcement {
            id: AnnouncementId(0),
            author: Some(actor),
            title: payload.title,
            body: payload.body,
            posted_at: Utc::now(),
            edited_at: None,
            kind: AnnouncementKind::PostUpdate { post: post_id },
        });
        info!(
            announcement = announcement.id.0,
            post = post_id.0,
            by = %actor,
            "posted recruitment update"
        );
        Ok(announcement)
    }

    pub fn update_announcement(
        &self,
        actor: UserId,
        id: AnnouncementId,
        payload: AnnouncementPayload,
    ) -> Result<Announcement, PortalError> {
        let mut announcement = resolve(self.store.announcement(id), "announcement", id.0)?;
        authorize(&announcement.edit_users(self.store.as_ref()), actor, Action::Edit)?;
        Self::validate_announcement(&payload)?;

        announcement.title = payload.title;
        announcement.body = payload.body;
        announcement.edited_at = Some(Utc::now());
        self.store.save_announcement(announcement.clone())?;
        Ok(announcement)
    }

    pub fn delete_announcement(&self, actor: UserId, id: AnnouncementId) -> Result<(), PortalError> {
        let announcement = resolve(self.store.announcement(id), "announcement", id.0)?;
        authorize(
            &announcement.delete_users(self.store.as_ref()),
            actor,
            Action::Delete,
        )?;
        self.store.delete_announcement(id)
    }

    /// Whole board, newest first.
    pub fn announcements(&self) -> Vec<Announcement> {
        let mut all = self.store.announcements();
        all.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        all
    }

    pub fn add_quote(&self, actor: UserId, payload: NewQuote) -> Result<Quote, PortalError> {
        authorize(&moderators(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require_non_empty(&payload.quote, "quote");
        validator.require_non_empty(&payload.author, "author");
        validator.finish()?;

        self.store.insert_quote(Quote {
            id: QuoteId(0),
            quote: payload.quote,
            author: payload.author,
            source: payload.source,
            fictional: payload.fictional,
        })
    }

    pub fn delete_quote(&self, actor: UserId, id: QuoteId) -> Result<(), PortalError> {
        authorize(&moderators(self.store.as_ref()), actor, Action::Delete)?;
        self.store.delete_quote(id)
    }

    pub fn quotes(&self) -> Vec<Quote> {
        self.store.quotes()
    }

    pub fn random_quote(&self) -> Option<Quote> {
        let quotes = self.store.quotes();
        quotes.choose(&mut rand::thread_rng()).cloned()
    }

    pub fn landing(&self) -> LandingPage {
        let notices = self
            .announcements()
            .into_iter()
            .filter(|a| matches!(a.kind, AnnouncementKind::Notice))
            .take(5)
            .collect();
        LandingPage {
            notices,
            quote: self.random_quote(),
            message_from_hod: self
                .settings
                .get_or_create(keys::MESSAGE_FROM_HOD, DEFAULT_HOD_MESSAGE),
            message_from_tpc_head: self
                .settings
                .get_or_create(keys::MESSAGE_FROM_TPC_HEAD, DEFAULT_TPC_HEAD_MESSAGE),
        }
    }

    /// Anyone can reach the cell through the contact form; no account
    /// needed.
    pub fn submit_contact(&self, payload: ContactPayload) -> Result<ContactMessage, PortalError> {
        let mut validator = Validator::new();
        validator.require_non_empty(&payload.name, "name");
        validator.require_non_empty(&payload.message, "message");
        validator.require(
            payload.email.contains('@'),
            "email",
            "must be a valid email address",
        );
        validator.finish()?;

        let message = self.store.insert_message(ContactMessage {
            id: MessageId(0),
            name: payload.name,
            designation: payload.designation,
            company: payload.company,
            phone: payload.phone,
            email: payload.email,
            message: payload.message,
            received_at: Utc::now(),
        });
        info!(message = message.id.0, "received contact enquiry");
        Ok(message)
    }

    pub fn messages(&self, actor: UserId) -> Result<Vec<ContactMessage>, PortalError> {
        authorize(&moderators(self.store.as_ref()), actor, Action::View)?;
        Ok(self.store.messages())
    }
}
