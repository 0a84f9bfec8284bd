//! Outbound delivery seam for email verification codes.
//!
//! The portal only depends on this trait; the bundled implementation records
//! messages in memory so demos and tests can assert on what was sent.

use std::sync::Mutex;

/// One queued verification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMail {
    pub address: String,
    pub code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport rejected {address}: {reason}")]
    Transport { address: String, reason: String },
}

pub trait VerificationMailer: Send + Sync {
    fn send_code(&self, address: &str, code: &str) -> Result<(), MailError>;
}

/// In-memory outbox.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<VerificationMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<VerificationMail> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl VerificationMailer for MemoryMailer {
    fn send_code(&self, address: &str, code: &str) -> Result<(), MailError> {
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(VerificationMail {
                address: address.to_string(),
                code: code.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbox_records_in_order() {
        let mailer = MemoryMailer::new();
        mailer.send_code("a@campus.edu", "111111").unwrap();
        mailer.send_code("b@campus.edu", "222222").unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].address, "a@campus.edu");
        assert_eq!(sent[1].code, "222222");
    }
}
