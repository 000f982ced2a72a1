//! Outgoing notifications.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// The kinds of mail the system sends to admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    EmailVerification { code: String },
    PasswordReset { code: String },
    AccountApproved,
    AccountRemoved,
}

impl Notice {
    pub fn subject(&self) -> &'static str {
        match self {
            Notice::EmailVerification { .. } => "Email Verification Code",
            Notice::PasswordReset { .. } => "Password Reset Code",
            Notice::AccountApproved => "Account Approved",
            Notice::AccountRemoved => "Account Deletion",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notice::EmailVerification { code } => {
                format!("Your email verification code is: {code}")
            }
            Notice::PasswordReset { code } => format!("Your password reset code is: {code}"),
            Notice::AccountApproved => {
                "Your account has been approved successfully by an admin!".to_string()
            }
            Notice::AccountRemoved => "Your account as an admin has been removed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn notice(from: &str, to: &str, notice: &Notice) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: notice.subject().to_string(),
            body: notice.body(),
        }
    }
}

/// Delivery backend for outgoing mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> anyhow::Result<()>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "email dispatched"
        );
        tracing::debug!(body = %email.body, "email body");
        Ok(())
    }
}

/// Keeps sent messages in memory so tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Returns the trailing code from the latest message sent to `to`, if any.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|e| e.to == to)
            .and_then(|e| e.body.rsplit(' ').next().map(str::to_string))
            .filter(|code| code.chars().all(|c| c.is_ascii_digit()))
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("mailbox lock poisoned"))?
            .push(email);
        Ok(())
    }
}
