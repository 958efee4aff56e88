// src/mail/testing.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{MailError, Mailer, NotificationKind, OutgoingEmail};

/// Records every attempt; can be told to fail or stall.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    attempts: AtomicUsize,
    fail: bool,
    stall: Option<Duration>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn stalled(delay: Duration) -> Self {
        Self {
            stall: Some(delay),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn count(&self, kind: NotificationKind) -> usize {
        self.sent.lock().await.iter().filter(|e| e.kind == kind).count()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.stall {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(MailError::Transport("connection refused".into()));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
