// sapclose-core/src/infrastructure/adapters/outbox.rs

use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::error::SapcloseError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::{Mailer, OutboundMessage};

/// File-based mailer: each delivered message lands as one HTML file in an
/// outbox directory. Stands in for SMTP transport, which belongs to the
/// operations side — the pipeline only cares that delivery can fail.
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    outbox_dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
        }
    }
}

impl Mailer for OutboxMailer {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), SapcloseError> {
        fs::create_dir_all(&self.outbox_dir)?;

        let file_name = format!(
            "{}.html",
            message.recipient.replace(['@', '.'], "_")
        );
        let content = format!(
            "<!--\nFrom: {}\nTo: {}\nSubject: {}\n-->\n{}",
            message.sender, message.recipient, message.subject, message.html_body
        );

        atomic_write(self.outbox_dir.join(&file_name), content)?;
        info!(recipient = %message.recipient, file = %file_name, "Notification delivered to outbox");
        Ok(())
    }
}
