use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::destination::safe_file_name;
use crate::error::{AttachmentError, MailError};
use crate::mail::{MailClient, Message, Part, PartBody};

/// Outcome of saving the attachments of one message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttachmentReport {
    pub written: Vec<PathBuf>,
    /// Dry-run only: paths that would have been written.
    pub planned: Vec<PathBuf>,
    pub failed: usize,
}

pub struct AttachmentWriter<'a, C: MailClient> {
    client: &'a C,
    dry_run: bool,
}

impl<'a, C: MailClient> AttachmentWriter<'a, C> {
    pub fn new(client: &'a C) -> Self {
        AttachmentWriter {
            client,
            dry_run: false,
        }
    }

    /// Resolve bodies but never touch the filesystem.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Saves every named part of `message` into `output_dir`.
    ///
    /// A failing part is logged and counted; the remaining parts are still processed.
    pub async fn save_attachments(&self, message: &Message, output_dir: &Path) -> AttachmentReport {
        let mut report = AttachmentReport::default();

        for part in message.attachments() {
            match self.save_part(&message.id, part, output_dir).await {
                Ok(path) if self.dry_run => report.planned.push(path),
                Ok(path) => report.written.push(path),
                Err(e) => {
                    warn!("Attachment skipped in message {}: {}", message.id, e);
                    report.failed += 1;
                }
            }
        }

        debug!(
            "Message {}: {} attachment(s) saved, {} failed",
            message.id,
            report.written.len(),
            report.failed
        );

        report
    }

    async fn save_part(
        &self,
        message_id: &str,
        part: &Part,
        output_dir: &Path,
    ) -> Result<PathBuf, AttachmentError> {
        let filename = part.filename.as_deref().unwrap_or_default();
        let name = safe_file_name(filename)
            .ok_or_else(|| AttachmentError::InvalidFilename(filename.to_string()))?;
        let path = output_dir.join(name);

        let content = self.resolve_body(message_id, filename, &part.body).await?;

        if self.dry_run {
            println!("💾 Would save {} ({} bytes)", path.display(), content.len());
            return Ok(path);
        }

        fs::write(&path, &content).map_err(|source| AttachmentError::Write {
            path: path.clone(),
            source,
        })?;

        info!("Attachment saved: {:?} ({} bytes)", path, content.len());
        Ok(path)
    }

    async fn resolve_body(
        &self,
        message_id: &str,
        filename: &str,
        body: &PartBody,
    ) -> Result<Vec<u8>, AttachmentError> {
        match body {
            PartBody::Inline(data) => Ok(data.clone()),
            PartBody::Attachment(attachment_id) => self
                .client
                .get_attachment_body(message_id, attachment_id)
                .await
                .map_err(|e| match e {
                    MailError::Decode(reason) => AttachmentError::Decode {
                        attachment_id: attachment_id.clone(),
                        reason,
                    },
                    source => AttachmentError::Fetch {
                        attachment_id: attachment_id.clone(),
                        source,
                    },
                }),
            PartBody::Empty => Err(AttachmentError::MissingBody(filename.to_string())),
        }
    }
}
