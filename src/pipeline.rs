use log::{debug, error, info, warn};
use std::collections::HashSet;

use crate::attachment_writer::AttachmentWriter;
use crate::destination::DestinationTree;
use crate::error::{MessageError, PipelineError};
use crate::mail::{Label, MailClient, Message, MessageRef};
use crate::subject::{parse_subject, ParsedSubject};

/// Options for one pass over the mailbox.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub label: String,
    pub limit: Option<usize>,
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            label: "INBOX".to_string(),
            limit: None,
            dry_run: false,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub listed: usize,
    pub processed: usize,
    /// Subject without an identifier.
    pub skipped: usize,
    pub fetch_failed: usize,
    /// Missing `Subject` or `From` header.
    pub invalid: usize,
    /// Destination folder could not be created.
    pub storage_failed: usize,
    pub attachments_written: usize,
    /// Dry-run only: attachments that would have been written.
    pub attachments_planned: usize,
    pub attachments_failed: usize,
    /// A page fetch failed and the listing stopped early.
    pub listing_truncated: bool,
}

/// What happened to a single message.
enum MessageOutcome {
    Saved,
    NoIdentifier,
}

pub struct BatchPipeline<'a, C: MailClient> {
    client: &'a C,
    tree: DestinationTree,
    options: PipelineOptions,
}

impl<'a, C: MailClient> BatchPipeline<'a, C> {
    pub fn new(client: &'a C, tree: DestinationTree, options: PipelineOptions) -> Self {
        BatchPipeline {
            client,
            tree,
            options,
        }
    }

    /// Lists the label, then fetches, parses and stores every message in turn.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        info!("Starting attachment extraction from label '{}'", self.options.label);

        let label = self.resolve_label().await?;
        let mut summary = RunSummary::default();

        let refs = self.list_all_refs(&label, &mut summary).await;
        summary.listed = refs.len();

        if refs.is_empty() {
            info!("No emails found with label '{}'", label.name);
            return Ok(summary);
        }

        let to_process = match self.options.limit {
            Some(limit) => &refs[..limit.min(refs.len())],
            None => &refs[..],
        };

        info!("Found {} email(s), processing {}", refs.len(), to_process.len());

        for (index, message_ref) in to_process.iter().enumerate() {
            debug!("Email {}/{} (ID: {})", index + 1, to_process.len(), message_ref.id);

            let message = match self.client.get_message(&message_ref.id).await {
                Ok(message) => message,
                Err(e) => {
                    warn!("Unable to retrieve email {}: {}", message_ref.id, e);
                    summary.fetch_failed += 1;
                    continue;
                }
            };

            match self.process_message(&message, &mut summary).await {
                Ok(MessageOutcome::Saved) => summary.processed += 1,
                Ok(MessageOutcome::NoIdentifier) => summary.skipped += 1,
                Err(e @ MessageError::MissingHeader { .. }) => {
                    error!("❌ {}", e);
                    summary.invalid += 1;
                }
                Err(e @ MessageError::Storage { .. }) => {
                    warn!("Email {} skipped: {}", message.id, e);
                    summary.storage_failed += 1;
                }
            }
        }

        info!(
            "Processing completed: {} emails processed, {} skipped, {} failed, {} attachment(s) saved",
            summary.processed,
            summary.skipped,
            summary.fetch_failed + summary.invalid + summary.storage_failed,
            summary.attachments_written
        );

        Ok(summary)
    }

    /// Finds the configured label by id, then by display name, ignoring case.
    pub async fn resolve_label(&self) -> Result<Label, PipelineError> {
        let wanted = &self.options.label;
        let labels = self
            .client
            .list_labels()
            .await
            .map_err(PipelineError::LabelListing)?;

        let found = labels
            .iter()
            .find(|l| l.matches(wanted))
            .or_else(|| labels.iter().find(|l| l.name.eq_ignore_ascii_case(wanted)));

        match found {
            Some(label) => {
                debug!("Label '{}' resolved to id {}", wanted, label.id);
                Ok(label.clone())
            }
            None => Err(PipelineError::LabelNotFound(wanted.clone())),
        }
    }

    /// Pages through the label. A failing page ends the listing with what was gathered so far.
    async fn list_all_refs(&self, label: &Label, summary: &mut RunSummary) -> Vec<MessageRef> {
        let mut refs = Vec::new();
        let mut seen = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self
                .client
                .list_message_refs(&label.id, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Listing of label '{}' stopped after {} message(s): {}",
                        label.name,
                        refs.len(),
                        e
                    );
                    summary.listing_truncated = true;
                    break;
                }
            };

            for message_ref in page.refs {
                if seen.insert(message_ref.id.clone()) {
                    refs.push(message_ref);
                }
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        refs
    }

    async fn process_message(
        &self,
        message: &Message,
        summary: &mut RunSummary,
    ) -> Result<MessageOutcome, MessageError> {
        let subject = required_header(message, "Subject")?;
        let from = required_header(message, "From")?;

        let Some(parsed) = parse_subject(subject) else {
            debug!("No identifier in '{}', skipping", subject);
            return Ok(MessageOutcome::NoIdentifier);
        };

        info!("Processing {} ({}) from {}", parsed.identifier, display_category(&parsed), from);

        let folder = if self.options.dry_run {
            let folder = self.tree.folder_for(&parsed);
            println!("📁 {} -> {}", message.id, folder.display());
            folder
        } else {
            self.tree.ensure_folder(&parsed)?
        };

        let report = AttachmentWriter::new(self.client)
            .dry_run(self.options.dry_run)
            .save_attachments(message, &folder)
            .await;

        summary.attachments_written += report.written.len();
        summary.attachments_planned += report.planned.len();
        summary.attachments_failed += report.failed;

        Ok(MessageOutcome::Saved)
    }
}

fn required_header<'m>(message: &'m Message, header: &'static str) -> Result<&'m str, MessageError> {
    message.header(header).ok_or_else(|| MessageError::MissingHeader {
        message_id: message.id.clone(),
        header,
    })
}

fn display_category(parsed: &ParsedSubject) -> &str {
    if parsed.category.is_empty() {
        "no category"
    } else {
        &parsed.category
    }
}
