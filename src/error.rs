//! Error types shared by the mail client, the attachment writer and the batch pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a [`MailClient`](crate::mail::MailClient) call.
#[derive(Error, Debug)]
pub enum MailError {
    /// OAuth2 credentials could not be loaded or no token could be obtained.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The provider could not be reached or answered with a failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered but the payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The payload decoded but lacks a field the caller needs.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors for a single message, surfaced regardless of build profile. They skip that message only.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("message {message_id} has no '{header}' header")]
    MissingHeader {
        message_id: String,
        header: &'static str,
    },

    #[error("unable to create destination directory '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors for a single attachment part. They never abort sibling parts.
#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("unable to fetch attachment {attachment_id}: {source}")]
    Fetch {
        attachment_id: String,
        #[source]
        source: MailError,
    },

    #[error("unable to decode attachment {attachment_id}: {reason}")]
    Decode {
        attachment_id: String,
        reason: String,
    },

    #[error("part '{0}' carries no body")]
    MissingBody(String),

    #[error("unusable attachment filename '{0}'")]
    InvalidFilename(String),

    #[error("unable to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a whole run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unable to list mailbox labels: {0}")]
    LabelListing(#[source] MailError),

    #[error("label '{0}' not found in mailbox")]
    LabelNotFound(String),
}
