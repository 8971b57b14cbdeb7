/// Mail provider abstraction and the message model it produces
pub mod model;

pub use model::{Header, Label, Message, MessagePage, MessageRef, Part, PartBody};

use futures::future::BoxFuture;

use crate::error::MailError;

/// Read-only operations the batch pipeline needs from a mail provider.
///
/// Every call returns a typed result; callers decide whether a failure
/// skips the current item or aborts the run.
pub trait MailClient: Send + Sync {
    fn list_labels<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Label>, MailError>>;

    fn list_message_refs<'a>(
        &'a self,
        label_id: &'a str,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<MessagePage, MailError>>;

    fn get_message<'a>(&'a self, message_id: &'a str) -> BoxFuture<'a, Result<Message, MailError>>;

    /// Returns the raw attachment bytes, already decoded from the transport encoding.
    fn get_attachment_body<'a>(
        &'a self,
        message_id: &'a str,
        attachment_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<u8>, MailError>>;
}
