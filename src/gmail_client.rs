use futures::future::{BoxFuture, FutureExt};
use google_gmail1::api::{MessagePart, Scope};
use google_gmail1::{hyper, hyper_rustls, oauth2, Gmail};
use log::{debug, info};

use crate::config::GmailConfig;
use crate::error::MailError;
use crate::mail::{Header, Label, MailClient, Message, MessagePage, MessageRef, Part, PartBody};

pub struct GmailClient {
    hub: Gmail<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
    user_id: String,
}

impl GmailClient {
    /// Authenticates and builds the Gmail hub.
    ///
    /// A token is requested right away so that a refused or broken
    /// authorization fails here, before anything is listed.
    pub async fn new(config: &GmailConfig) -> Result<Self, MailError> {
        info!("Connecting to Gmail API via OAuth2");

        let secret = oauth2::read_application_secret(&config.credentials_path)
            .await
            .map_err(|e| {
                MailError::Authentication(format!(
                    "unable to read OAuth2 client secret '{}': {}",
                    config.credentials_path, e
                ))
            })?;

        let auth = oauth2::InstalledFlowAuthenticator::builder(
            secret,
            oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(&config.token_cache_path)
        .build()
        .await
        .map_err(|e| {
            MailError::Authentication(format!("unable to create OAuth2 authenticator: {}", e))
        })?;

        auth.token(&[Scope::Readonly.as_ref()])
            .await
            .map_err(|e| MailError::Authentication(format!("no access token granted: {}", e)))?;

        info!("🔑 Credentials cached in: {}", config.token_cache_path);

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| MailError::Transport(format!("unable to load native TLS roots: {}", e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = hyper::Client::builder().build(connector);
        let hub = Gmail::new(client, auth);

        info!("✅ Gmail API connection established successfully");

        Ok(GmailClient {
            hub,
            user_id: config.user_id.clone(),
        })
    }

    async fn fetch_labels(&self) -> Result<Vec<Label>, MailError> {
        debug!("Retrieving Gmail labels list");

        let (_, response) = self
            .hub
            .users()
            .labels_list(&self.user_id)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(classify)?;

        let labels = response
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|label| {
                let id = label.id?;
                let name = label.name.unwrap_or_else(|| id.clone());
                Some(Label { id, name })
            })
            .collect();

        Ok(labels)
    }

    async fn fetch_message_page(
        &self,
        label_id: &str,
        page_token: Option<&str>,
    ) -> Result<MessagePage, MailError> {
        debug!("Listing messages with label {} (page token: {:?})", label_id, page_token);

        let mut request = self
            .hub
            .users()
            .messages_list(&self.user_id)
            .add_label_ids(label_id)
            .add_scope(Scope::Readonly);

        if let Some(token) = page_token {
            request = request.page_token(token);
        }

        let (_, response) = request.doit().await.map_err(classify)?;

        let refs = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|msg| msg.id)
            .map(|id| MessageRef { id })
            .collect();

        Ok(MessagePage {
            refs,
            next_page_token: response.next_page_token,
        })
    }

    async fn fetch_message(&self, message_id: &str) -> Result<Message, MailError> {
        debug!("Complete email retrieval for ID: {}", message_id);

        let (_, message) = self
            .hub
            .users()
            .messages_get(&self.user_id, message_id)
            .format("full")
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(classify)?;

        let mut payload = message
            .payload
            .ok_or_else(|| MailError::Malformed(format!("message {} has no payload", message_id)))?;

        let headers = payload
            .headers
            .take()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|h| match (h.name, h.value) {
                (Some(name), Some(value)) => Some(Header { name, value }),
                _ => None,
            })
            .collect();

        Ok(Message {
            id: message.id.unwrap_or_else(|| message_id.to_string()),
            headers,
            parts: message_parts(payload),
        })
    }

    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<Vec<u8>, MailError> {
        debug!("Retrieving attachment {} of message {}", attachment_id, message_id);

        let (_, body) = self
            .hub
            .users()
            .messages_attachments_get(&self.user_id, message_id, attachment_id)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(classify)?;

        body.data.ok_or_else(|| {
            MailError::Malformed(format!("attachment {} has no data", attachment_id))
        })
    }
}

impl MailClient for GmailClient {
    fn list_labels<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Label>, MailError>> {
        self.fetch_labels().boxed()
    }

    fn list_message_refs<'a>(
        &'a self,
        label_id: &'a str,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<MessagePage, MailError>> {
        self.fetch_message_page(label_id, page_token).boxed()
    }

    fn get_message<'a>(&'a self, message_id: &'a str) -> BoxFuture<'a, Result<Message, MailError>> {
        self.fetch_message(message_id).boxed()
    }

    fn get_attachment_body<'a>(
        &'a self,
        message_id: &'a str,
        attachment_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<u8>, MailError>> {
        self.fetch_attachment(message_id, attachment_id).boxed()
    }
}

/// Leaf parts of a payload. A single-part payload is its own only part.
fn message_parts(payload: MessagePart) -> Vec<Part> {
    let mut parts = Vec::new();
    flatten_part(payload, &mut parts);
    parts
}

/// Depth-first walk over nested multipart containers, keeping leaves in order.
fn flatten_part(part: MessagePart, out: &mut Vec<Part>) {
    if let Some(children) = part.parts {
        for child in children {
            flatten_part(child, out);
        }
        return;
    }

    let body = match part.body {
        Some(body) => match (body.attachment_id, body.data) {
            (Some(attachment_id), _) => PartBody::Attachment(attachment_id),
            (None, Some(data)) => PartBody::Inline(data),
            (None, None) => PartBody::Empty,
        },
        None => PartBody::Empty,
    };

    out.push(Part {
        filename: part.filename,
        mime_type: part.mime_type,
        body,
    });
}

/// Bodies travel base64url-encoded inside JSON, so a body that fails to
/// decode surfaces as a JSON decode error.
fn classify(err: google_gmail1::Error) -> MailError {
    match err {
        google_gmail1::Error::JsonDecodeError(payload, source) => {
            debug!("Undecodable payload: {}", payload);
            MailError::Decode(source.to_string())
        }
        google_gmail1::Error::MissingToken(e) => MailError::Authentication(e.to_string()),
        other => MailError::Transport(other.to_string()),
    }
}
