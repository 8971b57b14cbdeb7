/// A mailbox label (folder or tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub id: String,
    pub name: String,
}

impl Label {
    /// Case-insensitive match on the label id.
    pub fn matches(&self, wanted: &str) -> bool {
        self.id.eq_ignore_ascii_case(wanted)
    }
}

/// Opaque reference to a mail item, as returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub id: String,
}

/// One page of a message listing.
#[derive(Debug, Clone, Default)]
pub struct MessagePage {
    pub refs: Vec<MessageRef>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Body of a part: inline bytes, or an attachment id resolved by a separate fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Inline(Vec<u8>),
    Attachment(String),
    Empty,
}

#[derive(Debug, Clone)]
pub struct Part {
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub body: PartBody,
}

impl Part {
    /// Parts without a filename (or with an empty one) are not attachments.
    pub fn is_attachment(&self) -> bool {
        self.filename.as_deref().is_some_and(|name| !name.is_empty())
    }
}

/// A fetched mail item.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub headers: Vec<Header>,
    pub parts: Vec<Part>,
}

impl Message {
    /// Case-insensitive header lookup; the first matching header wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn attachments(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_attachment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, value: &str) -> Header {
        Header {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive_and_first_wins() {
        let message = Message {
            id: "m1".to_string(),
            headers: vec![
                header("SUBJECT", "E-1-2 Skin"),
                header("Subject", "second"),
                header("from", "lab@example.com"),
            ],
            parts: Vec::new(),
        };

        assert_eq!(message.header("Subject"), Some("E-1-2 Skin"));
        assert_eq!(message.header("From"), Some("lab@example.com"));
        assert_eq!(message.header("To"), None);
    }

    #[test]
    fn test_part_is_attachment() {
        let named = Part {
            filename: Some("report.pdf".to_string()),
            mime_type: None,
            body: PartBody::Attachment("a1".to_string()),
        };
        let empty_name = Part {
            filename: Some(String::new()),
            mime_type: Some("text/plain".to_string()),
            body: PartBody::Inline(b"hello".to_vec()),
        };
        let unnamed = Part {
            filename: None,
            mime_type: None,
            body: PartBody::Empty,
        };

        assert!(named.is_attachment());
        assert!(!empty_name.is_attachment());
        assert!(!unnamed.is_attachment());
    }

    #[test]
    fn test_label_matches_ignores_case() {
        let label = Label {
            id: "INBOX".to_string(),
            name: "INBOX".to_string(),
        };
        assert!(label.matches("inbox"));
        assert!(label.matches("Inbox"));
        assert!(!label.matches("SENT"));
    }
}
