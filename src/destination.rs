use log::debug;
use std::fs;
use std::path::PathBuf;

use crate::error::MessageError;
use crate::subject::ParsedSubject;

/// Root of the on-disk attachment tree: `<root>/<identifier>/<category>/<filename>`.
#[derive(Debug, Clone)]
pub struct DestinationTree {
    root: PathBuf,
}

impl DestinationTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DestinationTree { root: root.into() }
    }

    /// Folder for an identifier/category pair. An empty category maps to the identifier folder.
    pub fn folder_for(&self, parsed: &ParsedSubject) -> PathBuf {
        let mut path = self.root.join(encode_component(&parsed.identifier));

        let category = encode_component(&parsed.category);
        if !category.is_empty() {
            path.push(category);
        }

        path
    }

    /// Creates the folder and its parents. Existing folders and their files are left untouched.
    pub fn ensure_folder(&self, parsed: &ParsedSubject) -> Result<PathBuf, MessageError> {
        let path = self.folder_for(parsed);

        fs::create_dir_all(&path).map_err(|source| MessageError::Storage {
            path: path.clone(),
            source,
        })?;

        debug!("Destination folder ready: {:?}", path);
        Ok(path)
    }
}

/// Makes free text usable as a single path component.
///
/// The mapping is injective: `%`, separators, NUL and leading/trailing
/// whitespace are percent-encoded, and `.`/`..` become `%2E`/`%2E%2E`,
/// so two distinct categories never share a folder.
fn encode_component(text: &str) -> String {
    match text {
        "." => return "%2E".to_string(),
        ".." => return "%2E%2E".to_string(),
        _ => {}
    }

    let start = text.len() - text.trim_start().len();
    let end = start + text.trim().len();

    let mut encoded = String::with_capacity(text.len());
    for (index, c) in text.char_indices() {
        let at_edge = index < start || index >= end;
        match c {
            '%' | '/' | '\\' | '\0' => push_escaped(&mut encoded, c),
            c if at_edge && c.is_whitespace() => push_escaped(&mut encoded, c),
            c => encoded.push(c),
        }
    }

    encoded
}

fn push_escaped(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).bytes() {
        out.push_str(&format!("%{:02X}", byte));
    }
}

/// Reduces an attachment filename to its last path segment.
///
/// Returns `None` for names that would not land inside the destination folder.
pub fn safe_file_name(filename: &str) -> Option<&str> {
    let last = filename.rsplit(|c: char| c == '/' || c == '\\').next()?.trim();

    match last {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
