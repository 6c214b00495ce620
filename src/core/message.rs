use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use chrono::Utc;

pub use crate::api::Role;
use crate::api::{MessageInfo, MessagePart, MessageTime};

pub const OPTIMISTIC_ID_PREFIX: &str = "optimistic-";

static LAST_OPTIMISTIC_SUFFIX: AtomicU64 = AtomicU64::new(0);

/// Identity of a transcript entry.
///
/// Locally fabricated messages carry an `Optimistic` id until the server's copy
/// arrives and supersedes them; everything received from the server is
/// `Confirmed`. The two id spaces never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    Optimistic(String),
    Confirmed(String),
}

impl MessageId {
    /// Allocate a fresh optimistic id.
    ///
    /// The suffix is seeded from the nanosecond clock and forced to be strictly
    /// increasing, so two sends inside the same clock tick still differ.
    pub fn next_optimistic() -> Self {
        let now = Utc::now()
            .timestamp_nanos_opt()
            .map(|nanos| nanos.max(0) as u64)
            .unwrap_or_default();
        let mut previous = LAST_OPTIMISTIC_SUFFIX.load(Ordering::Relaxed);
        let suffix = loop {
            let candidate = now.max(previous + 1);
            match LAST_OPTIMISTIC_SUFFIX.compare_exchange_weak(
                previous,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break candidate,
                Err(actual) => previous = actual,
            }
        };
        MessageId::Optimistic(format!("{OPTIMISTIC_ID_PREFIX}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageId::Optimistic(id) | MessageId::Confirmed(id) => id,
        }
    }

    pub fn is_optimistic(&self) -> bool {
        matches!(self, MessageId::Optimistic(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub session_id: String,
    pub parts: Vec<MessagePart>,
    /// Unix milliseconds.
    pub created: f64,
    /// Unset while the turn is still in flight.
    pub completed: Option<f64>,
}

impl Message {
    pub fn optimistic_user(session_id: impl Into<String>, parts: Vec<MessagePart>) -> Self {
        Self {
            id: MessageId::next_optimistic(),
            role: Role::User,
            session_id: session_id.into(),
            parts,
            created: now_millis(),
            completed: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    /// Concatenated text parts, ignoring everything else.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(MessagePart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<MessageInfo> for Message {
    fn from(info: MessageInfo) -> Self {
        let MessageInfo {
            id,
            role,
            parts,
            metadata,
        } = info;
        let MessageTime { created, completed } = metadata.time;
        Self {
            id: MessageId::Confirmed(id),
            role,
            session_id: metadata.session_id,
            parts,
            created,
            completed,
        }
    }
}

/// A file sent alongside a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    /// Read a file from disk, guessing its media type from the extension.
    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            file_path: path.to_path_buf(),
            file_name,
            mime_type: guess_mime_type(path).to_string(),
            content,
        })
    }

    pub fn to_part(&self) -> MessagePart {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.content);
        MessagePart::File {
            media_type: self.mime_type.clone(),
            filename: Some(self.file_name.clone()),
            url: format!("data:{};base64,{}", self.mime_type, encoded),
        }
    }
}

fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "md" | "txt" | "rs" | "toml" | "yaml" | "yml" | "py" | "ts" | "js" | "go" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Parts for an outgoing message: the text first, then one part per attachment.
pub fn build_parts(text: &str, attachments: &[Attachment]) -> Vec<MessagePart> {
    let mut parts = Vec::with_capacity(1 + attachments.len());
    parts.push(MessagePart::text(text));
    parts.extend(attachments.iter().map(Attachment::to_part));
    parts
}

pub fn now_millis() -> f64 {
    Utc::now().timestamp_millis() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimistic_ids_are_prefixed_and_distinct() {
        let ids: Vec<MessageId> = (0..64).map(|_| MessageId::next_optimistic()).collect();
        for id in &ids {
            assert!(id.is_optimistic());
            assert!(id.as_str().starts_with(OPTIMISTIC_ID_PREFIX));
        }
        let mut unique: Vec<&str> = ids.iter().map(MessageId::as_str).collect();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn optimistic_and_confirmed_ids_never_collide() {
        let confirmed = MessageId::Confirmed("optimistic-1".into());
        let optimistic = MessageId::Optimistic("optimistic-1".into());
        assert_ne!(confirmed, optimistic);
    }

    #[test]
    fn build_parts_puts_text_before_attachments() {
        let attachment = Attachment {
            file_path: PathBuf::from("/tmp/notes.txt"),
            file_name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            content: b"abc".to_vec(),
        };

        let parts = build_parts("look at this", std::slice::from_ref(&attachment));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_text(), Some("look at this"));
        assert_eq!(
            parts[1],
            MessagePart::File {
                media_type: "text/plain".into(),
                filename: Some("notes.txt".into()),
                url: "data:text/plain;base64,YWJj".into(),
            }
        );
    }

    #[tokio::test]
    async fn attachment_load_reads_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("diagram.PNG");
        std::fs::write(&path, [1u8, 2, 3]).expect("write file");

        let attachment = Attachment::load(&path).await.expect("attachment loads");
        assert_eq!(attachment.file_name, "diagram.PNG");
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.content, vec![1, 2, 3]);
    }
}
