//! Gmail entity families. Grounded field-for-field on
//! `examples/original_source/packages/schemas/gmail/*`.

use kgx_core::types::{Provenance, Temporal};
use kgx_core::CoreError;
use serde::{Deserialize, Serialize};

use crate::require_non_empty;

/// A Gmail message (natural key: `message_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub message_id: String,
    pub thread_id: String,
    pub subject: String,
    pub snippet: String,
    pub body: Option<String>,
    pub sent_at: chrono::DateTime<chrono::Utc>,
    pub labels: Vec<String>,
    pub size_estimate: u64,
    pub has_attachments: bool,
    pub in_reply_to: Option<String>,
    pub references: Vec<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl Email {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        message_id: impl Into<String>,
        thread_id: impl Into<String>,
        subject: impl Into<String>,
        snippet: impl Into<String>,
        body: Option<String>,
        sent_at: chrono::DateTime<chrono::Utc>,
        labels: Vec<String>,
        size_estimate: u64,
        has_attachments: bool,
        in_reply_to: Option<String>,
        references: Vec<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let message_id = message_id.into();
        let thread_id = thread_id.into();
        require_non_empty(&message_id, "message_id")?;
        require_non_empty(&thread_id, "thread_id")?;
        temporal.validate()?;
        Ok(Self {
            message_id,
            thread_id,
            subject: subject.into(),
            snippet: snippet.into(),
            body,
            sent_at,
            labels,
            size_estimate,
            has_attachments,
            in_reply_to,
            references,
            temporal,
            provenance,
        })
    }
}

/// A Gmail conversation thread (natural key: `thread_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    pub subject: String,
    pub message_count: u32,
    pub participant_count: u32,
    pub first_message_at: chrono::DateTime<chrono::Utc>,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
    pub labels: Vec<String>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl Thread {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        thread_id: impl Into<String>,
        subject: impl Into<String>,
        message_count: u32,
        participant_count: u32,
        first_message_at: chrono::DateTime<chrono::Utc>,
        last_message_at: chrono::DateTime<chrono::Utc>,
        labels: Vec<String>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let thread_id = thread_id.into();
        require_non_empty(&thread_id, "thread_id")?;
        if message_count < 1 {
            return Err(CoreError::Validation("message_count must be >= 1".into()));
        }
        if participant_count < 1 {
            return Err(CoreError::Validation(
                "participant_count must be >= 1".into(),
            ));
        }
        temporal.validate()?;
        Ok(Self {
            thread_id,
            subject: subject.into(),
            message_count,
            participant_count,
            first_message_at,
            last_message_at,
            labels,
            temporal,
            provenance,
        })
    }
}

/// A file attached to an `Email` (natural key: `attachment_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: String,
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
    pub content_hash: Option<String>,
    pub is_inline: bool,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

impl Attachment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        attachment_id: impl Into<String>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        content_hash: Option<String>,
        is_inline: bool,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let attachment_id = attachment_id.into();
        let filename = filename.into();
        let mime_type = mime_type.into();
        require_non_empty(&attachment_id, "attachment_id")?;
        require_non_empty(&filename, "filename")?;
        require_non_empty(&mime_type, "mime_type")?;
        temporal.validate()?;
        Ok(Self {
            attachment_id,
            filename,
            mime_type,
            size,
            content_hash,
            is_inline,
            temporal,
            provenance,
        })
    }
}

/// A system or user Gmail label (natural key: `label_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailLabel {
    pub label_id: String,
    pub name: String,
    pub label_type: GmailLabelType,
    pub color: Option<String>,
    pub message_count: Option<u64>,
    pub temporal: Temporal,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GmailLabelType {
    System,
    User,
}

impl GmailLabel {
    pub fn new(
        label_id: impl Into<String>,
        name: impl Into<String>,
        label_type: GmailLabelType,
        color: Option<String>,
        message_count: Option<u64>,
        temporal: Temporal,
        provenance: Provenance,
    ) -> Result<Self, CoreError> {
        let label_id = label_id.into();
        let name = name.into();
        require_non_empty(&label_id, "label_id")?;
        require_non_empty(&name, "name")?;
        temporal.validate()?;
        Ok(Self {
            label_id,
            name,
            label_type,
            color,
            message_count,
            temporal,
            provenance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgx_core::types::ExtractionTier;

    fn prov() -> Provenance {
        Provenance::new(ExtractionTier::A, "gmail_api", 1.0, "1.0.0").unwrap()
    }

    #[test]
    fn thread_rejects_zero_counts() {
        let now = chrono::Utc::now();
        assert!(Thread::new(
            "thread_1", "subj", 0, 1, now, now, vec![], Temporal::now(), prov()
        )
        .is_err());
        assert!(Thread::new(
            "thread_1", "subj", 1, 0, now, now, vec![], Temporal::now(), prov()
        )
        .is_err());
    }

    #[test]
    fn email_requires_message_and_thread_ids() {
        let now = chrono::Utc::now();
        assert!(Email::new(
            "", "thread_1", "s", "snip", None, now, vec![], 10, false, None, vec![],
            Temporal::now(), prov()
        )
        .is_err());
    }

    #[test]
    fn gmail_label_type_round_trips_lowercase() {
        let json = serde_json::to_string(&GmailLabelType::User).unwrap();
        assert_eq!(json, "\"user\"");
    }
}
