use crate::format::format_size;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

/// One entry of the chat pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: MessageId,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, rename = "isHTML")]
    pub is_html: bool,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing)]
    pub is_processing: bool,
    #[serde(default)]
    pub used_web_search: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_results: Vec<WebResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecule: Option<MoleculeImage>,
    #[serde(default)]
    pub has_images: bool,
    /// Backend-facing id used when sending feedback.
    #[serde(default, rename = "messageId", skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<String>,
}

impl Message {
    fn new(id: MessageId, kind: MessageKind, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            content,
            timestamp,
            is_html: false,
            is_error: false,
            is_processing: false,
            used_web_search: false,
            web_results: vec![],
            molecule: None,
            has_images: false,
            reply_id: None,
        }
    }

    pub fn user(id: MessageId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(id, MessageKind::User, content.into(), timestamp)
    }

    pub fn bot(id: MessageId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(id, MessageKind::Bot, content.into(), timestamp)
    }

    pub fn bot_html(id: MessageId, html: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let mut message = Self::bot(id, html, timestamp);
        message.is_html = true;
        message
    }

    pub fn error(id: MessageId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let mut message = Self::bot(id, content, timestamp);
        message.is_error = true;
        message
    }

    pub fn processing(id: MessageId, html: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let mut message = Self::bot_html(id, html, timestamp);
        message.is_processing = true;
        message
    }

    pub fn is_user(&self) -> bool {
        self.kind == MessageKind::User
    }

    /// Bot replies that can be rated, copied and bookmarked.
    pub fn is_actionable(&self) -> bool {
        self.kind == MessageKind::Bot && !self.is_error && !self.is_processing && self.reply_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    #[default]
    Upload,
    Web,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub size: String,
    pub status: DocumentStatus,
    pub drive_file_id: Option<String>,
    pub added_to_knowledge: bool,
    pub source: DocumentSource,
}

impl Document {
    pub fn scope(&self) -> &'static str {
        if self.added_to_knowledge {
            "knowledge"
        } else {
            "explore"
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == DocumentStatus::Ready
    }
}

/// Size as the registry reports it: raw bytes or an already formatted label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeField {
    Bytes(f64),
    Label(String),
}

impl SizeField {
    pub fn label(&self) -> String {
        match self {
            SizeField::Bytes(bytes) => format_size(*bytes as u64),
            SizeField::Label(label) => label.clone(),
        }
    }
}

/// Row of the document registry `list` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "fileName", alias = "name")]
    pub file_name: String,
    #[serde(default, alias = "fileSize")]
    pub file_size: Option<SizeField>,
    #[serde(default, alias = "driveId", deserialize_with = "opt_id_string")]
    pub drive_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl From<RegistryEntry> for Document {
    fn from(entry: RegistryEntry) -> Self {
        Document {
            id: entry.id,
            name: entry.file_name,
            size: entry
                .file_size
                .map(|size| size.label())
                .unwrap_or_else(|| "N/A".to_string()),
            status: DocumentStatus::Ready,
            drive_file_id: entry.drive_id,
            added_to_knowledge: entry.kind.as_deref() == Some("knowledge"),
            source: match entry.source.as_deref() {
                Some("web") => DocumentSource::Web,
                _ => DocumentSource::Upload,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(deserialize_with = "id_string", alias = "conversationId", alias = "conversation_id")]
    pub id: String,
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default, alias = "message_count")]
    pub message_count: u32,
    #[serde(
        default,
        alias = "created_at",
        alias = "updated_at",
        alias = "updatedAt",
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "is_favorite", alias = "isFavorite")]
    pub favorite: bool,
}

fn untitled() -> String {
    "Untitled research".to_string()
}

/// Paper or page returned by web search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebResult {
    #[serde(default, deserialize_with = "opt_id_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "authors", skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, alias = "pdf_url", skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl WebResult {
    pub fn download_url(&self) -> Option<&str> {
        self.pdf_url.as_deref().or(self.url.as_deref())
    }

    /// "Source • year • authors" line under the title.
    pub fn byline(&self) -> String {
        let mut parts = vec![self.source.clone().unwrap_or_else(|| "Web".to_string())];
        parts.extend(self.year.clone());
        parts.extend(self.authors.clone());
        parts.join(" • ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeImage {
    pub image_url: String,
    #[serde(default)]
    pub metadata: MoleculeMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeMetadata {
    #[serde(default)]
    pub compound: Option<String>,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub cid: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub molecular_weight: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Thumbs {
    Up,
    Down,
}

/// Locally bookmarked bot answer.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedAnalysis {
    pub id: u64,
    pub title: String,
    pub date: String,
    pub snippet: String,
}

impl SavedAnalysis {
    pub fn from_message(id: u64, ordinal: usize, message: &Message) -> Self {
        let text = crate::normalize::html_to_text(&message.content);
        let snippet: String = text.chars().take(80).collect();
        Self {
            id,
            title: format!("Analysis {ordinal}"),
            date: "Just now".to_string(),
            snippet: format!("{snippet}..."),
        }
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn authors<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Array(items) => {
            let names: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Object(map) => map
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    _ => None,
                })
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_timestamp(deserializer)?.unwrap_or_else(Utc::now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_entry_becomes_ready_document() {
        let entry: RegistryEntry = serde_json::from_value(json!({
            "id": 42,
            "file_name": "paper.pdf",
            "file_size": 2048,
            "drive_id": "drive-1",
            "type": "knowledge",
            "source": "web"
        }))
        .unwrap();
        let doc = Document::from(entry);
        assert_eq!(doc.id, "42");
        assert_eq!(doc.size, "2.0 KB");
        assert_eq!(doc.status, DocumentStatus::Ready);
        assert_eq!(doc.drive_file_id.as_deref(), Some("drive-1"));
        assert!(doc.added_to_knowledge);
        assert_eq!(doc.scope(), "knowledge");
        assert_eq!(doc.source, DocumentSource::Web);
    }

    #[test]
    fn registry_entry_defaults() {
        let entry: RegistryEntry =
            serde_json::from_value(json!({"id": "a", "file_name": "notes.txt"})).unwrap();
        let doc = Document::from(entry);
        assert_eq!(doc.size, "N/A");
        assert!(!doc.added_to_knowledge);
        assert_eq!(doc.source, DocumentSource::Upload);
    }

    #[test]
    fn web_result_accepts_loose_shapes() {
        let result: WebResult = serde_json::from_value(json!({
            "id": 7,
            "title": "Chromene synthesis",
            "year": 2023,
            "authors": ["Ada", {"name": "Grace"}],
            "abstract": "A study.",
            "pdf_url": "https://example.org/p.pdf"
        }))
        .unwrap();
        assert_eq!(result.id.as_deref(), Some("7"));
        assert_eq!(result.year.as_deref(), Some("2023"));
        assert_eq!(result.authors.as_deref(), Some("Ada, Grace"));
        assert_eq!(result.byline(), "Web • 2023 • Ada, Grace");
        assert_eq!(result.download_url(), Some("https://example.org/p.pdf"));

        let echoed = serde_json::to_value(&result).unwrap();
        assert_eq!(echoed["pdfUrl"], "https://example.org/p.pdf");
        assert_eq!(echoed["abstract"], "A study.");
    }

    #[test]
    fn conversation_aliases() {
        let conv: Conversation = serde_json::from_value(json!({
            "conversation_id": 3,
            "title": "Caffeine",
            "message_count": 4,
            "created_at": "2024-05-01T10:00:00Z",
            "is_favorite": true
        }))
        .unwrap();
        assert_eq!(conv.id, "3");
        assert_eq!(conv.message_count, 4);
        assert!(conv.favorite);
        assert!(conv.timestamp.is_some());

        let conv: Conversation =
            serde_json::from_value(json!({"id": "x", "timestamp": "yesterday"})).unwrap();
        assert_eq!(conv.title, "Untitled research");
        assert_eq!(conv.timestamp, None);
    }

    #[test]
    fn image_flag_survives_history_round_trip() {
        let mut message = Message::bot_html(5, "<p>Caffeine</p>", Utc::now());
        message.has_images = true;
        let saved = serde_json::to_value(&message).unwrap();
        assert_eq!(saved["hasImages"], true);

        let loaded: Message = serde_json::from_value(saved).unwrap();
        assert!(loaded.has_images);

        let older: Message =
            serde_json::from_value(json!({"type": "bot", "content": "hi"})).unwrap();
        assert!(!older.has_images);
    }

    #[test]
    fn saved_analysis_snippet() {
        let message = Message::bot_html(1, "<p>Caffeine is a stimulant.</p>", Utc::now());
        let saved = SavedAnalysis::from_message(9, 2, &message);
        assert_eq!(saved.title, "Analysis 2");
        assert_eq!(saved.snippet, "Caffeine is a stimulant....");
    }

    #[test]
    fn actionable_messages() {
        let mut message = Message::bot_html(1, "<p>hi</p>", Utc::now());
        assert!(!message.is_actionable());
        message.reply_id = Some("gini_1".into());
        assert!(message.is_actionable());
        message.is_error = true;
        assert!(!message.is_actionable());
        assert!(!Message::user(2, "hello", Utc::now()).is_actionable());
    }
}
