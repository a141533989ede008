use crate::config::{Config, Endpoint};
use crate::error::{Error, Result};
use crate::identity::{iso, Identity};
use crate::models::{Conversation, Document, Message, RegistryEntry, Thumbs, WebResult};
use crate::normalize::{decode_list, first_item, list_under, looks_like_json};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// The single transport operation every webhook shares.
#[async_trait(?Send)]
pub trait Webhooks {
    /// POSTs a JSON body and returns the raw reply text of a 2xx response.
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<String>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub scope: &'static str,
}

impl From<&Document> for UserDocument {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.drive_file_id.clone(),
            name: doc.name.clone(),
            scope: doc.scope(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub user_id: String,
    pub message_id: String,
    pub timestamp: String,
    pub use_web_search: bool,
    pub user_documents: Vec<UserDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub document_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest<'a> {
    #[serde(flatten)]
    pub chat: &'a ChatRequest,
    pub compound: &'a str,
}

/// A local file ready to be sent to the upload webhook.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub add_to_knowledge: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    #[serde(default, alias = "file_id")]
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebDocumentReceipt {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, alias = "file_id")]
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WebDocumentAction {
    #[serde(rename = "addToChat")]
    AddToChat,
    #[serde(rename = "addToKnowledge")]
    AddToKnowledge,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedFeedback {
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    config: Config,
}

#[async_trait(?Send)]
impl Webhooks for WebhookClient {
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<String> {
        let url = self.config.endpoint(endpoint)?.clone();
        info!("POST {endpoint} webhook");
        let res = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            error!("{endpoint} webhook answered {status}");
            return Err(Error::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(res.text().await?)
    }
}

impl WebhookClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn post_value(&self, endpoint: Endpoint, body: Value) -> Result<Value> {
        let raw = self.post(endpoint, body).await?;
        if raw.trim().is_empty() || !looks_like_json(&raw) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(raw.trim())?)
    }

    async fn post_object<T>(&self, endpoint: Endpoint, body: Value) -> Result<T>
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        match first_item(self.post_value(endpoint, body).await?) {
            Value::Null => Ok(T::default()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    pub async fn list_documents(&self, identity: &Identity) -> Result<Vec<Document>> {
        let body = json!({
            "action": "list",
            "userId": identity.user_id,
            "sessionId": identity.session_id,
            "timestamp": iso(Utc::now()),
        });
        let reply = self.post_value(Endpoint::Documents, body).await?;
        let entries: Vec<RegistryEntry> = decode_list(list_under(reply, "documents"));
        Ok(entries.into_iter().map(Document::from).collect())
    }

    pub async fn register_document(
        &self,
        identity: &Identity,
        upload: &Upload,
        receipt: &UploadReceipt,
    ) -> Result<Value> {
        let body = json!({
            "action": "register",
            "userId": identity.user_id,
            "sessionId": identity.session_id,
            "document": {
                "fileName": upload.name,
                "fileSize": upload.bytes.len(),
                "fileType": upload.mime,
                "driveId": receipt.file_id,
                "type": if upload.add_to_knowledge { "knowledge" } else { "explore" },
                "source": "upload",
            },
            "timestamp": iso(Utc::now()),
        });
        self.post_value(Endpoint::Documents, body).await
    }

    pub async fn delete_document(
        &self,
        identity: &Identity,
        document_id: &str,
        drive_file_id: Option<&str>,
    ) -> Result<()> {
        let body = json!({
            "action": "delete",
            "userId": identity.user_id,
            "documentId": document_id,
            "driveFileId": drive_file_id,
            "timestamp": iso(Utc::now()),
        });
        self.post(Endpoint::Documents, body).await?;
        Ok(())
    }

    /// Sends the file base64-encoded, then records it in the registry. The
    /// file is stored once the upload webhook accepts it, so a registry
    /// failure is only logged.
    pub async fn upload(&self, identity: &Identity, upload: &Upload) -> Result<UploadReceipt> {
        let body = json!({
            "sessionId": identity.session_id,
            "userId": identity.user_id,
            "fileName": upload.name,
            "fileData": STANDARD.encode(&upload.bytes),
            "fileType": upload.mime,
            "fileSize": upload.bytes.len(),
            "addToKnowledge": upload.add_to_knowledge,
            "timestamp": iso(Utc::now()),
        });
        let receipt: UploadReceipt = self.post_object(Endpoint::Upload, body).await?;
        info!("Uploaded {} as {:?}", upload.name, receipt.file_id);
        if let Err(err) = self.register_document(identity, upload, &receipt).await {
            warn!("Registering {} failed: {err}", upload.name);
        }
        Ok(receipt)
    }

    pub async fn add_web_document(
        &self,
        identity: &Identity,
        result: &WebResult,
        action: WebDocumentAction,
    ) -> Result<WebDocumentReceipt> {
        let body = json!({
            "action": action,
            "userId": identity.user_id,
            "sessionId": identity.session_id,
            "document": result,
            "timestamp": iso(Utc::now()),
        });
        self.post_object(Endpoint::WebDocument, body).await
    }

    pub async fn quick_feedback(
        &self,
        identity: &Identity,
        message_id: &str,
        rating: Thumbs,
    ) -> Result<()> {
        let body = json!({
            "messageId": message_id,
            "sessionId": identity.session_id,
            "userId": identity.user_id,
            "thumbsRating": rating,
            "feedbackType": "quick",
            "timestamp": iso(Utc::now()),
        });
        self.post(Endpoint::Feedback, body).await?;
        Ok(())
    }

    pub async fn detailed_feedback(
        &self,
        identity: &Identity,
        message_id: &str,
        feedback: &DetailedFeedback,
    ) -> Result<()> {
        let body = json!({
            "rating": feedback.rating,
            "comment": feedback.comment,
            "messageId": message_id,
            "sessionId": identity.session_id,
            "userId": identity.user_id,
            "feedbackType": "detailed",
            "timestamp": iso(Utc::now()),
        });
        self.post(Endpoint::Feedback, body).await?;
        Ok(())
    }

    pub async fn list_history(&self, identity: &Identity) -> Result<Vec<Conversation>> {
        let body = self.history_body(identity, "list", None);
        let reply = self.post_value(Endpoint::History, body).await?;
        Ok(decode_list(list_under(reply, "conversations")))
    }

    /// Stores the conversation and returns the id the backend assigned, if any.
    pub async fn save_history(
        &self,
        identity: &Identity,
        conversation_id: Option<&str>,
        title: &str,
        messages: &[Message],
    ) -> Result<Option<String>> {
        let mut body = self.history_body(identity, "save", conversation_id);
        body["title"] = json!(title);
        body["messages"] = serde_json::to_value(messages)?;
        body["messageCount"] = json!(messages.len());
        let reply = first_item(self.post_value(Endpoint::History, body).await?);
        let id = ["conversationId", "id"]
            .iter()
            .filter_map(|key| reply.get(key))
            .find_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        Ok(id.or_else(|| conversation_id.map(str::to_owned)))
    }

    pub async fn load_history(
        &self,
        identity: &Identity,
        conversation_id: &str,
    ) -> Result<Vec<Message>> {
        let body = self.history_body(identity, "load", Some(conversation_id));
        let reply = self.post_value(Endpoint::History, body).await?;
        Ok(decode_list(list_under(reply, "messages")))
    }

    pub async fn toggle_favorite(
        &self,
        identity: &Identity,
        conversation_id: &str,
        favorite: bool,
    ) -> Result<()> {
        let mut body = self.history_body(identity, "toggleFavorite", Some(conversation_id));
        body["favorite"] = json!(favorite);
        self.post(Endpoint::History, body).await?;
        Ok(())
    }

    pub async fn delete_history(&self, identity: &Identity, conversation_id: &str) -> Result<()> {
        let body = self.history_body(identity, "delete", Some(conversation_id));
        self.post(Endpoint::History, body).await?;
        Ok(())
    }

    fn history_body(
        &self,
        identity: &Identity,
        action: &str,
        conversation_id: Option<&str>,
    ) -> Value {
        json!({
            "action": action,
            "userId": identity.user_id,
            "sessionId": identity.session_id,
            "conversationId": conversation_id,
            "timestamp": iso(Utc::now()),
        })
    }
}

/// Title of a saved conversation: the first question, shortened.
pub fn conversation_title(messages: &[Message]) -> String {
    let first = messages
        .iter()
        .find(|message| message.is_user())
        .map(|message| message.content.trim())
        .unwrap_or_default();
    if first.is_empty() {
        return "Untitled research".to_string();
    }
    let mut title: String = first.chars().take(50).collect();
    if first.chars().count() > 50 {
        title.push_str("...");
    }
    title
}
