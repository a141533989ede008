use chrono::Utc;
use gini_core::cooldown::Cooldown;
use gini_core::models::{Conversation, Document, Message, MessageId, SavedAnalysis, Thumbs};
use gini_core::{Config, Endpoint, Identity, WebhookClient};
use leptos::logging::{error, log};
use leptos::*;
use std::collections::HashMap;
use std::rc::Rc;

pub const WELCOME: &str = "Hello! I'm Dr. Gini, your AI research copilot. I can analyze documents, visualize molecules, and search for papers. Your uploaded documents are saved and will be available in future sessions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Documents,
    History,
    Saved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Closed,
    Upload,
    /// Detailed feedback for the bot reply with this backend id.
    Feedback(String),
    DocumentSelector,
}

/// Everything the panels share. Provided once by `App` through context.
#[derive(Clone, Copy)]
pub struct ChatState {
    pub messages: RwSignal<Vec<Message>>,
    pub documents: RwSignal<Vec<Document>>,
    pub conversations: RwSignal<Vec<Conversation>>,
    pub saved: RwSignal<Vec<SavedAnalysis>>,
    pub feedback: RwSignal<HashMap<String, Thumbs>>,
    /// Ids of the documents the next question is scoped to.
    pub selected_docs: RwSignal<Vec<String>>,
    pub identity: RwSignal<Identity>,
    pub conversation_id: RwSignal<Option<String>>,
    pub input: RwSignal<String>,
    pub status_html: RwSignal<String>,
    pub is_loading: RwSignal<bool>,
    pub is_uploading: RwSignal<bool>,
    pub loading_docs: RwSignal<bool>,
    pub loading_history: RwSignal<bool>,
    pub web_search: RwSignal<bool>,
    pub cooldown: RwSignal<Cooldown>,
    pub cooldown_left: RwSignal<u64>,
    pub sidebar_open: RwSignal<bool>,
    pub tab: RwSignal<Tab>,
    pub modal: RwSignal<Modal>,
    next_id: StoredValue<MessageId>,
    client: StoredValue<Rc<WebhookClient>>,
}

pub fn use_chat() -> ChatState {
    expect_context::<ChatState>()
}

impl ChatState {
    pub fn new(config: Config, identity: Identity) -> Self {
        let now = Utc::now();
        let cooldown = Cooldown::new(config.cooldown);
        Self {
            messages: create_rw_signal(vec![Message::bot(1, WELCOME, now)]),
            documents: create_rw_signal(vec![]),
            conversations: create_rw_signal(vec![]),
            saved: create_rw_signal(vec![]),
            feedback: create_rw_signal(HashMap::new()),
            selected_docs: create_rw_signal(vec![]),
            identity: create_rw_signal(identity),
            conversation_id: create_rw_signal(None),
            input: create_rw_signal(String::new()),
            status_html: create_rw_signal(String::new()),
            is_loading: create_rw_signal(false),
            is_uploading: create_rw_signal(false),
            loading_docs: create_rw_signal(false),
            loading_history: create_rw_signal(false),
            web_search: create_rw_signal(false),
            cooldown: create_rw_signal(cooldown),
            cooldown_left: create_rw_signal(0),
            sidebar_open: create_rw_signal(true),
            tab: create_rw_signal(Tab::Chat),
            modal: create_rw_signal(Modal::Closed),
            next_id: store_value(now.timestamp_millis().max(2) as MessageId),
            client: store_value(Rc::new(WebhookClient::new(config))),
        }
    }

    pub fn client(&self) -> Rc<WebhookClient> {
        self.client.get_value()
    }

    pub fn next_id(&self) -> MessageId {
        self.next_id.update_value(|id| *id += 1);
        self.next_id.get_value()
    }

    pub fn push(&self, message: Message) {
        self.messages.update(|messages| messages.push(message));
    }

    /// Swaps the message with `id` for `message`, keeping its position.
    /// Does nothing once `id` is gone, e.g. after a new session started.
    pub fn replace(&self, id: MessageId, message: Message) {
        self.messages.update(|messages| {
            if let Some(slot) = messages.iter_mut().find(|m| m.id == id) {
                *slot = message;
            }
        });
    }

    pub fn notify(&self, text: impl Into<String>) {
        let message = Message::bot(self.next_id(), text, Utc::now());
        self.push(message);
    }

    pub fn notify_error(&self, text: impl Into<String>) {
        let message = Message::error(self.next_id(), text, Utc::now());
        self.push(message);
    }

    /// Starts a new research session: only the welcome message survives.
    pub fn reset(&self) {
        self.messages.update(|messages| messages.truncate(1));
        self.feedback.update(HashMap::clear);
        self.conversation_id.set(None);
        self.selected_docs.set(vec![]);
        self.input.set(String::new());
    }

    pub fn ready_documents(&self) -> usize {
        self.documents
            .with(|docs| docs.iter().filter(|doc| doc.is_ready()).count())
    }

    pub fn refresh_documents(&self) {
        let state = *self;
        let client = self.client();
        let identity = self.identity.get_untracked();
        state.loading_docs.set(true);
        spawn_local(async move {
            match client.list_documents(&identity).await {
                Ok(documents) => {
                    log!("Loaded {} documents", documents.len());
                    state.documents.set(documents);
                }
                Err(err) => error!("Failed to load documents: {err}"),
            }
            state.loading_docs.set(false);
        });
    }

    pub fn refresh_history(&self) {
        let state = *self;
        let client = self.client();
        if !client.config().has(Endpoint::History) {
            return;
        }
        let identity = self.identity.get_untracked();
        state.loading_history.set(true);
        spawn_local(async move {
            match client.list_history(&identity).await {
                Ok(conversations) => state.conversations.set(conversations),
                Err(err) => error!("Failed to load history: {err}"),
            }
            state.loading_history.set(false);
        });
    }

    /// Recomputes the countdown badge from the cooldown clock.
    pub fn tick_cooldown(&self) {
        let left = self
            .cooldown
            .with_untracked(|cooldown| cooldown.remaining_secs(Utc::now()));
        if left != self.cooldown_left.get_untracked() {
            self.cooldown_left.set(left);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ChatState {
        ChatState::new(
            Config::default(),
            Identity::anonymous("user_1".into(), "session_1".into()),
        )
    }

    #[test]
    fn reply_replaces_processing_message_in_place() {
        let runtime = create_runtime();
        let state = state();
        let now = Utc::now();
        state.push(Message::user(state.next_id(), "Show caffeine", now));
        let processing = state.next_id();
        state.push(Message::processing(processing, "", now));
        state.notify("later notice");

        let reply = Message::bot_html(state.next_id(), "<p>answer</p>", now);
        state.replace(processing, reply);

        state.messages.with(|messages| {
            assert_eq!(messages.len(), 4);
            assert_eq!(messages[2].content, "<p>answer</p>");
            assert!(!messages[2].is_processing);
            assert_eq!(messages[3].content, "later notice");
        });
        runtime.dispose();
    }

    #[test]
    fn late_reply_is_dropped_after_new_session() {
        let runtime = create_runtime();
        let state = state();
        let now = Utc::now();
        state.push(Message::user(state.next_id(), "What is benzene?", now));
        let processing = state.next_id();
        state.push(Message::processing(processing, "", now));
        state.selected_docs.set(vec!["d1".into()]);
        state.conversation_id.set(Some("c1".into()));

        state.reset();
        state.replace(
            processing,
            Message::bot_html(state.next_id(), "<p>old answer</p>", now),
        );

        state.messages.with(|messages| {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].content, WELCOME);
        });
        assert!(state.selected_docs.get_untracked().is_empty());
        assert_eq!(state.conversation_id.get_untracked(), None);
        runtime.dispose();
    }

    #[test]
    fn ids_keep_increasing() {
        let runtime = create_runtime();
        let state = state();
        let first = state.next_id();
        assert!(state.next_id() > first);
        runtime.dispose();
    }

    #[test]
    fn cooldown_badge_follows_clock() {
        let runtime = create_runtime();
        let state = state();
        state.tick_cooldown();
        assert_eq!(state.cooldown_left.get_untracked(), 0);

        state.cooldown.update(|cooldown| cooldown.start(Utc::now()));
        state.tick_cooldown();
        let left = state.cooldown_left.get_untracked();
        assert!(left > 170 && left <= 180, "{left}");
        runtime.dispose();
    }
}
