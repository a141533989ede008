//! The message-send flow: text first, then (optionally) the structure image.

use crate::blocks;
use crate::client::{ChatRequest, ImageRequest, UserDocument, Webhooks};
use crate::config::{Config, Endpoint};
use crate::error::{Error, Result};
use crate::identity::{iso, Identity};
use crate::intent::{detect_image_requirement, ImageIntent};
use crate::models::{Message, MessageId, MoleculeImage, WebResult};
use crate::normalize::{process_response, Normalized};
use crate::status::Stage;
use chrono::{DateTime, Utc};
use futures::future::{select, Either, LocalBoxFuture};
use tracing::{debug, error, info, warn};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

/// Replies shorter than this are replaced by a notice.
const MIN_REPLY_CHARS: usize = 10;

/// Source of delays, so the same flow runs in the browser and under tokio.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Resolves `future` or fails with [`Error::Timeout`] once `limit` elapses.
/// The losing future is dropped, which aborts an in-flight fetch.
pub async fn with_timeout<T, F>(timer: &impl Timer, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let future = pin!(future);
    match select(future, timer.sleep(limit)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(Error::Timeout(limit)),
    }
}

/// Which webhook answers the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Chat,
    Search,
    Documents(Vec<String>),
}

impl Route {
    /// Selected documents win over web search; both fall back to plain chat
    /// when their webhook is not configured.
    pub fn choose(config: &Config, web_search: bool, selected: &[String]) -> Self {
        if !selected.is_empty() && config.has(Endpoint::DocumentChat) {
            Route::Documents(selected.to_vec())
        } else if web_search && config.has(Endpoint::Search) {
            Route::Search
        } else {
            Route::Chat
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Route::Chat => Endpoint::Text,
            Route::Search => Endpoint::Search,
            Route::Documents(_) => Endpoint::DocumentChat,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ask {
    pub text: String,
    pub use_web_search: bool,
    pub documents: Vec<UserDocument>,
    pub route: Route,
}

/// Final bot answer, ready to replace the processing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub html: String,
    pub molecule: Option<MoleculeImage>,
    pub has_images: bool,
    pub used_web_search: bool,
    pub web_results: Vec<WebResult>,
    pub reply_id: String,
}

impl Reply {
    pub fn into_message(self, id: MessageId, timestamp: DateTime<Utc>) -> Message {
        let mut message = Message::bot_html(id, self.html, timestamp);
        message.molecule = self.molecule;
        message.used_web_search = self.used_web_search;
        message.web_results = self.web_results;
        message.has_images = self.has_images;
        message.reply_id = Some(self.reply_id);
        message
    }
}

/// Status shown before any webhook has answered.
pub fn opening_stage(intent: &ImageIntent, use_web_search: bool) -> Stage {
    Stage::Working {
        compound: intent.needs_image.then(|| intent.compound.clone()),
        web_search: use_web_search,
    }
}

pub struct Pipeline<'a, W, T> {
    webhooks: &'a W,
    timer: &'a T,
    timeout: Duration,
}

impl<'a, W: Webhooks, T: Timer> Pipeline<'a, W, T> {
    pub fn new(webhooks: &'a W, timer: &'a T, timeout: Duration) -> Self {
        Self {
            webhooks,
            timer,
            timeout,
        }
    }

    /// Runs the whole exchange. Every failure is folded into the reply HTML.
    pub async fn run<F>(
        &self,
        identity: &Identity,
        ask: Ask,
        now: DateTime<Utc>,
        mut on_stage: F,
    ) -> Reply
    where
        F: FnMut(Stage),
    {
        let intent = detect_image_requirement(&ask.text);
        on_stage(opening_stage(&intent, ask.use_web_search));

        let request = ChatRequest {
            message: ask.text.clone(),
            session_id: identity.session_id.clone(),
            user_id: identity.user_id.clone(),
            message_id: format!("msg_{}", now.timestamp_millis()),
            timestamp: iso(now),
            use_web_search: ask.use_web_search,
            user_documents: ask.documents.clone(),
            document_ids: match &ask.route {
                Route::Documents(ids) => ids.clone(),
                _ => vec![],
            },
        };

        info!("Fetching text response from {} webhook", ask.route.endpoint());
        let (mut text_html, text) = match self.text(&ask.route, &request).await {
            Ok(text) => {
                info!("Text content processed successfully");
                let html = if text.html.trim().chars().count() < MIN_REPLY_CHARS {
                    warn!("Text content is too short or empty");
                    blocks::limited_response()
                } else {
                    text.html.clone()
                };
                (html, Some(text))
            }
            Err(err) => {
                error!("Text request failed: {err}");
                (blocks::text_error(&err.to_string()), None)
            }
        };
        if text_html.trim().is_empty() {
            text_html = blocks::text_missing();
        }

        let mut molecule = None;
        let mut image_failed = false;
        if intent.needs_image {
            on_stage(Stage::TextReady {
                compound: intent.compound.clone(),
            });
            info!("Starting image request for {}", intent.compound);
            match self.image(&request, &intent.compound).await {
                Ok(image) => {
                    if image.molecule.is_some() || !image.html.trim().is_empty() {
                        text_html.push_str(blocks::SEPARATOR);
                        text_html.push_str(&image.html);
                    }
                    molecule = image.molecule;
                }
                Err(err) => {
                    error!("Image request failed: {err}");
                    image_failed = true;
                    text_html.push_str(blocks::SEPARATOR);
                    text_html.push_str(&blocks::image_error(&err.to_string()));
                }
            }
        }
        debug!(
            "Combined reply: {} chars, molecule: {}",
            text_html.len(),
            molecule.is_some()
        );

        let (used_web_search, web_results) = text
            .map(|text| (text.used_web_search, text.web_results))
            .unwrap_or_default();
        Reply {
            html: text_html,
            molecule,
            has_images: intent.needs_image && !image_failed,
            used_web_search: ask.use_web_search || used_web_search,
            web_results,
            reply_id: format!("gini_{}", Utc::now().timestamp_millis()),
        }
    }

    async fn text(&self, route: &Route, request: &ChatRequest) -> Result<Normalized> {
        let body = serde_json::to_value(request)?;
        let raw = with_timeout(
            self.timer,
            self.timeout,
            self.webhooks.post(route.endpoint(), body),
        )
        .await?;
        Ok(process_response(&raw, false))
    }

    async fn image(&self, request: &ChatRequest, compound: &str) -> Result<Normalized> {
        let body = serde_json::to_value(ImageRequest {
            chat: request,
            compound,
        })?;
        let raw = self.webhooks.post(Endpoint::Image, body).await?;
        Ok(process_response(&raw, true))
    }
}
