use crate::browser::copy_to_clipboard;
use crate::feedback::send_quick_feedback;
use crate::molecule::MolecularImage;
use crate::search::WebSearchResults;
use crate::state::{use_chat, Modal};
use gini_core::format::format_time;
use gini_core::models::{Message, SavedAnalysis, Thumbs};
use gini_core::normalize::{html_to_text, markdown};
use leptos::logging::warn;
use leptos::*;
use std::time::Duration;

const COPIED_FOR: Duration = Duration::from_secs(2);

fn avatar_class(message: &Message) -> &'static str {
    if message.is_user() {
        "bg-slate-900"
    } else if message.is_error {
        "bg-red-500"
    } else {
        "bg-gradient-to-br from-blue-500 to-purple-600"
    }
}

fn bubble_class(message: &Message) -> &'static str {
    if message.is_user() {
        "inline-block max-w-full bg-slate-900 text-white rounded-2xl rounded-tr-md px-4 py-3"
    } else {
        "inline-block max-w-full bg-white border border-slate-200 rounded-2xl rounded-tl-md px-4 py-3 shadow-sm text-left"
    }
}

#[component]
fn Body(message: Message) -> impl IntoView {
    let state = use_chat();
    if message.is_processing {
        view! { <div inner_html=move || state.status_html.get() /> }.into_view()
    } else if message.is_user() {
        view! { <p class="text-sm whitespace-pre-wrap">{message.content}</p> }.into_view()
    } else if message.is_error {
        view! { <p class="text-sm text-red-600">{message.content}</p> }.into_view()
    } else if message.is_html {
        view! { <div class="text-sm text-slate-700 space-y-2" inner_html=message.content /> }
            .into_view()
    } else {
        let parsed = markdown(&message.content);
        view! { <div class="text-sm text-slate-700 space-y-2" inner_html=parsed /> }.into_view()
    }
}

#[component]
fn Actions(message: Message, reply_id: String) -> impl IntoView {
    let state = use_chat();
    let (copied, set_copied) = create_signal(false);
    let rating = {
        let reply_id = reply_id.clone();
        create_memo(move |_| state.feedback.with(|feedback| feedback.get(&reply_id).copied()))
    };
    let is_up = move || rating.get() == Some(Thumbs::Up);
    let is_down = move || rating.get() == Some(Thumbs::Down);

    let thumbs = {
        let reply_id = reply_id.clone();
        move |thumbs: Thumbs| send_quick_feedback(state, reply_id.clone(), thumbs)
    };
    let thumbs_down = thumbs.clone();

    let text = html_to_text(&message.content);
    let copy = move |_| {
        let text = text.clone();
        spawn_local(async move {
            match copy_to_clipboard(&text).await {
                Ok(()) => {
                    set_copied.set(true);
                    set_timeout(move || set_copied.set(false), COPIED_FOR);
                }
                Err(err) => warn!("Clipboard write failed: {err}"),
            }
        });
    };

    let time = format_time(&message.timestamp);
    let save = move |_| {
        let id = state.next_id();
        state.saved.update(|saved| {
            let analysis = SavedAnalysis::from_message(id, saved.len() + 1, &message);
            saved.insert(0, analysis);
        });
    };

    let open_feedback = move |_| state.modal.set(Modal::Feedback(reply_id.clone()));

    view! {
        <div class="flex items-center gap-1 mt-2">
            <button
                type="button"
                title="Helpful"
                class="p-1.5 rounded-lg text-sm"
                class:bg-green-100=is_up
                class:text-green-600=is_up
                class:text-slate-400=move || !is_up()
                on:click=move |_| thumbs(Thumbs::Up)
            >
                "👍"
            </button>
            <button
                type="button"
                title="Not helpful"
                class="p-1.5 rounded-lg text-sm"
                class:bg-red-100=is_down
                class:text-red-600=is_down
                class:text-slate-400=move || !is_down()
                on:click=move |_| thumbs_down(Thumbs::Down)
            >
                "👎"
            </button>
            <button
                type="button"
                title="Copy"
                class="p-1.5 text-xs text-slate-400 hover:bg-slate-100 rounded-lg"
                on:click=copy
            >
                {move || if copied.get() { "✓ Copied" } else { "Copy" }}
            </button>
            <button
                type="button"
                title="Save analysis"
                class="p-1.5 text-xs text-slate-400 hover:bg-slate-100 rounded-lg"
                on:click=save
            >
                Save
            </button>
            <button
                type="button"
                title="Detailed feedback"
                class="p-1.5 text-xs text-slate-400 hover:bg-slate-100 rounded-lg"
                on:click=open_feedback
            >
                Feedback
            </button>
            <span class="text-xs text-slate-400 ml-2">{time}</span>
        </div>
    }
}

#[component]
pub fn ChatMessage(message: Message) -> impl IntoView {
    let is_user = message.is_user();
    let web_badge = !is_user && message.used_web_search && !message.is_error;
    let avatar = avatar_class(&message);
    let bubble = bubble_class(&message);
    let molecule = message.molecule.clone();
    let results = message.web_results.clone();
    let actions = message
        .is_actionable()
        .then(|| message.reply_id.clone())
        .flatten()
        .map(|reply_id| view! { <Actions message=message.clone() reply_id /> });

    view! {
        <div class="flex gap-4" class:flex-row-reverse=is_user>
            <div class=format!(
                "flex-shrink-0 w-8 h-8 rounded-lg flex items-center justify-center text-white text-xs {avatar}",
            )>{if is_user { "You" } else { "✦" }}</div>
            <div class="flex-1" class:text-right=is_user>
                <div class=bubble>
                    {web_badge
                        .then(|| {
                            view! {
                                <div class="mb-2 pb-2 border-b border-slate-100">
                                    <span class="inline-flex items-center gap-1 px-2 py-0.5 text-xs font-medium rounded-full bg-blue-50 text-blue-600 border border-blue-200">
                                        Web results
                                    </span>
                                </div>
                            }
                        })}
                    <Body message />
                    {molecule.map(|image| view! { <MolecularImage image /> })}
                    {(!results.is_empty()).then(|| view! { <WebSearchResults results /> })}
                </div>
                {actions}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn avatar_follows_author() {
        let now = Utc::now();
        assert_eq!(avatar_class(&Message::user(1, "hi", now)), "bg-slate-900");
        assert_eq!(avatar_class(&Message::error(2, "Please wait", now)), "bg-red-500");
        assert!(avatar_class(&Message::bot(3, "hello", now)).contains("gradient"));
    }

    #[test]
    fn bot_markdown_keeps_line_breaks() {
        let parsed = markdown("Caffeine\nC8H10N4O2");
        assert!(parsed.contains("<br"));
    }
}
