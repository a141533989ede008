use crate::browser::BrowserTimer;
use crate::message::ChatMessage;
use crate::state::{use_chat, ChatState, Modal};
use chrono::Utc;
use gini_core::client::UserDocument;
use gini_core::format::format_time_left;
use gini_core::intent::detect_image_requirement;
use gini_core::models::Message;
use gini_core::pipeline::{opening_stage, Ask, Pipeline, Route};
use gini_core::status::{processing_html, ROTATION_PERIOD};
use leptos::ev::KeyboardEvent;
use leptos::logging::{log, warn};
use leptos::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Suggestion {
    text: &'static str,
    color: &'static str,
}

const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        text: "Show caffeine structure",
        color: "text-purple-500",
    },
    Suggestion {
        text: "Show chromene molecular structure",
        color: "text-blue-500",
    },
    Suggestion {
        text: "Search latest chromene research",
        color: "text-green-500",
    },
    Suggestion {
        text: "Summarize my uploaded documents",
        color: "text-amber-500",
    },
];

/// Suggestions stay visible until the conversation gets going.
const SUGGESTIONS_UNTIL: usize = 2;

/// Sends the current input through the pipeline. The processing message is
/// swapped for the final reply once both requests have settled.
pub fn send_message(state: ChatState) {
    let text = state.input.get_untracked();
    if text.trim().is_empty() || state.is_loading.get_untracked() {
        return;
    }
    let now = Utc::now();
    let cooldown = state.cooldown.get_untracked();
    if !cooldown.is_ready(now) {
        state.cooldown_left.set(cooldown.remaining_secs(now));
        state.notify_error(cooldown.wait_message(now));
        return;
    }

    let client = state.client();
    let web_search = state.web_search.get_untracked();
    let selected = state.selected_docs.get_untracked();
    let route = Route::choose(client.config(), web_search, &selected);
    let documents: Vec<UserDocument> = state.documents.with_untracked(|docs| {
        docs.iter()
            .filter(|doc| doc.is_ready())
            .map(UserDocument::from)
            .collect()
    });
    log!("Sending via {:?} with {} documents", route, documents.len());

    let mut question = Message::user(state.next_id(), text.clone(), now);
    question.used_web_search = web_search;
    state.push(question);
    state.input.set(String::new());
    state.is_loading.set(true);
    state.cooldown.update(|cooldown| cooldown.start(now));
    state.tick_cooldown();

    let intent = detect_image_requirement(&text);
    let stage = Rc::new(RefCell::new(opening_stage(&intent, web_search)));
    let tick = Rc::new(Cell::new(0usize));
    state.status_html.set(processing_html(&stage.borrow(), 0));
    let processing_id = state.next_id();
    state.push(Message::processing(processing_id, String::new(), now));

    let rotation = {
        let stage = stage.clone();
        let tick = tick.clone();
        set_interval_with_handle(
            move || {
                tick.set(tick.get() + 1);
                state
                    .status_html
                    .set(processing_html(&stage.borrow(), tick.get()));
            },
            ROTATION_PERIOD,
        )
    };
    let rotation = match rotation {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("Status rotation unavailable: {err:?}");
            None
        }
    };

    let ask = Ask {
        text,
        use_web_search: web_search,
        documents,
        route,
    };
    let identity = state.identity.get_untracked();
    spawn_local(async move {
        let timer = BrowserTimer;
        let pipeline = Pipeline::new(client.as_ref(), &timer, client.config().timeout);
        let reply = pipeline
            .run(&identity, ask, now, |next| {
                state.status_html.set(processing_html(&next, tick.get()));
                *stage.borrow_mut() = next;
            })
            .await;
        if let Some(handle) = rotation {
            handle.clear();
        }
        let message = reply.into_message(state.next_id(), Utc::now());
        state.replace(processing_id, message);
        state.status_html.set(String::new());
        state.is_loading.set(false);
    });
}

#[component]
fn Header() -> impl IntoView {
    let state = use_chat();
    view! {
        <div class="h-14 border-b border-slate-200 bg-white/80 backdrop-blur-sm flex items-center justify-between px-4">
            <div class="flex items-center gap-3">
                <button
                    type="button"
                    class="p-2 hover:bg-slate-100 rounded-lg text-slate-500"
                    on:click=move |_| state.sidebar_open.update(|open| *open = !*open)
                >
                    <svg viewBox="0 0 10 8" width="20">
                        <path
                            d="M1 1h8M1 4h 8M1 7h8"
                            stroke="currentColor"
                            fill="currentColor"
                            stroke-width="2"
                            stroke-linecap="round"
                        />
                    </svg>
                </button>
                <div class="flex items-center gap-2">
                    <div
                        class="w-2 h-2 rounded-full"
                        class:bg-amber-400=move || state.is_loading.get()
                        class:animate-pulse=move || state.is_loading.get()
                        class:bg-green-400=move || !state.is_loading.get()
                    />
                    <span class="text-sm text-slate-600">
                        {move || if state.is_loading.get() { "Processing..." } else { "Ready" }}
                    </span>
                </div>
                {move || {
                    let ready = state.ready_documents();
                    (ready > 0)
                        .then(|| {
                            view! {
                                <div class="flex items-center gap-1 px-2 py-1 bg-blue-50 text-blue-600 rounded-lg text-xs">
                                    {format!("{ready} docs")}
                                </div>
                            }
                        })
                }}
                {move || {
                    let selected = state.selected_docs.with(Vec::len);
                    (selected > 0)
                        .then(|| {
                            view! {
                                <button
                                    type="button"
                                    class="flex items-center gap-1 px-2 py-1 bg-purple-50 text-purple-600 rounded-lg text-xs"
                                    on:click=move |_| state.modal.set(Modal::DocumentSelector)
                                >
                                    {format!("Chatting with {selected} selected")}
                                </button>
                            }
                        })
                }}
            </div>
            <Show when=move || { state.cooldown_left.get() > 0 }>
                <div class="flex items-center gap-2 px-3 py-1.5 bg-amber-50 text-amber-700 rounded-lg text-sm">
                    {move || format_time_left(state.cooldown_left.get())}
                </div>
            </Show>
        </div>
    }
}

#[component]
fn Suggestions() -> impl IntoView {
    let state = use_chat();
    view! {
        <Show when=move || state.messages.with(|messages| messages.len() <= SUGGESTIONS_UNTIL)>
            <div class="px-4 pb-4">
                <div class="max-w-3xl mx-auto">
                    <p class="text-xs text-slate-500 mb-3 font-medium">TRY THESE</p>
                    <div class="grid grid-cols-2 gap-2">
                        {SUGGESTIONS
                            .iter()
                            .map(|suggestion| {
                                let text = suggestion.text;
                                view! {
                                    <button
                                        type="button"
                                        class="flex items-center gap-3 p-3 bg-white border border-slate-200 rounded-xl hover:border-blue-300 hover:shadow-sm text-left group"
                                        on:click=move |_| {
                                            state.input.set(text.to_string());
                                            if text.contains("Search") {
                                                state.web_search.set(true);
                                            }
                                        }
                                    >
                                        <span class=format!("w-2 h-2 rounded-full bg-current {}", suggestion.color) />
                                        <span class="text-sm text-slate-700 flex-1">{text}</span>
                                        <span class="text-slate-300 group-hover:text-blue-500">"→"</span>
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>
            </div>
        </Show>
    }
}

#[component]
fn Composer() -> impl IntoView {
    let state = use_chat();
    let blocked = move || state.is_loading.get() || state.cooldown_left.get() > 0;
    let on_keydown = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send_message(state);
        }
    };

    view! {
        <div class="border-t border-slate-200 bg-white p-4">
            <div class="max-w-3xl mx-auto">
                <div class="flex items-end gap-3 bg-slate-50 rounded-2xl p-2 border border-slate-200 focus-within:border-blue-400 focus-within:ring-2 focus-within:ring-blue-100">
                    <button
                        type="button"
                        title="Upload"
                        class="p-2 text-slate-400 hover:text-slate-600 hover:bg-slate-200 rounded-xl"
                        on:click=move |_| state.modal.set(Modal::Upload)
                    >
                        "+"
                    </button>
                    <label for="chat" class="sr-only">
                        Your message
                    </label>
                    <textarea
                        id="chat"
                        rows="1"
                        class="flex-1 bg-transparent border-none outline-none resize-none text-sm text-slate-700 placeholder:text-slate-400 py-2 max-h-32"
                        placeholder="Ask about molecules, search papers, or chat with documents..."
                        prop:value=move || state.input.get()
                        prop:disabled=blocked
                        on:input=move |ev| state.input.set(event_target_value(&ev))
                        on:keydown=on_keydown
                    />
                    <button
                        type="button"
                        class="p-2.5 bg-slate-900 text-white rounded-xl hover:bg-slate-800 disabled:opacity-40 disabled:cursor-not-allowed"
                        disabled=move || blocked() || state.input.with(|input| input.trim().is_empty())
                        on:click=move |_| send_message(state)
                    >
                        <svg
                            class="w-4 h-4 rotate-90"
                            aria-hidden="true"
                            xmlns="http://www.w3.org/2000/svg"
                            fill="currentColor"
                            viewBox="0 0 18 20"
                        >
                            <path d="m17.914 18.594-8-18a1 1 0 0 0-1.828 0l-8 18a1 1 0 0 0 1.157 1.376L8 18.281V9a1 1 0 0 1 2 0v9.281l6.758 1.689a1 1 0 0 0 1.156-1.376Z" />
                        </svg>
                        <span class="sr-only">Send message</span>
                    </button>
                </div>
                <div class="flex items-center justify-between mt-3">
                    <label class="flex items-center gap-2 cursor-pointer">
                        <input
                            type="checkbox"
                            class="w-4 h-4 rounded border-slate-300 text-blue-600"
                            prop:checked=move || state.web_search.get()
                            on:change=move |ev| state.web_search.set(event_target_checked(&ev))
                        />
                        <span
                            class="text-sm"
                            class:text-blue-600=move || state.web_search.get()
                            class:font-medium=move || state.web_search.get()
                            class:text-slate-500=move || !state.web_search.get()
                        >
                            Web search
                        </span>
                    </label>
                    <span class="text-xs text-slate-400">
                        {move || {
                            format!(
                                "Session: {}",
                                state.identity.with(|identity| identity.session_label().to_string()),
                            )
                        }}
                    </span>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn Chat() -> impl IntoView {
    let state = use_chat();
    let bottom = create_node_ref::<html::Div>();
    create_effect(move |_| {
        state.messages.with(Vec::len);
        if let Some(anchor) = bottom.get() {
            anchor.scroll_into_view();
        }
    });

    view! {
        <div class="flex-1 flex flex-col min-w-0 h-dvh max-h-dvh">
            <Header />
            <main class="flex-1 overflow-y-auto">
                <div class="max-w-3xl mx-auto px-4 py-6 space-y-6">
                    <For
                        each=move || state.messages.get()
                        key=|message| message.id
                        children=move |message| view! { <ChatMessage message /> }
                    />
                    <div node_ref=bottom />
                </div>
            </main>
            <Suggestions />
            <Composer />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gini_core::{Config, Identity};

    fn state() -> ChatState {
        ChatState::new(
            Config::default(),
            Identity::anonymous("user_1".into(), "session_1".into()),
        )
    }

    #[test]
    fn cooling_down_refuses_to_send() {
        let runtime = create_runtime();
        let state = state();
        state.cooldown.update(|cooldown| cooldown.start(Utc::now()));
        state.input.set("Show caffeine structure".into());

        send_message(state);

        state.messages.with(|messages| {
            assert_eq!(messages.len(), 2);
            let refusal = &messages[1];
            assert!(refusal.is_error);
            assert!(refusal.content.starts_with("Please wait "), "{}", refusal.content);
            assert!(refusal.content.ends_with('.'));
            assert!(!messages.iter().any(|message| message.is_user()));
        });
        assert_eq!(state.input.get_untracked(), "Show caffeine structure");
        assert!(!state.is_loading.get_untracked());
        assert!(state.cooldown_left.get_untracked() > 0);
        runtime.dispose();
    }

    #[test]
    fn blank_input_is_ignored() {
        let runtime = create_runtime();
        let state = state();
        state.input.set("   ".into());
        send_message(state);
        assert_eq!(state.messages.with(Vec::len), 1);
        assert!(!state.is_loading.get_untracked());
        runtime.dispose();
    }
}
