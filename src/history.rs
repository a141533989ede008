use crate::loading::Loading;
use crate::state::{use_chat, ChatState, Tab};
use chrono::Local;
use gini_core::client::conversation_title;
use gini_core::models::{Conversation, Message};
use gini_core::Endpoint;
use leptos::logging::{error, log};
use leptos::*;

fn save_current(state: ChatState) {
    let messages: Vec<Message> = state.messages.with_untracked(|messages| {
        messages
            .iter()
            .skip(1)
            .filter(|message| !message.is_processing)
            .cloned()
            .collect()
    });
    if messages.is_empty() {
        state.notify_error("Nothing to save yet.");
        return;
    }
    let title = conversation_title(&messages);
    let current = state.conversation_id.get_untracked();
    let client = state.client();
    let identity = state.identity.get_untracked();
    spawn_local(async move {
        match client
            .save_history(&identity, current.as_deref(), &title, &messages)
            .await
        {
            Ok(id) => {
                log!("Saved conversation {id:?}");
                state.conversation_id.set(id);
                state.refresh_history();
            }
            Err(err) => {
                error!("Saving conversation failed: {err}");
                state.notify_error(format!("Conversation could not be saved: {err}"));
            }
        }
    });
}

fn load(state: ChatState, conversation_id: String) {
    let client = state.client();
    let identity = state.identity.get_untracked();
    state.loading_history.set(true);
    spawn_local(async move {
        match client.load_history(&identity, &conversation_id).await {
            Ok(loaded) => {
                let loaded: Vec<Message> = loaded
                    .into_iter()
                    .map(|mut message| {
                        message.id = state.next_id();
                        message
                    })
                    .collect();
                state.reset();
                state.messages.update(|messages| messages.extend(loaded));
                state.conversation_id.set(Some(conversation_id));
                state.tab.set(Tab::Chat);
            }
            Err(err) => {
                error!("Loading conversation failed: {err}");
                state.notify_error(format!("Conversation could not be loaded: {err}"));
            }
        }
        state.loading_history.set(false);
    });
}

fn toggle_favorite(state: ChatState, conversation_id: String, favorite: bool) {
    state.conversations.update(|conversations| {
        if let Some(conversation) = conversations.iter_mut().find(|c| c.id == conversation_id) {
            conversation.favorite = favorite;
        }
    });
    let client = state.client();
    let identity = state.identity.get_untracked();
    spawn_local(async move {
        if let Err(err) = client
            .toggle_favorite(&identity, &conversation_id, favorite)
            .await
        {
            error!("Favorite toggle failed: {err}");
        }
    });
}

fn delete(state: ChatState, conversation_id: String) {
    state
        .conversations
        .update(|conversations| conversations.retain(|c| c.id != conversation_id));
    if state.conversation_id.get_untracked().as_deref() == Some(conversation_id.as_str()) {
        state.conversation_id.set(None);
    }
    let client = state.client();
    let identity = state.identity.get_untracked();
    spawn_local(async move {
        if let Err(err) = client.delete_history(&identity, &conversation_id).await {
            error!("Deleting conversation failed: {err}");
        }
    });
}

#[component]
fn ConversationRow(conversation: Conversation) -> impl IntoView {
    let state = use_chat();
    let Conversation {
        id,
        title,
        message_count,
        timestamp,
        favorite,
    } = conversation;
    let when = timestamp
        .map(|at| at.with_timezone(&Local).format("%b %d").to_string())
        .unwrap_or_default();
    let active = {
        let id = id.clone();
        create_memo(move |_| {
            state
                .conversation_id
                .with(|current| current.as_deref() == Some(id.as_str()))
        })
    };
    let load_id = id.clone();
    let favorite_id = id.clone();

    view! {
        <div
            class="p-3 bg-slate-50 rounded-xl hover:bg-slate-100 group cursor-pointer"
            class:ring-2=move || active.get()
            class:ring-blue-200=move || active.get()
            on:click=move |_| load(state, load_id.clone())
        >
            <div class="flex items-start gap-2">
                <div class="flex-1 min-w-0">
                    <p class="text-sm font-medium text-slate-700 truncate">{title}</p>
                    <p class="text-xs text-slate-400">
                        {format!("{message_count} messages")} {(!when.is_empty()).then(|| format!(" • {when}"))}
                    </p>
                </div>
                <button
                    type="button"
                    title="Favorite"
                    class="p-1 rounded"
                    class:text-amber-400=favorite
                    class:text-slate-300=!favorite
                    on:click=move |ev| {
                        ev.stop_propagation();
                        toggle_favorite(state, favorite_id.clone(), !favorite);
                    }
                >
                    "★"
                </button>
                <button
                    type="button"
                    title="Delete"
                    class="p-1 hover:bg-red-100 rounded text-red-400 opacity-0 group-hover:opacity-100"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        delete(state, id.clone());
                    }
                >
                    "×"
                </button>
            </div>
        </div>
    }
}

#[component]
pub fn HistoryPanel() -> impl IntoView {
    let state = use_chat();
    let configured = state.client().config().has(Endpoint::History);
    if !configured {
        return view! {
            <p class="text-sm text-slate-400 text-center py-4">
                Conversation history is not configured
            </p>
        }
        .into_view();
    }

    view! {
        <div class="space-y-2">
            <div class="flex items-center justify-between mb-2">
                <span class="text-xs font-medium text-slate-500">SAVED CONVERSATIONS</span>
                <div class="flex items-center gap-1">
                    <button
                        type="button"
                        class="px-2 py-1 text-xs text-blue-600 hover:bg-blue-50 rounded"
                        disabled=move || state.messages.with(|messages| messages.len() < 2)
                        on:click=move |_| save_current(state)
                    >
                        Save current
                    </button>
                    <button
                        type="button"
                        class="px-2 py-1 text-xs text-slate-400 hover:bg-slate-100 rounded"
                        disabled=move || state.loading_history.get()
                        on:click=move |_| state.refresh_history()
                    >
                        Refresh
                    </button>
                </div>
            </div>
            <Show
                when=move || !state.loading_history.get()
                fallback=|| {
                    view! {
                        <div class="text-center py-8">
                            <Loading class="w-6 h-6 text-slate-300" />
                        </div>
                    }
                }
            >
                <Show
                    when=move || state.conversations.with(|c| !c.is_empty())
                    fallback=|| {
                        view! {
                            <p class="text-sm text-slate-400 text-center py-4">
                                No saved conversations
                            </p>
                        }
                    }
                >
                    <For
                        each=move || state.conversations.get()
                        key=|conversation| (conversation.id.clone(), conversation.favorite)
                        children=move |conversation| view! { <ConversationRow conversation /> }
                    />
                </Show>
            </Show>
        </div>
    }
    .into_view()
}
