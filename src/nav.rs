use crate::browser::text_data_url;
use crate::history::HistoryPanel;
use crate::loading::Loading;
use crate::login::Login;
use crate::state::{use_chat, ChatState, Modal, Tab};
use gini_core::models::{Document, DocumentSource, DocumentStatus};
use gini_core::transcript::{transcript, FILE_NAME};
use leptos::logging::{error, log};
use leptos::*;

fn delete_document(state: ChatState, document: Document) {
    let client = state.client();
    let identity = state.identity.get_untracked();
    spawn_local(async move {
        match client
            .delete_document(&identity, &document.id, document.drive_file_id.as_deref())
            .await
        {
            Ok(()) => {
                log!("Deleted {}", document.name);
                state
                    .documents
                    .update(|docs| docs.retain(|doc| doc.id != document.id));
                state
                    .selected_docs
                    .update(|selected| selected.retain(|id| *id != document.id));
            }
            Err(err) => error!("Failed to delete {}: {err}", document.name),
        }
    });
}

#[component]
fn TabButton(tab: Tab, label: &'static str) -> impl IntoView {
    let state = use_chat();
    let active = move || state.tab.get() == tab;
    view! {
        <button
            type="button"
            class="flex-1 flex items-center justify-center gap-1.5 py-3 text-sm font-medium border-b-2"
            class:border-blue-500=active
            class:text-blue-600=active
            class:border-transparent=move || !active()
            class:text-slate-500=move || !active()
            on:click=move |_| state.tab.set(tab)
        >
            {label}
            {move || {
                let count = state.documents.with(Vec::len);
                (tab == Tab::Documents && count > 0)
                    .then(|| {
                        view! {
                            <span class="ml-1 px-1.5 py-0.5 text-xs bg-blue-100 text-blue-600 rounded-full">
                                {count}
                            </span>
                        }
                    })
            }}
        </button>
    }
}

#[component]
fn DocumentRow(document: Document) -> impl IntoView {
    let state = use_chat();
    let (icon, tint) = match document.status {
        DocumentStatus::Uploading => ("…", "bg-blue-100 text-blue-600"),
        DocumentStatus::Ready => ("✓", "bg-green-100 text-green-600"),
        DocumentStatus::Error => ("!", "bg-red-100 text-red-600"),
    };
    let web = document.source == DocumentSource::Web;
    let knowledge = document.added_to_knowledge;
    let name = document.name.clone();
    let size = document.size.clone();

    view! {
        <div class="p-3 bg-slate-50 rounded-xl hover:bg-slate-100 group">
            <div class="flex items-start gap-3">
                <div class=format!(
                    "w-8 h-8 rounded-lg flex items-center justify-center text-sm font-bold {tint}",
                )>{icon}</div>
                <div class="flex-1 min-w-0">
                    <p class="text-sm font-medium text-slate-700 truncate">{name}</p>
                    <p class="text-xs text-slate-400">{size}</p>
                    <div class="flex items-center gap-2 mt-1">
                        {web.then(|| view! { <span class="text-xs text-blue-600">Web</span> })}
                        {if knowledge {
                            view! { <span class="text-xs text-purple-600">Knowledge</span> }
                        } else {
                            view! { <span class="text-xs text-amber-600">Explore</span> }
                        }}
                    </div>
                </div>
                <button
                    type="button"
                    title="Delete"
                    class="p-1 hover:bg-red-100 rounded text-red-400 opacity-0 group-hover:opacity-100"
                    on:click=move |_| delete_document(state, document.clone())
                >
                    "×"
                </button>
            </div>
        </div>
    }
}

#[component]
fn DocumentsPanel() -> impl IntoView {
    let state = use_chat();
    view! {
        <div class="space-y-2">
            <div class="flex items-center justify-between mb-2">
                <span class="text-xs font-medium text-slate-500">YOUR DOCUMENTS</span>
                <div class="flex items-center gap-1">
                    <button
                        type="button"
                        class="px-2 py-1 text-xs text-purple-600 hover:bg-purple-50 rounded disabled:opacity-40"
                        disabled=move || state.ready_documents() == 0
                        on:click=move |_| state.modal.set(Modal::DocumentSelector)
                    >
                        Chat with docs
                    </button>
                    <button
                        type="button"
                        class="px-2 py-1 text-xs text-slate-400 hover:bg-slate-100 rounded"
                        disabled=move || state.loading_docs.get()
                        on:click=move |_| state.refresh_documents()
                    >
                        Refresh
                    </button>
                </div>
            </div>
            <Show
                when=move || !state.loading_docs.get()
                fallback=|| {
                    view! {
                        <div class="text-center py-8">
                            <Loading class="w-6 h-6 text-slate-300" />
                        </div>
                    }
                }
            >
                <Show
                    when=move || state.documents.with(|docs| !docs.is_empty())
                    fallback=|| {
                        view! {
                            <div class="text-center py-8">
                                <p class="text-sm text-slate-400">No documents yet</p>
                            </div>
                        }
                    }
                >
                    <For
                        each=move || state.documents.get()
                        key=|doc| (doc.id.clone(), doc.status)
                        children=move |document| view! { <DocumentRow document /> }
                    />
                </Show>
            </Show>
        </div>
    }
}

#[component]
fn SavedPanel() -> impl IntoView {
    let state = use_chat();
    view! {
        <div class="space-y-2">
            <Show
                when=move || state.saved.with(|saved| !saved.is_empty())
                fallback=|| {
                    view! {
                        <p class="text-sm text-slate-400 text-center py-4">No saved analyses</p>
                    }
                }
            >
                <For
                    each=move || state.saved.get()
                    key=|analysis| analysis.id
                    children=move |analysis| {
                        view! {
                            <div class="p-3 bg-slate-50 rounded-xl hover:bg-slate-100 cursor-pointer">
                                <p class="text-sm font-medium text-slate-700">{analysis.title}</p>
                                <p class="text-xs text-slate-400 mt-0.5">{analysis.date}</p>
                                <p class="text-xs text-slate-500 mt-2 line-clamp-2">
                                    {analysis.snippet}
                                </p>
                            </div>
                        }
                    }
                />
            </Show>
        </div>
    }
}

#[component]
fn SessionPanel() -> impl IntoView {
    let state = use_chat();
    view! {
        <div class="p-3 bg-blue-50 rounded-xl border border-blue-100">
            <span class="text-sm font-medium text-blue-700">Current Session</span>
            <p class="text-xs text-blue-600 mt-1">
                {move || {
                    format!(
                        "{} messages • {} docs",
                        state.messages.with(Vec::len),
                        state.ready_documents(),
                    )
                }}
            </p>
        </div>
    }
}

#[component]
fn Export() -> impl IntoView {
    let state = use_chat();
    // Rebuilt on every change so the link always carries the current chat.
    let href = move || {
        let user_id = state.identity.with(|identity| identity.user_id.clone());
        state
            .messages
            .with(|messages| text_data_url(&transcript(&user_id, messages)))
    };
    view! {
        <Show when=move || state.messages.with(|messages| messages.len() > 1)>
            <div class="p-3 border-t border-slate-100">
                <a
                    href=href
                    download=FILE_NAME
                    class="w-full flex items-center justify-center gap-2 px-3 py-2 bg-slate-100 hover:bg-slate-200 text-slate-700 rounded-lg text-sm"
                >
                    Export
                </a>
            </div>
        </Show>
    }
}

#[component]
pub fn Nav() -> impl IntoView {
    let state = use_chat();
    view! {
        <div
            class="w-72 shrink-0 bg-white border-r border-slate-200 flex flex-col overflow-hidden min-h-dvh max-h-dvh"
            class:hidden=move || !state.sidebar_open.get()
        >
            <div class="p-4 border-b border-slate-100">
                <div class="flex items-center gap-3">
                    <div class="w-10 h-10 rounded-xl bg-gradient-to-br from-blue-500 to-purple-600 flex items-center justify-center shadow-lg text-white">
                        "✦"
                    </div>
                    <div>
                        <h1 class="font-semibold text-slate-900">Dr. Gini</h1>
                        <p class="text-xs text-slate-500">Research Copilot</p>
                    </div>
                </div>
                <div class="mt-3 flex items-center justify-between gap-2 px-2 py-1.5 bg-slate-100 rounded-lg">
                    <span class="text-xs text-slate-600 truncate">
                        {move || state.identity.with(|identity| identity.user_label().to_string())}
                    </span>
                    <Login />
                </div>
            </div>
            <div class="p-3 space-y-2">
                <button
                    type="button"
                    class="w-full flex items-center gap-2 px-4 py-2.5 bg-slate-900 text-white rounded-xl hover:bg-slate-800"
                    on:click=move |_| state.reset()
                >
                    <span class="font-medium">New Research</span>
                </button>
                <button
                    type="button"
                    class="w-full flex items-center gap-2 px-4 py-2.5 border-2 border-dashed border-slate-200 text-slate-600 rounded-xl hover:border-blue-400 hover:text-blue-600"
                    on:click=move |_| state.modal.set(Modal::Upload)
                >
                    <span class="font-medium">Upload Document</span>
                </button>
            </div>
            <div class="flex border-b border-slate-100 px-3">
                <TabButton tab=Tab::Chat label="Chat" />
                <TabButton tab=Tab::Documents label="My Docs" />
                <TabButton tab=Tab::History label="History" />
                <TabButton tab=Tab::Saved label="Saved" />
            </div>
            <div class="flex-1 overflow-y-auto p-3">
                {move || match state.tab.get() {
                    Tab::Chat => view! { <SessionPanel /> },
                    Tab::Documents => view! { <DocumentsPanel /> },
                    Tab::History => view! { <HistoryPanel /> },
                    Tab::Saved => view! { <SavedPanel /> },
                }}
            </div>
            <Export />
        </div>
    }
}
