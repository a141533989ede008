use crate::browser::open_in_new_tab;
use crate::loading::Loading;
use crate::state::{use_chat, ChatState};
use chrono::Utc;
use gini_core::client::WebDocumentAction;
use gini_core::models::{Document, DocumentSource, DocumentStatus, WebResult};
use leptos::logging::error;
use leptos::*;
use serde_json::Value;

async fn add_web_document(state: ChatState, result: WebResult, action: WebDocumentAction) {
    let client = state.client();
    let identity = state.identity.get_untracked();
    match client.add_web_document(&identity, &result, action).await {
        Ok(receipt) => match action {
            WebDocumentAction::AddToChat => {
                let id = match receipt.id {
                    Some(Value::String(id)) => id,
                    Some(Value::Number(id)) => id.to_string(),
                    _ => Utc::now().timestamp_millis().to_string(),
                };
                state.documents.update(|docs| {
                    docs.push(Document {
                        id,
                        name: result.title.clone(),
                        size: "Web".to_string(),
                        status: DocumentStatus::Ready,
                        drive_file_id: receipt.file_id,
                        added_to_knowledge: false,
                        source: DocumentSource::Web,
                    })
                });
                state.notify(format!("✅ \"{}\" added to session.", result.title));
            }
            WebDocumentAction::AddToKnowledge => {
                state.notify(format!(
                    "✅ \"{}\" added to Knowledge Repository.",
                    result.title
                ));
            }
        },
        Err(err) => {
            error!("Web document {action:?} failed: {err}");
            state.notify_error(format!("Could not add \"{}\": {err}", result.title));
        }
    }
}

#[component]
fn ResultCard(index: usize, result: WebResult, busy: RwSignal<Option<usize>>) -> impl IntoView {
    let state = use_chat();
    let is_busy = move || busy.get() == Some(index);
    let run = move |action: WebDocumentAction, result: WebResult| {
        busy.set(Some(index));
        spawn_local(async move {
            add_web_document(state, result, action).await;
            busy.set(None);
        });
    };
    let byline = result.byline();
    let download = result.pdf_url.clone();
    let view_url = result.url.clone();
    let summary = result.summary.clone();
    let title = result.title.clone();
    let for_chat = result.clone();
    let for_knowledge = result;

    view! {
        <div class="bg-white rounded-lg p-4 border border-blue-100 shadow-sm">
            <div class="flex-1 min-w-0">
                <h4 class="font-medium text-slate-800 text-sm">{title}</h4>
                <p class="text-xs text-slate-500 mt-1">{byline}</p>
                {summary
                    .map(|summary| {
                        view! { <p class="text-xs text-slate-600 mt-2 line-clamp-2">{summary}</p> }
                    })}
                <div class="flex items-center gap-2 mt-3">
                    {view_url
                        .map(|url| {
                            view! {
                                <a
                                    href=url
                                    target="_blank"
                                    rel="noopener noreferrer"
                                    class="flex items-center gap-1 px-2 py-1 text-xs text-slate-600 hover:bg-slate-100 rounded-lg"
                                >
                                    View
                                </a>
                            }
                        })}
                    {download
                        .map(|url| {
                            view! {
                                <button
                                    type="button"
                                    class="flex items-center gap-1 px-2 py-1 text-xs text-green-600 hover:bg-green-50 rounded-lg"
                                    on:click=move |_| open_in_new_tab(&url)
                                >
                                    Download
                                </button>
                            }
                        })}
                    <button
                        type="button"
                        class="flex items-center gap-1 px-2 py-1 text-xs text-blue-600 hover:bg-blue-50 rounded-lg disabled:opacity-50"
                        disabled=is_busy
                        on:click=move |_| run(WebDocumentAction::AddToChat, for_chat.clone())
                    >
                        <Show when=is_busy>
                            <Loading class="w-3 h-3" />
                        </Show>
                        Chat
                    </button>
                    <button
                        type="button"
                        class="flex items-center gap-1 px-2 py-1 text-xs text-purple-600 hover:bg-purple-50 rounded-lg disabled:opacity-50"
                        disabled=is_busy
                        on:click=move |_| run(WebDocumentAction::AddToKnowledge, for_knowledge.clone())
                    >
                        <Show when=is_busy>
                            <Loading class="w-3 h-3" />
                        </Show>
                        Save
                    </button>
                </div>
            </div>
        </div>
    }
}

/// Collapsible list of papers attached to a bot reply.
#[component]
pub fn WebSearchResults(results: Vec<WebResult>) -> impl IntoView {
    let (expanded, set_expanded) = create_signal(true);
    let busy = create_rw_signal(None::<usize>);
    let count = results.len();
    let cards = results
        .into_iter()
        .enumerate()
        .map(|(index, result)| view! { <ResultCard index result busy /> })
        .collect_view();

    view! {
        <div class="bg-gradient-to-r from-blue-50 to-indigo-50 border border-blue-200 rounded-xl p-4 my-4">
            <button
                type="button"
                class="w-full flex items-center justify-between mb-3"
                on:click=move |_| set_expanded.update(|open| *open = !*open)
            >
                <div class="flex items-center gap-2">
                    <span class="font-semibold text-blue-800">Web Search Results</span>
                    <span class="px-2 py-0.5 bg-blue-100 text-blue-600 text-xs rounded-full">
                        {format!("{count} found")}
                    </span>
                </div>
                <span class="text-blue-600 text-xs">
                    {move || if expanded.get() { "▲" } else { "▼" }}
                </span>
            </button>
            <div class="space-y-3" class:hidden=move || !expanded.get()>
                {cards}
            </div>
        </div>
    }
}
