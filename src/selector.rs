use crate::state::{use_chat, Modal};
use leptos::*;

/// Picks the ready documents the next questions are answered from.
#[component]
pub fn DocumentSelector() -> impl IntoView {
    let state = use_chat();
    let toggle = move |id: String| {
        state.selected_docs.update(|selected| {
            match selected.iter().position(|current| *current == id) {
                Some(index) => {
                    selected.remove(index);
                }
                None => selected.push(id),
            }
        });
    };
    let close = move || state.modal.set(Modal::Closed);

    view! {
        <Show when=move || state.modal.with(|modal| *modal == Modal::DocumentSelector)>
            <div class="fixed inset-0 bg-black/50 flex items-center justify-center z-50 p-4">
                <div class="bg-white rounded-2xl max-w-lg w-full shadow-2xl">
                    <div class="p-6">
                        <div class="flex items-center justify-between mb-4">
                            <h2 class="text-xl font-semibold text-slate-900">Chat with documents</h2>
                            <button
                                type="button"
                                class="p-2 hover:bg-slate-100 rounded-lg text-slate-500"
                                on:click=move |_| close()
                            >
                                "×"
                            </button>
                        </div>
                        <p class="text-xs text-slate-500 mb-4">
                            Questions are answered from the selected documents until the selection is cleared.
                        </p>
                        <div class="space-y-2 max-h-72 overflow-y-auto">
                            {move || {
                                let ready: Vec<_> = state
                                    .documents
                                    .get()
                                    .into_iter()
                                    .filter(|doc| doc.is_ready())
                                    .collect();
                                if ready.is_empty() {
                                    return view! {
                                        <p class="text-sm text-slate-400 text-center py-6">
                                            No ready documents
                                        </p>
                                    }
                                        .into_view();
                                }
                                ready
                                    .into_iter()
                                    .map(|doc| {
                                        let id = doc.id.clone();
                                        let checked = {
                                            let id = id.clone();
                                            move || state.selected_docs.with(|selected| selected.contains(&id))
                                        };
                                        view! {
                                            <label class="flex items-center gap-3 p-3 bg-slate-50 rounded-lg cursor-pointer hover:bg-slate-100">
                                                <input
                                                    type="checkbox"
                                                    class="w-4 h-4 rounded border-slate-300 text-blue-600"
                                                    prop:checked=checked
                                                    on:change=move |_| toggle(id.clone())
                                                />
                                                <div class="flex-1 min-w-0">
                                                    <p class="text-sm font-medium text-slate-700 truncate">
                                                        {doc.name}
                                                    </p>
                                                    <p class="text-xs text-slate-400">{doc.size}</p>
                                                </div>
                                            </label>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </div>
                        <div class="flex gap-3 mt-6">
                            <button
                                type="button"
                                class="flex-1 py-2.5 bg-slate-900 text-white rounded-xl font-medium disabled:opacity-40"
                                disabled=move || state.selected_docs.with(Vec::is_empty)
                                on:click=move |_| close()
                            >
                                {move || {
                                    format!(
                                        "Use {} document(s)",
                                        state.selected_docs.with(Vec::len),
                                    )
                                }}
                            </button>
                            <button
                                type="button"
                                class="px-6 py-2.5 border border-slate-300 text-slate-700 rounded-xl"
                                on:click=move |_| state.selected_docs.set(vec![])
                            >
                                Clear
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </Show>
    }
}
