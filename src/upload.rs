use crate::browser::read_file;
use crate::loading::Loading;
use crate::state::{use_chat, ChatState, Modal};
use gini_core::client::{Upload, UploadReceipt};
use gini_core::format::format_size;
use gini_core::models::{Document, DocumentSource, DocumentStatus};
use leptos::logging::{error, log};
use leptos::*;
use web_sys::{Event, File, HtmlInputElement};

const ACCEPT: &str = ".pdf,.doc,.docx,.txt,.csv,.xlsx";

/// Lists a file that is about to be uploaded and returns its local id.
fn begin_upload(state: ChatState, name: &str, bytes: u64, add_to_knowledge: bool) -> String {
    let local_id = format!("local-{}", state.next_id());
    state.documents.update(|docs| {
        docs.push(Document {
            id: local_id.clone(),
            name: name.to_string(),
            size: format_size(bytes),
            status: DocumentStatus::Uploading,
            drive_file_id: None,
            added_to_knowledge: add_to_knowledge,
            source: DocumentSource::Upload,
        })
    });
    local_id
}

/// Flips the listed file to ready or error.
fn finish_upload(state: ChatState, local_id: &str, result: &gini_core::Result<UploadReceipt>) {
    state.documents.update(|docs| {
        let Some(doc) = docs.iter_mut().find(|doc| doc.id == local_id) else {
            return;
        };
        match result {
            Ok(receipt) => {
                doc.status = DocumentStatus::Ready;
                doc.drive_file_id = receipt.file_id.clone();
            }
            Err(_) => doc.status = DocumentStatus::Error,
        }
    });
}

/// Uploads `files` one after the other. Each file shows up in the document
/// list immediately and flips to ready or error when its upload settles.
pub fn upload_files(state: ChatState, files: Vec<File>, add_to_knowledge: bool) {
    state.is_uploading.set(true);
    let client = state.client();
    let identity = state.identity.get_untracked();
    spawn_local(async move {
        for file in files {
            let name = file.name();
            let local_id = begin_upload(state, &name, file.size() as u64, add_to_knowledge);

            let result = async {
                let bytes = read_file(&file).await?;
                let upload = Upload {
                    name: name.clone(),
                    mime: file.type_(),
                    bytes,
                    add_to_knowledge,
                };
                client.upload(&identity, &upload).await
            }
            .await;

            finish_upload(state, &local_id, &result);
            match result {
                Ok(_) => log!("Uploaded {name}"),
                Err(err) => error!("Upload of {name} failed: {err}"),
            }
        }
        state.is_uploading.set(false);
        state.modal.set(Modal::Closed);
    });
}

#[component]
pub fn UploadModal() -> impl IntoView {
    let state = use_chat();
    let files = create_rw_signal(Vec::<File>::new());
    let add_to_knowledge = create_rw_signal(false);

    let on_select = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(list) = input.files() {
            let picked: Vec<File> = (0..list.length()).filter_map(|i| list.get(i)).collect();
            files.update(|files| files.extend(picked));
        }
        // Lets the same file be picked again after removal.
        input.set_value("");
    };
    let close = move || {
        files.set(vec![]);
        add_to_knowledge.set(false);
        state.modal.set(Modal::Closed);
    };
    let start = move |_| {
        let picked = files.get_untracked();
        if picked.is_empty() {
            return;
        }
        upload_files(state, picked, add_to_knowledge.get_untracked());
        files.set(vec![]);
        add_to_knowledge.set(false);
    };

    view! {
        <Show when=move || state.modal.with(|modal| *modal == Modal::Upload)>
            <div class="fixed inset-0 bg-black/50 flex items-center justify-center z-50 p-4">
                <div class="bg-white rounded-2xl max-w-lg w-full shadow-2xl">
                    <div class="p-6">
                        <div class="flex items-center justify-between mb-6">
                            <h2 class="text-xl font-semibold text-slate-900">Upload Documents</h2>
                            <button
                                type="button"
                                class="p-2 hover:bg-slate-100 rounded-lg text-slate-500"
                                on:click=move |_| close()
                            >
                                "×"
                            </button>
                        </div>
                        <label class="block border-2 border-dashed border-slate-200 rounded-xl p-8 text-center hover:border-blue-400 cursor-pointer">
                            <p class="text-sm text-slate-600 font-medium">Click to select files</p>
                            <p class="text-xs text-slate-400 mt-1">PDF, DOCX, TXT, CSV</p>
                            <input
                                type="file"
                                multiple
                                accept=ACCEPT
                                class="hidden"
                                on:change=on_select
                            />
                        </label>
                        <Show when=move || files.with(|files| !files.is_empty())>
                            <div class="mt-4 space-y-2 max-h-40 overflow-y-auto">
                                {move || {
                                    files
                                        .get()
                                        .into_iter()
                                        .enumerate()
                                        .map(|(index, file)| {
                                            view! {
                                                <div class="flex items-center gap-3 p-3 bg-slate-50 rounded-lg">
                                                    <div class="flex-1 min-w-0">
                                                        <p class="text-sm font-medium text-slate-700 truncate">
                                                            {file.name()}
                                                        </p>
                                                        <p class="text-xs text-slate-400">
                                                            {format_size(file.size() as u64)}
                                                        </p>
                                                    </div>
                                                    <button
                                                        type="button"
                                                        class="p-1 hover:bg-slate-200 rounded text-slate-400"
                                                        on:click=move |_| {
                                                            files
                                                                .update(|files| {
                                                                    if index < files.len() {
                                                                        files.remove(index);
                                                                    }
                                                                })
                                                        }
                                                    >
                                                        "×"
                                                    </button>
                                                </div>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </div>
                        </Show>
                        <div class="mt-6 p-4 bg-slate-50 rounded-xl">
                            <label class="flex items-start gap-3 cursor-pointer">
                                <input
                                    type="checkbox"
                                    class="w-4 h-4 mt-0.5 rounded border-slate-300 text-blue-600"
                                    prop:checked=add_to_knowledge
                                    on:change=move |ev| add_to_knowledge.set(event_target_checked(&ev))
                                />
                                <div>
                                    <span class="text-sm font-medium text-slate-700">
                                        Add to Knowledge Repository
                                    </span>
                                    <p class="text-xs text-slate-500 mt-1">
                                        Document will be indexed for future queries.
                                    </p>
                                </div>
                            </label>
                            <div
                                class="mt-3 p-2 rounded-lg text-xs"
                                class:bg-blue-100=add_to_knowledge
                                class:text-blue-700=add_to_knowledge
                                class:bg-amber-50=move || !add_to_knowledge.get()
                                class:text-amber-700=move || !add_to_knowledge.get()
                            >
                                {move || {
                                    if add_to_knowledge.get() {
                                        view! {
                                            <strong>"Permanent:"</strong>
                                            " Shared knowledge"
                                        }
                                    } else {
                                        view! {
                                            <strong>"Explore:"</strong>
                                            " This session only"
                                        }
                                    }
                                }}
                            </div>
                        </div>
                        <div class="flex gap-3 mt-6">
                            <button
                                type="button"
                                class="flex-1 flex items-center justify-center gap-2 py-2.5 bg-slate-900 text-white rounded-xl disabled:opacity-40 font-medium"
                                disabled=move || {
                                    state.is_uploading.get() || files.with(|files| files.is_empty())
                                }
                                on:click=start
                            >
                                <Show
                                    when=move || state.is_uploading.get()
                                    fallback=|| "Upload"
                                >
                                    <Loading class="w-4 h-4 text-white" />
                                    "Uploading..."
                                </Show>
                            </button>
                            <button
                                type="button"
                                class="px-6 py-2.5 border border-slate-300 text-slate-700 rounded-xl hover:bg-slate-50"
                                on:click=move |_| close()
                            >
                                Cancel
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gini_core::{Config, Endpoint, Error, Identity};

    fn state() -> ChatState {
        ChatState::new(
            Config::default(),
            Identity::anonymous("user_1".into(), "session_1".into()),
        )
    }

    #[test]
    fn upload_settles_each_file() {
        let runtime = create_runtime();
        let state = state();
        let stored = begin_upload(state, "paper.pdf", 2048, true);
        let failed = begin_upload(state, "notes.txt", 10, false);
        assert_ne!(stored, failed);
        state.documents.with(|docs| {
            assert_eq!(docs.len(), 2);
            assert!(docs.iter().all(|doc| doc.status == DocumentStatus::Uploading));
            assert_eq!(docs[0].size, "2.0 KB");
        });

        let receipt = UploadReceipt {
            file_id: Some("drive-9".into()),
        };
        finish_upload(state, &stored, &Ok(receipt));
        finish_upload(state, &failed, &Err(Error::NotConfigured(Endpoint::Upload)));

        state.documents.with(|docs| {
            assert_eq!(docs[0].status, DocumentStatus::Ready);
            assert_eq!(docs[0].drive_file_id.as_deref(), Some("drive-9"));
            assert!(docs[0].added_to_knowledge);
            assert_eq!(docs[1].status, DocumentStatus::Error);
            assert_eq!(docs[1].drive_file_id, None);
        });
        assert_eq!(state.ready_documents(), 1);
        runtime.dispose();
    }

    #[test]
    fn removed_document_is_not_revived() {
        let runtime = create_runtime();
        let state = state();
        let id = begin_upload(state, "a.csv", 3, false);
        state.documents.set(vec![]);
        finish_upload(state, &id, &Ok(UploadReceipt::default()));
        assert!(state.documents.with(Vec::is_empty));
        runtime.dispose();
    }
}
