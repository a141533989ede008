use crate::state::{use_chat, ChatState, Modal};
use gini_core::client::DetailedFeedback;
use gini_core::models::Thumbs;
use leptos::logging::{error, log};
use leptos::*;

/// Reports the rating. The thumb lights up once the webhook accepts it.
pub fn send_quick_feedback(state: ChatState, reply_id: String, thumbs: Thumbs) {
    let client = state.client();
    let identity = state.identity.get_untracked();
    spawn_local(async move {
        let sent = client.quick_feedback(&identity, &reply_id, thumbs).await;
        record_quick_feedback(state, reply_id, thumbs, sent);
    });
}

fn record_quick_feedback(
    state: ChatState,
    reply_id: String,
    thumbs: Thumbs,
    sent: gini_core::Result<()>,
) {
    match sent {
        Ok(()) => {
            log!("Feedback {thumbs:?} sent for {reply_id}");
            state.feedback.update(|feedback| {
                feedback.insert(reply_id, thumbs);
            });
        }
        Err(err) => error!("Feedback failed: {err}"),
    }
}

#[component]
pub fn FeedbackModal() -> impl IntoView {
    let state = use_chat();
    let rating = create_rw_signal(0u8);
    let comment = create_rw_signal(String::new());
    let target = move || match state.modal.get() {
        Modal::Feedback(reply_id) => Some(reply_id),
        _ => None,
    };
    let close = move || {
        rating.set(0);
        comment.set(String::new());
        state.modal.set(Modal::Closed);
    };
    let submit = move |_| {
        let Some(reply_id) = target() else {
            return;
        };
        let feedback = DetailedFeedback {
            rating: rating.get_untracked(),
            comment: comment.get_untracked(),
        };
        close();
        let client = state.client();
        let identity = state.identity.get_untracked();
        spawn_local(async move {
            match client.detailed_feedback(&identity, &reply_id, &feedback).await {
                Ok(()) => state.notify("Thanks for your feedback!"),
                Err(err) => {
                    error!("Detailed feedback failed: {err}");
                    state.notify_error(format!("Feedback could not be sent: {err}"));
                }
            }
        });
    };

    view! {
        <Show when=move || target().is_some()>
            <div class="fixed inset-0 bg-black/50 flex items-center justify-center z-50 p-4">
                <div class="bg-white rounded-2xl max-w-lg w-full shadow-2xl">
                    <div class="p-6">
                        <div class="flex items-center justify-between mb-6">
                            <h2 class="text-xl font-semibold text-slate-900">Feedback</h2>
                            <button
                                type="button"
                                class="p-2 hover:bg-slate-100 rounded-lg text-slate-500"
                                on:click=move |_| close()
                            >
                                "×"
                            </button>
                        </div>
                        <div class="space-y-5">
                            <div>
                                <label class="block text-sm font-medium text-slate-700 mb-2">
                                    Rating
                                </label>
                                <div class="flex gap-1">
                                    {(1..=5u8)
                                        .map(|star| {
                                            view! {
                                                <button
                                                    type="button"
                                                    class="p-0.5 text-2xl"
                                                    class:text-yellow-400=move || { star <= rating.get() }
                                                    class:text-slate-300=move || { star > rating.get() }
                                                    on:click=move |_| rating.set(star)
                                                >
                                                    "★"
                                                </button>
                                            }
                                        })
                                        .collect_view()}
                                </div>
                            </div>
                            <div>
                                <label class="block text-sm font-medium text-slate-700 mb-2">
                                    Comments
                                </label>
                                <textarea
                                    class="w-full px-3 py-2 border border-slate-300 rounded-xl resize-none"
                                    rows="3"
                                    placeholder="Your feedback..."
                                    prop:value=comment
                                    on:input=move |ev| comment.set(event_target_value(&ev))
                                />
                            </div>
                            <div class="flex gap-3">
                                <button
                                    type="button"
                                    class="flex-1 py-2.5 bg-slate-900 text-white rounded-xl font-medium"
                                    on:click=submit
                                >
                                    Submit
                                </button>
                                <button
                                    type="button"
                                    class="px-6 py-2.5 border border-slate-300 text-slate-700 rounded-xl"
                                    on:click=move |_| close()
                                >
                                    Cancel
                                </button>
                            </div>
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
    fn rating_is_kept_only_when_sent() {
        let runtime = create_runtime();
        let state = state();
        record_quick_feedback(
            state,
            "gini_1".into(),
            Thumbs::Down,
            Err(Error::NotConfigured(Endpoint::Feedback)),
        );
        assert!(state.feedback.with(|feedback| feedback.is_empty()));

        record_quick_feedback(state, "gini_1".into(), Thumbs::Up, Ok(()));
        assert_eq!(
            state.feedback.with(|feedback| feedback.get("gini_1").copied()),
            Some(Thumbs::Up)
        );
        runtime.dispose();
    }
}
