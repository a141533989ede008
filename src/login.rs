use crate::browser::{js_error, stored_id};
use crate::state::{use_chat, ChatState};
use gini_core::identity::{SESSION_KEY, USER_KEY};
use gini_core::Identity;
use leptos::logging::{log, warn};
use leptos::*;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = netlifyIdentity, js_name = currentUser)]
    fn current_user() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = netlifyIdentity, js_name = open)]
    fn open_widget() -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = netlifyIdentity, js_name = logout)]
    fn logout_widget() -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = netlifyIdentity, js_name = close)]
    fn close_widget() -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = netlifyIdentity, js_name = on)]
    fn on_event(event: &str, callback: &Closure<dyn Fn(JsValue)>) -> Result<(), JsValue>;
}

#[derive(Deserialize)]
struct WidgetUser {
    email: Option<String>,
}

fn email_of(user: JsValue) -> Option<String> {
    if user.is_null() || user.is_undefined() {
        return None;
    }
    match serde_wasm_bindgen::from_value::<WidgetUser>(user) {
        Ok(user) => user.email,
        Err(err) => {
            warn!("Unexpected identity user: {err}");
            None
        }
    }
}

/// Identity for this page load: the logged-in email when the widget has
/// one, otherwise the ids persisted in localStorage.
pub fn initial_identity() -> Identity {
    let session_id = stored_id(SESSION_KEY, "session");
    match current_user().ok().and_then(email_of) {
        Some(email) => Identity::logged_in(email, session_id),
        None => Identity::anonymous(stored_id(USER_KEY, "user"), session_id),
    }
}

fn switch_identity(state: ChatState, email: Option<String>) {
    let session_id = state.identity.with_untracked(|id| id.session_id.clone());
    let identity = match email {
        Some(email) => Identity::logged_in(email, session_id),
        None => Identity::anonymous(stored_id(USER_KEY, "user"), session_id),
    };
    if state.identity.with_untracked(|current| *current == identity) {
        return;
    }
    log!("Identity changed to {}", identity.user_label());
    state.identity.set(identity);
    state.documents.set(vec![]);
    state.conversations.set(vec![]);
    state.refresh_documents();
    state.refresh_history();
}

/// Follows login and logout events from the identity widget.
pub fn watch_identity(state: ChatState) {
    let on_login = Closure::<dyn Fn(JsValue)>::new(move |user: JsValue| {
        switch_identity(state, email_of(user));
        if let Err(err) = close_widget() {
            warn!("Could not close identity widget: {}", js_error(err));
        }
    });
    let on_logout = Closure::<dyn Fn(JsValue)>::new(move |_: JsValue| {
        switch_identity(state, None);
    });
    for (event, callback) in [("login", &on_login), ("logout", &on_logout)] {
        if let Err(err) = on_event(event, callback) {
            warn!("Identity widget unavailable: {}", js_error(err));
            break;
        }
    }
    // The widget keeps the callbacks for the lifetime of the page.
    on_login.forget();
    on_logout.forget();
}

#[component]
pub fn Login() -> impl IntoView {
    let state = use_chat();
    let login = move |_| {
        if let Err(err) = open_widget() {
            warn!("Identity widget unavailable: {}", js_error(err));
        }
    };
    let logout = move |_| {
        if let Err(err) = logout_widget() {
            warn!("Identity widget unavailable: {}", js_error(err));
        }
    };
    view! {
        {move || {
            if state.identity.with(|identity| identity.email.is_some()) {
                view! {
                    <button
                        type="button"
                        class="text-xs text-slate-500 hover:text-slate-700 px-2 py-1 rounded-lg hover:bg-slate-200"
                        on:click=logout
                    >
                        Sign out
                    </button>
                }
            } else {
                view! {
                    <button
                        type="button"
                        class="text-xs font-medium text-blue-600 hover:text-blue-700 px-2 py-1 rounded-lg hover:bg-blue-50"
                        on:click=login
                    >
                        Sign in
                    </button>
                }
            }
        }}
    }
}
