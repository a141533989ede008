use crate::chat::Chat;
use crate::feedback::FeedbackModal;
use crate::login::{initial_identity, watch_identity};
use crate::nav::Nav;
use crate::selector::DocumentSelector;
use crate::state::ChatState;
use crate::upload::UploadModal;
use gini_core::{Config, Endpoint};
use leptos::logging::{error, warn};
use leptos::*;
use std::time::Duration;

const COOLDOWN_TICK: Duration = Duration::from_secs(1);

fn load_config() -> (Config, Option<String>) {
    match Config::from_build_env() {
        Ok(config) => {
            let missing: Vec<_> = Endpoint::ALL
                .into_iter()
                .filter(|endpoint| !config.has(*endpoint))
                .map(Endpoint::env_key)
                .collect();
            if !missing.is_empty() {
                warn!("Webhooks not configured: {}", missing.join(", "));
            }
            (config, None)
        }
        Err(err) => {
            error!("Invalid configuration: {err}");
            (Config::default(), Some(err.to_string()))
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let (config, config_error) = load_config();
    let state = ChatState::new(config, initial_identity());
    provide_context(state);
    if let Some(err) = config_error {
        state.notify_error(err);
    }

    watch_identity(state);
    state.refresh_documents();
    state.refresh_history();

    match set_interval_with_handle(move || state.tick_cooldown(), COOLDOWN_TICK) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(err) => warn!("Cooldown ticker unavailable: {err:?}"),
    }

    view! {
        <div class="flex h-dvh bg-slate-50">
            <Nav />
            <Chat />
            <UploadModal />
            <FeedbackModal />
            <DocumentSelector />
        </div>
    }
}
