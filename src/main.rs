mod app;
mod browser;
mod chat;
mod feedback;
mod history;
mod loading;
mod login;
mod message;
mod molecule;
mod nav;
mod search;
mod selector;
mod state;
mod upload;

use app::*;
use leptos::*;

fn main() {
    console_error_panic_hook::set_once();
    browser::init_logging();
    mount_to_body(|| {
        view! { <App /> }
    })
}
