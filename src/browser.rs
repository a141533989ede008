use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use gini_core::identity::generate_id;
use gini_core::pipeline::Timer;
use gini_core::Error;
use leptos::logging::warn;
use leptos::*;
use std::io;
use std::time::Duration;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::console;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["navigator", "clipboard"], js_name = writeText)]
    async fn write_text(text: &str) -> Result<JsValue, JsValue>;
}

/// One formatted event, flushed to the console method matching its level.
struct ConsoleLine {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(&format!("[DrGini] {}", text.trim_end()));
        match self.level {
            Level::ERROR => console::error_1(&line),
            Level::WARN => console::warn_1(&line),
            _ => console::log_1(&line),
        }
    }
}

struct Console;

impl<'a> MakeWriter<'a> for Console {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Sends the `tracing` events emitted by gini-core to the browser console.
pub fn init_logging() {
    // No clock on wasm32-unknown-unknown, so events carry no timestamp.
    let installed = tracing_subscriber::fmt()
        .with_writer(Console)
        .with_ansi(false)
        .without_time()
        .with_max_level(Level::DEBUG)
        .try_init();
    if let Err(err) = installed {
        warn!("Logging already initialised: {err}");
    }
}

/// Delays backed by `setTimeout`.
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        set_timeout(
            move || {
                let _ = tx.send(());
            },
            duration,
        );
        Box::pin(async move {
            let _ = rx.await;
        })
    }
}

pub fn js_error(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn storage() -> Option<web_sys::Storage> {
    window().local_storage().ok().flatten()
}

/// Reads `key` from localStorage, generating and persisting a fresh id when
/// it is missing. Without storage the id only lives for this page load.
pub fn stored_id(key: &str, prefix: &str) -> String {
    let storage = storage();
    if let Some(id) = storage
        .as_ref()
        .and_then(|storage| storage.get_item(key).ok().flatten())
    {
        return id;
    }
    let id = generate_id(prefix, Utc::now(), js_sys::Math::random());
    match storage {
        Some(storage) => {
            if let Err(err) = storage.set_item(key, &id) {
                warn!("Could not persist {key}: {}", js_error(err));
            }
        }
        None => warn!("localStorage unavailable, {key} is not persisted"),
    }
    id
}

pub async fn copy_to_clipboard(text: &str) -> Result<(), String> {
    write_text(text).await.map(|_| ()).map_err(js_error)
}

pub fn open_in_new_tab(url: &str) {
    if let Err(err) = window().open_with_url_and_target(url, "_blank") {
        warn!("Could not open {url}: {}", js_error(err));
    }
}

pub async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, Error> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|err| Error::FileRead {
            name: file.name(),
            reason: js_error(err),
        })?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// `href` for a download link carrying `text` as a plain-text file.
pub fn text_data_url(text: &str) -> String {
    format!(
        "data:text/plain;charset=utf-8;base64,{}",
        STANDARD.encode(text)
    )
}
