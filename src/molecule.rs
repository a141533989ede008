use crate::loading::Loading;
use gini_core::models::MoleculeImage;
use leptos::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageStatus {
    Loading,
    Loaded,
    Failed,
}

#[component]
fn Fact(label: &'static str, value: String, #[prop(optional)] mono: bool) -> impl IntoView {
    view! {
        <div class="bg-white rounded-lg p-2">
            <p class="text-xs text-slate-500">{label}</p>
            <p class="font-medium text-slate-700" class:font-mono=mono>
                {value}
            </p>
        </div>
    }
}

/// Structure card rendered under a bot reply.
#[component]
pub fn MolecularImage(image: MoleculeImage) -> impl IntoView {
    let (status, set_status) = create_signal(ImageStatus::Loading);
    let (fullscreen, set_fullscreen) = create_signal(false);
    // Bumping the nonce re-requests the image after a failure.
    let (nonce, set_nonce) = create_signal(0u32);

    let metadata = image.metadata;
    let title = metadata
        .compound
        .clone()
        .unwrap_or_else(|| "Molecular Structure".to_string());
    let alt = metadata
        .compound
        .clone()
        .unwrap_or_else(|| "Structure".to_string());
    let url = image.image_url;
    let full_url = url.clone();
    let full_alt = alt.clone();
    let src = {
        let url = url.clone();
        move || match nonce.get() {
            0 => url.clone(),
            n if url.contains('?') => format!("{url}&retry={n}"),
            n => format!("{url}?retry={n}"),
        }
    };
    let retry = move |_| {
        set_status.set(ImageStatus::Loading);
        set_nonce.update(|n| *n += 1);
    };

    view! {
        <div class="bg-gradient-to-br from-slate-50 to-blue-50 border-2 border-blue-200 rounded-xl p-5 my-4 shadow-sm">
            <div class="bg-white rounded-lg p-4 mb-3 shadow-sm">
                <div class="flex items-center justify-center gap-2 mb-4">
                    <h3 class="text-blue-800 font-bold text-lg">{title}</h3>
                </div>
                <div class="text-center p-3 relative min-h-48 bg-white rounded-lg">
                    <Show when=move || status.get() == ImageStatus::Loading>
                        <div class="absolute inset-0 flex items-center justify-center bg-slate-50 rounded-lg">
                            <div class="flex flex-col items-center gap-2">
                                <Loading class="w-8 h-8 text-blue-500" />
                                <span class="text-sm text-slate-500">Rendering structure...</span>
                            </div>
                        </div>
                    </Show>
                    <Show when=move || status.get() == ImageStatus::Failed>
                        <div class="p-6 bg-red-50 border border-red-200 rounded-lg text-center">
                            <p class="text-red-600 font-medium">Failed to load</p>
                            <button
                                type="button"
                                class="mt-3 px-4 py-2 bg-blue-500 text-white rounded-lg text-sm"
                                on:click=retry
                            >
                                Retry
                            </button>
                        </div>
                    </Show>
                    <img
                        src=src
                        alt=alt
                        class="max-w-full h-auto rounded-lg mx-auto cursor-pointer hover:shadow-lg max-h-[300px]"
                        class:hidden=move || status.get() != ImageStatus::Loaded
                        on:load=move |_| set_status.set(ImageStatus::Loaded)
                        on:error=move |_| set_status.set(ImageStatus::Failed)
                        on:click=move |_| set_fullscreen.set(true)
                    />
                </div>
            </div>
            <div class="bg-blue-50 rounded-lg p-3">
                <div class="grid grid-cols-2 md:grid-cols-4 gap-3 text-sm">
                    <Fact
                        label="Compound"
                        value=metadata.compound.unwrap_or_else(|| "N/A".to_string())
                    />
                    {metadata
                        .formula
                        .map(|formula| view! { <Fact label="Formula" value=formula mono=true /> })}
                    {metadata.cid.map(|cid| view! { <Fact label="PubChem CID" value=cid /> })}
                    {metadata
                        .molecular_weight
                        .map(|weight| view! { <Fact label="Mol. Weight" value=weight /> })}
                </div>
            </div>
        </div>
        <Show when=move || fullscreen.get()>
            <div
                class="fixed inset-0 bg-black/80 flex items-center justify-center z-50 p-4"
                on:click=move |_| set_fullscreen.set(false)
            >
                <div class="relative max-w-4xl w-full">
                    <button
                        type="button"
                        class="absolute -top-10 right-0 text-white hover:text-slate-300 text-2xl"
                        on:click=move |_| set_fullscreen.set(false)
                    >
                        "×"
                    </button>
                    <img
                        src=full_url.clone()
                        alt=full_alt.clone()
                        class="max-w-full max-h-[80vh] mx-auto rounded-lg bg-white p-4"
                    />
                </div>
            </div>
        </Show>
    }
}
