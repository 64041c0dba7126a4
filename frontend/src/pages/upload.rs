use review_flow_shared::ops::UploadOutcome;
use wasm_bindgen_futures::spawn_local;
use web_sys::{FormData, HtmlInputElement};
use yew::prelude::*;

use crate::{api, components::error_banner::ErrorBanner, hooks::use_auth_guard};

const MAX_FILES: u32 = 20;
const MAX_FILE_BYTES: f64 = 10.0 * 1024.0 * 1024.0;
const ALLOWED_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

#[function_component(UploadPage)]
pub fn upload_page() -> Html {
    use_auth_guard();

    let input_ref = use_node_ref();
    let uploading = use_state(|| false);
    let error = use_state(String::new);
    let results = use_state(Vec::<UploadOutcome>::new);

    let on_submit = {
        let input_ref = input_ref.clone();
        let uploading = uploading.clone();
        let error = error.clone();
        let results = results.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let Some(input) = input_ref.cast::<HtmlInputElement>() else {
                return;
            };
            let Some(files) = input.files() else {
                error.set("No image selected".to_string());
                return;
            };
            if files.length() == 0 {
                error.set("No image selected".to_string());
                return;
            }
            if files.length() > MAX_FILES {
                error.set(format!("At most {MAX_FILES} files per upload"));
                return;
            }

            let Ok(form) = FormData::new() else {
                error.set("Failed to build the upload request".to_string());
                return;
            };
            for idx in 0..files.length() {
                let Some(file) = files.item(idx) else {
                    continue;
                };
                if !ALLOWED_TYPES.contains(&file.type_().as_str()) {
                    error.set(format!("{}: only PNG and JPG are allowed", file.name()));
                    return;
                }
                if file.size() > MAX_FILE_BYTES {
                    error.set(format!("{}: file exceeds 10 MiB", file.name()));
                    return;
                }
                let _ = form.append_with_blob_and_filename("images", &file, &file.name());
            }

            error.set(String::new());
            uploading.set(true);
            let uploading = uploading.clone();
            let errored = error.clone();
            let results = results.clone();
            spawn_local(async move {
                match api::upload_images(form).await {
                    Ok(response) => results.set(response.uploads),
                    Err(err) => errored.set(format!("Upload failed: {err}")),
                }
                uploading.set(false);
            });
        })
    };

    html! {
        <main class={classes!("max-w-3xl", "mx-auto", "px-6", "py-8")}>
            <h1 class={classes!("text-2xl", "font-semibold", "text-gray-900", "mb-6")}>
                { "Upload images" }
            </h1>

            {
                if !error.is_empty() {
                    html! { <div class="mb-4"><ErrorBanner message={(*error).clone()} /></div> }
                } else {
                    Html::default()
                }
            }

            <form onsubmit={on_submit} class={classes!(
                "bg-white", "rounded-lg", "border", "border-gray-200", "shadow-sm", "p-6", "space-y-4"
            )}>
                <div>
                    <label class={classes!("block", "text-sm", "font-medium", "text-gray-700", "mb-1")}>
                        { "Images (PNG or JPG, max 10 MiB each, up to 20 files)" }
                    </label>
                    <input
                        ref={input_ref}
                        type="file"
                        multiple={true}
                        accept="image/png,image/jpeg"
                        class={classes!("block", "w-full", "text-sm", "text-gray-600")}
                    />
                </div>
                <button
                    type="submit"
                    disabled={*uploading}
                    class={classes!(
                        "px-5", "py-2", "rounded", "bg-orange-500", "text-white",
                        "hover:bg-orange-600", "disabled:opacity-50"
                    )}
                >
                    { if *uploading { "Uploading…" } else { "Upload" } }
                </button>
            </form>

            {
                if results.is_empty() {
                    Html::default()
                } else {
                    html! {
                        <section class="mt-8">
                            <h2 class={classes!("text-lg", "font-semibold", "text-gray-900", "mb-3")}>
                                { "Results" }
                            </h2>
                            <ul class={classes!("space-y-2")}>
                                { for results.iter().map(|outcome| {
                                    let status = if outcome.success {
                                        html! { <span class="text-green-600">{ "uploaded" }</span> }
                                    } else {
                                        html! {
                                            <span class="text-red-600">
                                                { outcome.error.clone().unwrap_or_else(|| "failed".to_string()) }
                                            </span>
                                        }
                                    };
                                    html! {
                                        <li
                                            key={outcome.name.clone()}
                                            class={classes!(
                                                "bg-white", "rounded", "border", "border-gray-200",
                                                "px-4", "py-2", "text-sm", "flex", "justify-between"
                                            )}
                                        >
                                            <span class="text-gray-700">{ outcome.name.clone() }</span>
                                            { status }
                                        </li>
                                    }
                                }) }
                            </ul>
                        </section>
                    }
                }
            }
        </main>
    }
}
