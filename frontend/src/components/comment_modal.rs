use review_flow_shared::{CommentItem, CommentRecord};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

use crate::{
    api,
    components::{
        error_banner::ErrorBanner,
        loading_spinner::{LoadingSpinner, SpinnerSize},
    },
};

#[derive(Properties, PartialEq)]
pub struct CommentModalProps {
    pub section_key: String,
    pub current_text: String,
    pub product_id: String,
    pub on_close: Callback<()>,
    /// Fired with the section key once the webhook has acknowledged the
    /// submission; the parent starts reconciliation from there.
    pub on_comment_sent: Callback<String>,
}

#[function_component(CommentModal)]
pub fn comment_modal(props: &CommentModalProps) -> Html {
    let comment = use_state(String::new);
    let submitting = use_state(|| false);
    let error = use_state(String::new);
    let existing = use_state(Vec::<CommentItem>::new);
    let loading_existing = use_state(|| true);

    {
        let existing = existing.clone();
        let loading_existing = loading_existing.clone();
        use_effect_with(
            (props.product_id.clone(), props.section_key.clone()),
            move |(product_id, section)| {
                let product_id = product_id.clone();
                let section = section.clone();
                spawn_local(async move {
                    match api::fetch_section_comments(&product_id, &section).await {
                        Ok(data) => existing.set(data.items),
                        Err(err) => {
                            web_sys::console::error_1(
                                &format!("Failed to fetch comments: {err}").into(),
                            );
                            existing.set(Vec::new());
                        },
                    }
                    loading_existing.set(false);
                });
                || ()
            },
        );
    }

    let on_comment_input = {
        let comment = comment.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlTextAreaElement>() {
                comment.set(input.value());
            }
        })
    };

    let on_submit = {
        let comment = comment.clone();
        let submitting = submitting.clone();
        let error = error.clone();
        let product_id = props.product_id.clone();
        let section_key = props.section_key.clone();
        let current_text = props.current_text.clone();
        let on_comment_sent = props.on_comment_sent.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let text = comment.trim().to_string();
            if text.is_empty() {
                error.set("Comment must not be empty".to_string());
                return;
            }

            submitting.set(true);
            let record = CommentRecord {
                id: new_comment_id(),
                product_id: product_id.clone(),
                section: section_key.clone(),
                current_text: current_text.clone(),
                comment: text,
                page_url: current_page_url(),
                time_stamp: now_iso(),
            };

            let comment = comment.clone();
            let submitting = submitting.clone();
            let error = error.clone();
            let section_key = section_key.clone();
            let on_comment_sent = on_comment_sent.clone();
            let on_close = on_close.clone();
            spawn_local(async move {
                match api::submit_comment(&record).await {
                    Ok(_) => {
                        comment.set(String::new());
                        on_comment_sent.emit(section_key.clone());
                        on_close.emit(());
                    },
                    Err(err) => {
                        error.set(format!("Failed to send comment: {err}"));
                    },
                }
                submitting.set(false);
            });
        })
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let existing_list = if *loading_existing {
        html! {
            <div class={classes!("flex", "justify-center", "py-3")}>
                <LoadingSpinner size={SpinnerSize::Small} />
            </div>
        }
    } else if existing.is_empty() {
        html! { <p class={classes!("text-sm", "italic", "text-gray-500")}>{ "No comments yet" }</p> }
    } else {
        html! {
            <div class={classes!("space-y-4", "max-h-64", "overflow-y-auto", "pr-2")}>
                { for existing.iter().map(|item| html! {
                    <div key={item.id.clone()} class={classes!("border-b", "border-gray-200", "pb-3")}>
                        <p class={classes!("text-sm", "text-gray-700")}>{ item.comment.clone() }</p>
                        <p class={classes!("text-xs", "text-gray-400", "mt-1")}>
                            { format_timestamp(&item.time_stamp) }
                        </p>
                    </div>
                }) }
            </div>
        }
    };

    html! {
        <div class={classes!("fixed", "inset-0", "z-50", "flex", "items-center", "justify-center", "p-4")}>
            <div class={classes!("absolute", "inset-0", "bg-black/50")} onclick={close.clone()} />
            <div class={classes!(
                "relative", "bg-white", "rounded-lg", "shadow-xl", "max-w-2xl",
                "w-full", "max-h-[90vh]", "overflow-y-auto", "z-10", "p-6"
            )}>
                <div class={classes!("flex", "items-center", "justify-between", "mb-4")}>
                    <h2 class={classes!("text-xl", "font-semibold", "text-gray-900")}>{ "Comments" }</h2>
                    <button
                        type="button"
                        class={classes!("text-gray-400", "hover:text-gray-600")}
                        aria-label="Close"
                        onclick={close}
                    >
                        { "×" }
                    </button>
                </div>

                {
                    if !error.is_empty() {
                        html! { <div class="mb-4"><ErrorBanner message={(*error).clone()} /></div> }
                    } else {
                        Html::default()
                    }
                }

                <div class="mb-6">
                    <h3 class={classes!("text-sm", "font-semibold", "text-gray-900", "mb-2")}>
                        { "Previous comments" }
                    </h3>
                    { existing_list }
                </div>

                <form onsubmit={on_submit} class="space-y-4">
                    <div>
                        <label class={classes!("block", "text-sm", "font-medium", "text-gray-700", "mb-1")}>
                            { "Section" }
                        </label>
                        <input
                            type="text"
                            value={props.section_key.clone()}
                            readonly={true}
                            class={classes!(
                                "w-full", "px-3", "py-2", "border", "border-gray-300",
                                "rounded", "bg-gray-50", "text-gray-600"
                            )}
                        />
                    </div>
                    <div>
                        <label class={classes!("block", "text-sm", "font-medium", "text-gray-700", "mb-1")}>
                            { "Current text" }
                        </label>
                        <textarea
                            value={props.current_text.clone()}
                            readonly={true}
                            rows="3"
                            class={classes!(
                                "w-full", "px-3", "py-2", "border", "border-gray-300",
                                "rounded", "bg-gray-50", "text-gray-600", "resize-none"
                            )}
                        />
                    </div>
                    <div>
                        <label class={classes!("block", "text-sm", "font-medium", "text-gray-700", "mb-1")}>
                            { "Comment" }
                        </label>
                        <textarea
                            value={(*comment).clone()}
                            oninput={on_comment_input}
                            rows="5"
                            placeholder="Write your comment…"
                            disabled={*submitting}
                            class={classes!(
                                "w-full", "px-3", "py-2", "border", "border-gray-300",
                                "rounded", "resize-none", "focus:outline-none",
                                "focus:ring-2", "focus:ring-orange-500"
                            )}
                        />
                    </div>
                    <div class={classes!("flex", "justify-end", "gap-3", "pt-2")}>
                        <button
                            type="submit"
                            disabled={*submitting || comment.trim().is_empty()}
                            class={classes!(
                                "px-5", "py-2", "rounded", "bg-orange-500", "text-white",
                                "hover:bg-orange-600", "disabled:opacity-50"
                            )}
                        >
                            { if *submitting { "Sending…" } else { "Send" } }
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

fn new_comment_id() -> String {
    web_sys::window()
        .and_then(|window| window.crypto().ok())
        .map(|crypto| crypto.random_uuid())
        .unwrap_or_else(|| format!("cmt-{}", js_sys::Date::now() as u64))
}

fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

fn current_page_url() -> String {
    web_sys::window()
        .and_then(|window| window.location().href().ok())
        .unwrap_or_default()
}

fn format_timestamp(raw: &str) -> String {
    let parsed = js_sys::Date::new(&JsValue::from_str(raw));
    if parsed.get_time().is_nan() {
        return raw.to_string();
    }
    parsed
        .to_locale_string("en-GB", &JsValue::UNDEFINED)
        .into()
}
