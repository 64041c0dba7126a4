use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::use_navigator;

use crate::{api, auth, components::error_banner::ErrorBanner, router::Route};

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let navigator = use_navigator();
    let password = use_state(String::new);
    let submitting = use_state(|| false);
    let error = use_state(String::new);

    // Already logged in (or auth disabled entirely): straight to the
    // dashboard.
    {
        let navigator = navigator.clone();
        use_effect_with((), move |_| {
            if auth::has_session() {
                if let Some(nav) = navigator.as_ref() {
                    nav.push(&Route::Home);
                }
            } else {
                let navigator = navigator.clone();
                spawn_local(async move {
                    if let Ok(check) = api::auth_check().await {
                        if !check.protected {
                            if let Some(nav) = navigator.as_ref() {
                                nav.push(&Route::Home);
                            }
                        }
                    }
                });
            }
            || ()
        });
    }

    let on_password_input = {
        let password = password.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                password.set(input.value());
            }
        })
    };

    let on_submit = {
        let password = password.clone();
        let submitting = submitting.clone();
        let error = error.clone();
        let navigator = navigator.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            if password.is_empty() || *submitting {
                return;
            }
            submitting.set(true);

            let password_value = (*password).clone();
            let submitting = submitting.clone();
            let error = error.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                match api::login(&password_value).await {
                    Ok(session) => {
                        auth::store_session(&session.token, &session.role);
                        if let Some(nav) = navigator.as_ref() {
                            nav.push(&Route::Home);
                        }
                    },
                    Err(err) => error.set(err),
                }
                submitting.set(false);
            });
        })
    };

    html! {
        <main class={classes!("flex", "items-center", "justify-center", "min-h-[70vh]", "px-4")}>
            <div class={classes!(
                "w-full", "max-w-sm", "bg-white", "rounded-lg", "border",
                "border-gray-200", "shadow-sm", "p-8"
            )}>
                <h1 class={classes!("text-xl", "font-semibold", "text-gray-900", "mb-6")}>
                    { "Sign in" }
                </h1>
                {
                    if !error.is_empty() {
                        html! { <div class="mb-4"><ErrorBanner message={(*error).clone()} /></div> }
                    } else {
                        Html::default()
                    }
                }
                <form onsubmit={on_submit} class="space-y-4">
                    <div>
                        <label class={classes!("block", "text-sm", "font-medium", "text-gray-700", "mb-1")}>
                            { "Password" }
                        </label>
                        <input
                            type="password"
                            value={(*password).clone()}
                            oninput={on_password_input}
                            disabled={*submitting}
                            class={classes!(
                                "w-full", "px-3", "py-2", "border", "border-gray-300", "rounded",
                                "focus:outline-none", "focus:ring-2", "focus:ring-orange-500"
                            )}
                        />
                    </div>
                    <button
                        type="submit"
                        disabled={*submitting || password.is_empty()}
                        class={classes!(
                            "w-full", "py-2", "rounded", "bg-orange-500", "text-white",
                            "hover:bg-orange-600", "disabled:opacity-50"
                        )}
                    >
                        { if *submitting { "Signing in…" } else { "Sign in" } }
                    </button>
                </form>
            </div>
        </main>
    }
}
