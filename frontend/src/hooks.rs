use yew::prelude::*;
use yew_router::prelude::use_navigator;

use crate::router::Route;

/// Redirects to the login page when the deployment is password-protected
/// and no session token is stored. Pages behind login call this once at the
/// top.
#[hook]
pub fn use_auth_guard() {
    let navigator = use_navigator();

    use_effect_with((), move |_| {
        if !crate::auth::has_session() {
            wasm_bindgen_futures::spawn_local(async move {
                match crate::api::auth_check().await {
                    Ok(check) if check.protected => {
                        if let Some(nav) = navigator.as_ref() {
                            nav.push(&Route::Login);
                        }
                    },
                    _ => {},
                }
            });
        }
        || ()
    });
}
