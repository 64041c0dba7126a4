use yew::prelude::*;
use yew_router::prelude::*;

use crate::{auth, router::Route};

#[function_component(Header)]
pub fn header() -> Html {
    let navigator = use_navigator();
    let logged_in = auth::has_session();

    let on_logout = {
        Callback::from(move |_: MouseEvent| {
            auth::clear_session();
            if let Some(nav) = navigator.as_ref() {
                nav.push(&Route::Login);
            }
        })
    };

    let nav_link = |route: Route, label: &str| {
        html! {
            <Link<Route>
                to={route}
                classes={classes!("px-3", "py-2", "text-sm", "text-gray-600", "hover:text-gray-900")}
            >
                { label }
            </Link<Route>>
        }
    };

    html! {
        <header class={classes!("bg-white", "border-b", "border-gray-200", "shadow-sm")}>
            <div class={classes!("max-w-7xl", "mx-auto", "px-6", "h-16", "flex", "items-center", "justify-between")}>
                <Link<Route> to={Route::Home} classes={classes!("text-lg", "font-semibold", "text-gray-900")}>
                    { "Review Flow" }
                </Link<Route>>
                <nav class={classes!("flex", "items-center", "gap-2")}>
                    { nav_link(Route::Home, "Dashboard") }
                    { nav_link(Route::Upload, "Upload") }
                    { nav_link(Route::SheetGrid, "Sheet") }
                    { nav_link(Route::Products, "Products") }
                    {
                        if let Some(role) = auth::role() {
                            html! {
                                <span class={classes!("ml-4", "text-xs", "uppercase", "text-gray-400")}>
                                    { role }
                                </span>
                            }
                        } else {
                            Html::default()
                        }
                    }
                    {
                        if logged_in {
                            html! {
                                <button
                                    type="button"
                                    class={classes!(
                                        "ml-4", "px-3", "py-1.5", "text-sm", "rounded",
                                        "border", "border-gray-300", "text-gray-600",
                                        "hover:bg-gray-100"
                                    )}
                                    onclick={on_logout}
                                >
                                    { "Logout" }
                                </button>
                            }
                        } else {
                            Html::default()
                        }
                    }
                </nav>
            </div>
        </header>
    }
}
