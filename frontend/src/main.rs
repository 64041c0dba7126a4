mod api;
mod auth;
mod components;
mod hooks;
mod pages;
mod reconcile;
mod router;
mod sections;

use yew::prelude::*;

#[function_component(App)]
fn app() -> Html {
    html! {
        <router::AppRouter />
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
