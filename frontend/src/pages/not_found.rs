use yew::prelude::*;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <main class={classes!("flex", "flex-col", "items-center", "justify-center", "min-h-[60vh]")}>
            <h1 class={classes!("text-4xl", "font-bold", "text-gray-300")}>{ "404" }</h1>
            <p class={classes!("mt-2", "text-gray-500")}>{ "Page not found" }</p>
        </main>
    }
}
