use review_flow_shared::catalog::ProductListItem;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::{
    api,
    components::{error_banner::ErrorBanner, loading_spinner::LoadingSpinner},
    hooks::use_auth_guard,
    router::Route,
};

#[function_component(ProductsPage)]
pub fn products_page() -> Html {
    use_auth_guard();

    let products = use_state(Vec::<ProductListItem>::new);
    let loading = use_state(|| true);
    let error = use_state(String::new);

    {
        let products = products.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api::fetch_products().await {
                    Ok(data) => products.set(data.products),
                    Err(err) => error.set(format!("Failed to load products: {err}")),
                }
                loading.set(false);
            });
            || ()
        });
    }

    html! {
        <main class={classes!("max-w-4xl", "mx-auto", "px-6", "py-8")}>
            <h1 class={classes!("text-2xl", "font-semibold", "text-gray-900", "mb-6")}>
                { "Products" }
            </h1>

            {
                if !error.is_empty() {
                    html! { <div class="mb-4"><ErrorBanner message={(*error).clone()} /></div> }
                } else {
                    Html::default()
                }
            }

            {
                if *loading {
                    html! {
                        <div class={classes!("flex", "items-center", "justify-center", "min-h-[300px]")}>
                            <LoadingSpinner />
                        </div>
                    }
                } else if products.is_empty() {
                    html! { <p class={classes!("text-sm", "text-gray-500")}>{ "No products found" }</p> }
                } else {
                    html! {
                        <ul class={classes!("divide-y", "divide-gray-200", "bg-white", "rounded-lg", "border", "border-gray-200")}>
                            { for products.iter().map(|product| html! {
                                <li key={product.sku.clone()}>
                                    <Link<Route>
                                        to={Route::ProductPreview { sku: product.sku.clone() }}
                                        classes={classes!(
                                            "flex", "justify-between", "px-4", "py-3",
                                            "hover:bg-gray-50", "text-sm"
                                        )}
                                    >
                                        <span class={classes!("text-gray-900")}>{ product.name.clone() }</span>
                                        <span class={classes!("text-gray-400", "font-mono")}>{ product.sku.clone() }</span>
                                    </Link<Route>>
                                </li>
                            }) }
                        </ul>
                    }
                }
            }
        </main>
    }
}
