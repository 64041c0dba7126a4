use yew::prelude::*;
use yew_router::prelude::*;

use crate::{components::header::Header, pages};

#[derive(Routable, Clone, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Home,

    #[at("/login")]
    Login,

    #[at("/upload")]
    Upload,

    #[at("/sheet")]
    SheetGrid,

    #[at("/products")]
    Products,

    #[at("/products/:sku")]
    ProductPreview { sku: String },

    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <pages::home::HomePage /> },
        Route::Login => html! { <pages::login::LoginPage /> },
        Route::Upload => html! { <pages::upload::UploadPage /> },
        Route::SheetGrid => html! { <pages::sheet_grid::SheetGridPage /> },
        Route::Products => html! { <pages::products::ProductsPage /> },
        Route::ProductPreview {
            sku,
        } => {
            html! { <pages::product_preview::ProductPreviewPage sku={sku} /> }
        },
        Route::NotFound => html! { <pages::not_found::NotFoundPage /> },
    }
}

#[function_component(AppRouter)]
pub fn app_router() -> Html {
    html! {
        <BrowserRouter>
            <div class="flex flex-col min-h-screen bg-gray-50">
                <Header />
                <div class="flex-1">
                    <Switch<Route> render={switch} />
                </div>
            </div>
        </BrowserRouter>
    }
}
