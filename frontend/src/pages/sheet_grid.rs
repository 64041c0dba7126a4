use review_flow_shared::catalog::SheetGrid;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{
    api,
    components::{error_banner::ErrorBanner, loading_spinner::LoadingSpinner},
    hooks::use_auth_guard,
};

#[function_component(SheetGridPage)]
pub fn sheet_grid_page() -> Html {
    use_auth_guard();

    let grid = use_state(|| None::<SheetGrid>);
    let loading = use_state(|| true);
    let error = use_state(String::new);

    let load = {
        let grid = grid.clone();
        let loading = loading.clone();
        let error = error.clone();
        Callback::from(move |_: ()| {
            loading.set(true);
            let grid = grid.clone();
            let loading = loading.clone();
            let error = error.clone();
            spawn_local(async move {
                match api::fetch_sheet_data().await {
                    Ok(data) => {
                        error.set(String::new());
                        grid.set(Some(data));
                    },
                    Err(err) => error.set(format!("Failed to load sheet: {err}")),
                }
                loading.set(false);
            });
        })
    };

    {
        let load = load.clone();
        use_effect_with((), move |_| {
            load.emit(());
            || ()
        });
    }

    let on_refresh = {
        let load = load.clone();
        Callback::from(move |_: MouseEvent| load.emit(()))
    };

    let table = match grid.as_ref() {
        Some(grid) if !grid.values.is_empty() => {
            let (header, rows) = grid.values.split_first().expect("non-empty grid");
            html! {
                <div class={classes!("overflow-auto", "bg-white", "rounded-lg", "border", "border-gray-200")}>
                    <table class={classes!("min-w-full", "text-sm")}>
                        <thead class={classes!("bg-gray-100", "text-left")}>
                            <tr>
                                { for header.iter().map(|cell| html! {
                                    <th class={classes!("px-3", "py-2", "font-semibold", "text-gray-700", "whitespace-nowrap")}>
                                        { cell.clone() }
                                    </th>
                                }) }
                            </tr>
                        </thead>
                        <tbody class={classes!("divide-y", "divide-gray-200")}>
                            { for rows.iter().map(|row| html! {
                                <tr class={classes!("hover:bg-gray-50")}>
                                    { for row.iter().map(|cell| html! {
                                        <td class={classes!("px-3", "py-2", "text-gray-600", "whitespace-nowrap")}>
                                            { cell.clone() }
                                        </td>
                                    }) }
                                </tr>
                            }) }
                        </tbody>
                    </table>
                </div>
            }
        },
        Some(_) => html! { <p class={classes!("text-sm", "text-gray-500")}>{ "The sheet is empty" }</p> },
        None => Html::default(),
    };

    html! {
        <main class={classes!("max-w-7xl", "mx-auto", "px-6", "py-8")}>
            <div class={classes!("flex", "items-center", "justify-between", "mb-6")}>
                <h1 class={classes!("text-2xl", "font-semibold", "text-gray-900")}>{ "Sheet data" }</h1>
                <div class={classes!("flex", "items-center", "gap-3")}>
                    {
                        if let Some(grid) = grid.as_ref() {
                            html! {
                                <span class={classes!("text-sm", "text-gray-500")}>
                                    { format!("{} rows", grid.row_count) }
                                </span>
                            }
                        } else {
                            Html::default()
                        }
                    }
                    <button
                        type="button"
                        onclick={on_refresh}
                        disabled={*loading}
                        class={classes!(
                            "px-4", "py-2", "rounded", "border", "border-gray-300",
                            "text-gray-700", "hover:bg-gray-100", "disabled:opacity-50"
                        )}
                    >
                        { "Refresh" }
                    </button>
                </div>
            </div>

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
                } else {
                    table
                }
            }
        </main>
    }
}
