use std::{cell::RefCell, rc::Rc};

use gloo_timers::callback::Timeout;
use review_flow_shared::catalog::Product;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{
    api,
    components::{commentable_section::CommentableSection, loading_spinner::LoadingSpinner},
    hooks::use_auth_guard,
    reconcile::{PollStep, Reconciliation, SectionCounts, INITIAL_DELAY_MS, POLL_INTERVAL_MS},
    sections,
};

#[derive(Properties, PartialEq)]
pub struct ProductPreviewProps {
    pub sku: String,
}

/// One submission's timer-driven polling cycle. Dropping the stored
/// `Timeout` clears a pending callback; one that already fired checks the
/// controller's active flag and bails.
struct ActivePoll {
    reconciliation: Rc<RefCell<Reconciliation>>,
    timer: Option<Timeout>,
}

/// Everything a scheduled poll step needs. Cheap to clone into timer
/// callbacks.
#[derive(Clone)]
struct PollCtx {
    sku: String,
    /// Authoritative counts, owned by the controller.
    truth: Rc<RefCell<SectionCounts>>,
    /// Render mirror of `truth`.
    view: UseStateHandle<SectionCounts>,
    poller: Rc<RefCell<Option<ActivePoll>>>,
}

fn cancel_active_poll(poller: &Rc<RefCell<Option<ActivePoll>>>) {
    if let Some(active) = poller.borrow_mut().take() {
        active.reconciliation.borrow_mut().cancel();
        drop(active.timer);
    }
}

/// Submission acknowledged: bump optimistically, invalidate the server
/// cache, then poll the summary until it confirms or the budget runs out.
/// A still-running cycle for a previous submission is superseded first so
/// two controllers never race over the same displayed counts.
fn start_reconciliation(ctx: &PollCtx, section: String) {
    cancel_active_poll(&ctx.poller);

    let reconciliation = {
        let mut truth = ctx.truth.borrow_mut();
        let rec = Reconciliation::begin(&mut truth, section);
        ctx.view.set(truth.clone());
        Rc::new(RefCell::new(rec))
    };

    {
        let sku = ctx.sku.clone();
        spawn_local(async move {
            if let Err(err) = api::invalidate_comments(&sku).await {
                web_sys::console::error_1(&format!("Cache invalidation failed: {err}").into());
            }
        });
    }

    *ctx.poller.borrow_mut() = Some(ActivePoll {
        reconciliation: reconciliation.clone(),
        timer: None,
    });
    schedule_poll(ctx.clone(), reconciliation, INITIAL_DELAY_MS);
}

fn schedule_poll(ctx: PollCtx, reconciliation: Rc<RefCell<Reconciliation>>, delay_ms: u32) {
    let timer = Timeout::new(delay_ms, {
        let ctx = ctx.clone();
        let reconciliation = reconciliation.clone();
        move || {
            if !reconciliation.borrow().is_active() {
                return;
            }
            spawn_local(async move {
                let server = api::fetch_comment_summary(&ctx.sku).await.ok();
                let step = {
                    let mut truth = ctx.truth.borrow_mut();
                    reconciliation
                        .borrow_mut()
                        .observe(&mut truth, server.as_ref().map(|summary| &summary.counts))
                };
                ctx.view.set(ctx.truth.borrow().clone());

                match step {
                    PollStep::Continue => {
                        schedule_poll(ctx.clone(), reconciliation, POLL_INTERVAL_MS);
                    },
                    PollStep::Settled | PollStep::Exhausted | PollStep::Cancelled => {
                        if step == PollStep::Exhausted {
                            let rec = reconciliation.borrow();
                            web_sys::console::warn_1(
                                &format!(
                                    "comment polling for `{}` gave up after {} attempts, keeping the optimistic count",
                                    rec.section(),
                                    rec.attempt()
                                )
                                .into(),
                            );
                        }
                        // Tear down only our own cycle: a superseding
                        // submission may already own the slot.
                        let mut slot = ctx.poller.borrow_mut();
                        if slot
                            .as_ref()
                            .is_some_and(|active| Rc::ptr_eq(&active.reconciliation, &reconciliation))
                        {
                            slot.take();
                        }
                    },
                }
            });
        }
    });

    let mut slot = ctx.poller.borrow_mut();
    match slot.as_mut() {
        Some(active) => active.timer = Some(timer),
        // The cycle was torn down while we were scheduling; never fire.
        None => drop(timer),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Product,
    Supplier,
    Label,
    Details,
}

#[function_component(ProductPreviewPage)]
pub fn product_preview_page(props: &ProductPreviewProps) -> Html {
    use_auth_guard();

    let product = use_state(|| None::<Product>);
    let loading = use_state(|| true);
    let counts = use_state(SectionCounts::new);
    let truth = use_mut_ref(SectionCounts::new);
    let poller = use_mut_ref(|| None::<ActivePoll>);
    let active_tab = use_state(|| Tab::Product);

    {
        let product = product.clone();
        let loading = loading.clone();
        let counts = counts.clone();
        let truth = truth.clone();
        let poller = poller.clone();
        let active_tab = active_tab.clone();
        use_effect_with(props.sku.clone(), move |sku| {
            // Product switch: cancel any pending polling cycle and reset
            // the counts before the new product renders, so state never
            // bleeds across SKUs.
            cancel_active_poll(&poller);
            truth.borrow_mut().clear();
            counts.set(SectionCounts::new());
            active_tab.set(Tab::Product);
            loading.set(true);

            let sku = sku.clone();
            {
                let truth = truth.clone();
                let counts = counts.clone();
                spawn_local(async move {
                    match api::fetch_product(&sku).await {
                        Ok(data) => product.set(Some(data.product)),
                        Err(err) => {
                            web_sys::console::error_1(
                                &format!("Failed to fetch product: {err}").into(),
                            );
                            product.set(None);
                        },
                    }
                    loading.set(false);

                    // Fresh counts for the new product: invalidate, then
                    // read. Failures degrade to zero badges, never to a
                    // broken page.
                    let _ = api::invalidate_comments(&sku).await;
                    if let Ok(summary) = api::fetch_comment_summary(&sku).await {
                        *truth.borrow_mut() = summary.counts.clone();
                        counts.set(summary.counts);
                    }
                });
            }

            let poller = poller.clone();
            move || cancel_active_poll(&poller)
        });
    }

    let on_comment_sent = {
        let ctx = PollCtx {
            sku: props.sku.clone(),
            truth: truth.clone(),
            view: counts.clone(),
            poller: poller.clone(),
        };
        Callback::from(move |section: String| start_reconciliation(&ctx, section))
    };

    if *loading {
        return html! {
            <div class={classes!("flex", "items-center", "justify-center", "min-h-[60vh]")}>
                <LoadingSpinner />
            </div>
        };
    }

    let Some(product) = (*product).clone() else {
        return html! {
            <div class={classes!("flex", "items-center", "justify-center", "min-h-[60vh]")}>
                <p class={classes!("text-lg", "text-gray-600")}>{ "Product not found" }</p>
            </div>
        };
    };

    let count_of = {
        let counts = counts.clone();
        move |key: &str| counts.get(key).copied().unwrap_or(0)
    };

    let section = |key: String, current_text: String, inner: Html| {
        html! {
            <CommentableSection
                section_key={key.clone()}
                current_text={current_text}
                product_id={product.sku.clone()}
                comment_count={count_of(&key)}
                on_comment_sent={on_comment_sent.clone()}
            >
                { inner }
            </CommentableSection>
        }
    };

    let main_image_key = product
        .main_image
        .as_ref()
        .map(|_| sections::main_image_section_key(product.main_image_file_name.as_deref()));

    let image_column = match (product.main_image.as_ref(), main_image_key.as_ref()) {
        (Some(src), Some(key)) => section(
            key.clone(),
            product
                .main_image_file_name
                .clone()
                .unwrap_or_else(|| "Main image".to_string()),
            html! {
                <img
                    src={src.clone()}
                    alt={product.name.clone().unwrap_or_default()}
                    class={classes!("max-w-md", "w-full", "h-auto", "object-contain")}
                />
            },
        ),
        _ => html! {
            <div class={classes!(
                "w-full", "max-w-md", "h-96", "bg-gray-100", "flex", "items-center",
                "justify-center", "rounded-lg", "border-2", "border-dashed", "border-gray-300"
            )}>
                <p class={classes!("text-gray-400", "text-sm")}>{ "Image not available" }</p>
            </div>
        },
    };

    let tabs: Vec<(Tab, &str, bool)> = vec![
        (Tab::Product, "Product", product.description.is_some()),
        (Tab::Supplier, "Supplied by", product.supplier.is_some()),
        (
            Tab::Label,
            "Label",
            product.inci.is_some()
                || product.ingredients.is_some()
                || !product.nutritional_images.is_empty(),
        ),
        (Tab::Details, "Details", true),
    ];

    let tab_bar = html! {
        <div class={classes!("border-b-2", "border-gray-200", "mb-6")}>
            <div class={classes!("flex", "gap-8")}>
                { for tabs.iter().filter(|(_, _, show)| *show).map(|(tab, label, _)| {
                    let is_active = *active_tab == *tab;
                    let active_tab = active_tab.clone();
                    let tab = *tab;
                    let class = if is_active {
                        classes!("pb-3", "text-sm", "font-medium", "text-orange-500",
                                 "border-b-2", "border-orange-500")
                    } else {
                        classes!("pb-3", "text-sm", "font-medium", "text-gray-600",
                                 "hover:text-gray-900")
                    };
                    html! {
                        <button
                            type="button"
                            class={class}
                            onclick={Callback::from(move |_| active_tab.set(tab))}
                        >
                            { *label }
                        </button>
                    }
                }) }
            </div>
        </div>
    };

    let detail_row = |label: &str, key: String, value: Option<String>| match value {
        Some(value) => html! {
            <tr class={classes!("hover:bg-gray-50")}>
                <td class={classes!("py-3", "px-4", "font-semibold", "text-gray-700", "w-1/3")}>
                    { label.to_string() }
                </td>
                <td class={classes!("py-3", "px-4", "text-gray-900")}>
                    { section(key, value.clone(), html! { <span>{ value }</span> }) }
                </td>
            </tr>
        },
        None => Html::default(),
    };

    let tab_content = match *active_tab {
        Tab::Product => match product.description.clone() {
            Some(description) => section(
                sections::PRODUCT_DESCRIPTION.to_string(),
                description.clone(),
                html! { <p class={classes!("text-gray-700", "leading-relaxed", "whitespace-pre-line")}>{ description }</p> },
            ),
            None => html! { <p class={classes!("text-gray-500", "italic")}>{ "No description available" }</p> },
        },
        Tab::Supplier => match product.supplier.clone() {
            Some(supplier) => section(
                sections::SUPPLIER_INFO.to_string(),
                supplier.clone(),
                html! { <p class={classes!("text-gray-700", "leading-relaxed", "whitespace-pre-line")}>{ supplier }</p> },
            ),
            None => html! { <p class={classes!("text-gray-500", "italic")}>{ "No supplier information" }</p> },
        },
        Tab::Label => html! {
            <div>
                {
                    match product.inci.clone() {
                        Some(inci) => section(
                            sections::INCI.to_string(),
                            inci.clone(),
                            html! {
                                <div class="mb-6">
                                    <h4 class={classes!("font-semibold", "text-gray-700", "mb-2")}>{ "INCI" }</h4>
                                    <p class={classes!("text-gray-600")}>{ inci }</p>
                                </div>
                            },
                        ),
                        None => Html::default(),
                    }
                }
                {
                    match product.ingredients.clone() {
                        Some(ingredients) => section(
                            sections::INGREDIENTS.to_string(),
                            ingredients.clone(),
                            html! {
                                <div class="mb-6">
                                    <h4 class={classes!("font-semibold", "text-gray-700", "mb-2")}>{ "Ingredients" }</h4>
                                    <p class={classes!("text-gray-600")}>{ ingredients }</p>
                                </div>
                            },
                        ),
                        None => Html::default(),
                    }
                }
                {
                    if product.nutritional_images.is_empty() {
                        Html::default()
                    } else {
                        html! {
                            <div class="mb-6">
                                <h4 class={classes!("font-semibold", "text-gray-700", "mb-3")}>
                                    { "Nutrition labels" }
                                </h4>
                                <div class={classes!("grid", "grid-cols-2", "gap-4")}>
                                    { for product.nutritional_images.iter().enumerate().map(|(idx, image)| {
                                        let key = sections::nutrition_label_section_key(
                                            Some(image.file_name.as_str()).filter(|name| !name.is_empty()),
                                            idx,
                                        );
                                        section(
                                            key,
                                            image.file_name.clone(),
                                            html! {
                                                <img
                                                    src={image.url.clone()}
                                                    alt={format!("Nutrition label {}", idx + 1)}
                                                    class={classes!("w-full", "h-auto", "rounded", "border", "border-gray-200")}
                                                />
                                            },
                                        )
                                    }) }
                                </div>
                            </div>
                        }
                    }
                }
                {
                    match product.disclaimer.clone() {
                        Some(disclaimer) => section(
                            sections::DISCLAIMER.to_string(),
                            disclaimer.clone(),
                            html! {
                                <div class={classes!("bg-gray-50", "border-l-4", "border-orange-500", "p-4", "rounded")}>
                                    <p class={classes!("text-xs", "text-gray-600", "leading-relaxed")}>{ disclaimer }</p>
                                </div>
                            },
                        ),
                        None => Html::default(),
                    }
                }
            </div>
        },
        Tab::Details => html! {
            <div class={classes!("bg-white", "rounded-lg", "border", "border-gray-200")}>
                <table class={classes!("w-full", "text-sm")}>
                    <tbody class={classes!("divide-y", "divide-gray-200")}>
                        { detail_row("SKU", sections::SKU.to_string(), Some(product.sku.clone())) }
                        { detail_row("Supplied by", sections::SUPPLIER_DETAIL.to_string(), product.supplier.clone()) }
                        { detail_row("Country of origin", sections::COUNTRY.to_string(), product.country.clone()) }
                        { detail_row("Region", sections::REGION.to_string(), product.region.clone()) }
                        { detail_row("Alcohol content", sections::ALCOHOL_CONTENT.to_string(), product.alcohol_content.clone()) }
                        { detail_row("Price per unit", sections::PRICE_PER_UNIT.to_string(), product.price_per_unit.clone()) }
                    </tbody>
                </table>
            </div>
        },
    };

    html! {
        <main class={classes!("max-w-7xl", "mx-auto", "px-6", "py-8")}>
            <div class={classes!("grid", "grid-cols-1", "lg:grid-cols-2", "gap-8", "mb-8")}>
                <div class={classes!("flex", "justify-center")}>
                    { image_column }
                </div>
                <div>
                    { section(
                        sections::PRODUCT_NAME.to_string(),
                        product.name.clone().unwrap_or_else(|| "Product name".to_string()),
                        html! {
                            <h1 class={classes!("text-3xl", "font-normal", "text-gray-900", "mb-2")}>
                                { product.name.clone().unwrap_or_else(|| "Product name".to_string()) }
                            </h1>
                        },
                    ) }
                    { section(
                        sections::PRODUCT_BRAND.to_string(),
                        product.brand.clone().unwrap_or_else(|| "Brand".to_string()),
                        html! {
                            <h2 class={classes!("text-xl", "text-gray-500", "mb-4")}>
                                { product.brand.clone().unwrap_or_else(|| "Brand".to_string()) }
                            </h2>
                        },
                    ) }
                    {
                        match product.short_description.clone() {
                            Some(short) => section(
                                sections::SHORT_DESCRIPTION.to_string(),
                                short.clone(),
                                html! {
                                    <p class={classes!("text-gray-700", "leading-relaxed", "mb-6")}>{ short }</p>
                                },
                            ),
                            None => Html::default(),
                        }
                    }
                    {
                        match product.price.clone() {
                            Some(price) => html! {
                                <p class={classes!("text-2xl", "font-semibold", "text-gray-900")}>
                                    { format!("{price} · {}", product.volume) }
                                </p>
                            },
                            None => Html::default(),
                        }
                    }
                </div>
            </div>

            { tab_bar }
            <div class={classes!("min-h-[300px]")}>
                { tab_content }
            </div>
        </main>
    }
}
