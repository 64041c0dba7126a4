use review_flow_shared::ops::{ActivityEntry, RecentFile, StatsSnapshot, StorageQuota};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{
    api,
    components::{loading_spinner::LoadingSpinner, stats_card::StatsCard},
    hooks::use_auth_guard,
};

#[function_component(HomePage)]
pub fn home_page() -> Html {
    use_auth_guard();

    let stats = use_state(|| None::<StatsSnapshot>);
    let activities = use_state(Vec::<ActivityEntry>::new);
    let recent_files = use_state(Vec::<RecentFile>::new);
    let quota = use_state(|| None::<StorageQuota>);
    let loading = use_state(|| true);
    let triggering = use_state(|| false);
    let trigger_note = use_state(String::new);

    {
        let stats = stats.clone();
        let activities = activities.clone();
        let recent_files = recent_files.clone();
        let quota = quota.clone();
        let loading = loading.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                if let Ok(data) = api::fetch_stats().await {
                    stats.set(Some(data));
                }
                if let Ok(data) = api::fetch_activity().await {
                    activities.set(data.activities);
                }
                if let Ok(data) = api::fetch_recent_files().await {
                    recent_files.set(data.files);
                }
                // Quota is unavailable on shared drives; the card just
                // stays hidden.
                if let Ok(data) = api::fetch_storage_quota().await {
                    quota.set(Some(data));
                }
                loading.set(false);
            });
            || ()
        });
    }

    let on_trigger = {
        let triggering = triggering.clone();
        let trigger_note = trigger_note.clone();
        let stats = stats.clone();
        Callback::from(move |_: MouseEvent| {
            if *triggering {
                return;
            }
            triggering.set(true);
            let triggering = triggering.clone();
            let trigger_note = trigger_note.clone();
            let stats = stats.clone();
            spawn_local(async move {
                match api::trigger_generate().await {
                    Ok(_) => {
                        trigger_note.set("Workflow started".to_string());
                        let _ = api::record_trigger_stat().await;
                        if let Ok(data) = api::fetch_stats().await {
                            stats.set(Some(data));
                        }
                    },
                    Err(err) => trigger_note.set(format!("Workflow trigger failed: {err}")),
                }
                triggering.set(false);
            });
        })
    };

    if *loading {
        return html! {
            <div class={classes!("flex", "items-center", "justify-center", "min-h-[50vh]")}>
                <LoadingSpinner />
            </div>
        };
    }

    let stats_cards = match stats.as_ref() {
        Some(snapshot) => html! {
            <>
                <StatsCard label="Uploads today" value={snapshot.uploads_today.to_string()} />
                <StatsCard label="Triggers today" value={snapshot.triggers_today.to_string()} />
            </>
        },
        None => Html::default(),
    };

    let quota_card = match quota.as_ref() {
        Some(quota) if quota.limit != "0" => html! {
            <StatsCard
                label="Storage"
                value={format!("{} / {} GiB", quota.used, quota.limit)}
                hint={Some(format!("{}% used", quota.percentage))}
            />
        },
        _ => Html::default(),
    };

    html! {
        <main class={classes!("max-w-7xl", "mx-auto", "px-6", "py-8")}>
            <div class={classes!("flex", "items-center", "justify-between", "mb-6")}>
                <h1 class={classes!("text-2xl", "font-semibold", "text-gray-900")}>{ "Dashboard" }</h1>
                <div class={classes!("flex", "items-center", "gap-3")}>
                    <span class={classes!("text-sm", "text-gray-500")}>{ (*trigger_note).clone() }</span>
                    <button
                        type="button"
                        onclick={on_trigger}
                        disabled={*triggering}
                        class={classes!(
                            "px-4", "py-2", "rounded", "bg-orange-500", "text-white",
                            "hover:bg-orange-600", "disabled:opacity-50"
                        )}
                    >
                        { if *triggering { "Starting…" } else { "Run workflow" } }
                    </button>
                </div>
            </div>

            <div class={classes!("grid", "grid-cols-1", "sm:grid-cols-3", "gap-4", "mb-8")}>
                { stats_cards }
                { quota_card }
            </div>

            <div class={classes!("grid", "grid-cols-1", "lg:grid-cols-2", "gap-8")}>
                <section>
                    <h2 class={classes!("text-lg", "font-semibold", "text-gray-900", "mb-3")}>
                        { "Recent activity" }
                    </h2>
                    {
                        if activities.is_empty() {
                            html! { <p class={classes!("text-sm", "text-gray-500")}>{ "No activity yet" }</p> }
                        } else {
                            html! {
                                <ul class={classes!("space-y-2")}>
                                    { for activities.iter().map(|entry| html! {
                                        <li
                                            key={entry.id.clone()}
                                            class={classes!(
                                                "bg-white", "rounded", "border", "border-gray-200",
                                                "px-4", "py-2", "text-sm", "flex", "justify-between"
                                            )}
                                        >
                                            <span class="text-gray-700">{ entry.message.clone() }</span>
                                            <span class="text-gray-400">{ entry.kind.clone() }</span>
                                        </li>
                                    }) }
                                </ul>
                            }
                        }
                    }
                </section>

                <section>
                    <h2 class={classes!("text-lg", "font-semibold", "text-gray-900", "mb-3")}>
                        { "Recent files" }
                    </h2>
                    {
                        if recent_files.is_empty() {
                            html! { <p class={classes!("text-sm", "text-gray-500")}>{ "No uploads yet" }</p> }
                        } else {
                            html! {
                                <ul class={classes!("space-y-2")}>
                                    { for recent_files.iter().map(|file| html! {
                                        <li
                                            key={file.name.clone()}
                                            class={classes!(
                                                "bg-white", "rounded", "border", "border-gray-200",
                                                "px-4", "py-2", "text-sm", "flex", "justify-between"
                                            )}
                                        >
                                            <span class="text-gray-700">{ file.name.clone() }</span>
                                            <span class="text-gray-400">
                                                { format!("{} KiB", file.size / 1024) }
                                            </span>
                                        </li>
                                    }) }
                                </ul>
                            }
                        }
                    }
                </section>
            </div>
        </main>
    }
}
