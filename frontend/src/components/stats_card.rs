use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatsCardProps {
    pub label: String,
    pub value: String,
    #[prop_or_default]
    pub hint: Option<String>,
}

#[function_component(StatsCard)]
pub fn stats_card(props: &StatsCardProps) -> Html {
    html! {
        <div class={classes!(
            "bg-white", "rounded-lg", "border", "border-gray-200",
            "px-5", "py-4", "shadow-sm"
        )}>
            <p class={classes!("text-xs", "uppercase", "tracking-wide", "text-gray-500")}>
                { props.label.clone() }
            </p>
            <p class={classes!("mt-1", "text-2xl", "font-semibold", "text-gray-900")}>
                { props.value.clone() }
            </p>
            {
                if let Some(hint) = props.hint.as_ref() {
                    html! { <p class={classes!("mt-1", "text-xs", "text-gray-400")}>{ hint.clone() }</p> }
                } else {
                    Html::default()
                }
            }
        </div>
    }
}
