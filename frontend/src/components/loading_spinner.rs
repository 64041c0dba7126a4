use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinnerSize {
    Small,
    Large,
}

#[derive(Properties, PartialEq)]
pub struct LoadingSpinnerProps {
    #[prop_or(SpinnerSize::Large)]
    pub size: SpinnerSize,
}

#[function_component(LoadingSpinner)]
pub fn loading_spinner(props: &LoadingSpinnerProps) -> Html {
    let size_classes = match props.size {
        SpinnerSize::Small => classes!("w-5", "h-5", "border-2"),
        SpinnerSize::Large => classes!("w-12", "h-12", "border-4"),
    };

    html! {
        <div
            class={classes!(
                "animate-spin",
                "rounded-full",
                "border-orange-500",
                "border-t-transparent",
                size_classes
            )}
            role="status"
            aria-label="Loading"
        />
    }
}
