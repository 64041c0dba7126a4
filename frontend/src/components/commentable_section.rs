use yew::prelude::*;

use crate::components::comment_modal::CommentModal;

#[derive(Properties, PartialEq)]
pub struct CommentableSectionProps {
    pub section_key: String,
    pub current_text: String,
    pub product_id: String,
    #[prop_or(0)]
    pub comment_count: u32,
    pub on_comment_sent: Callback<String>,
    #[prop_or_default]
    pub children: Children,
}

/// Wraps one piece of the product page: hover outline, count badge, and a
/// click-through to the comment modal.
#[function_component(CommentableSection)]
pub fn commentable_section(props: &CommentableSectionProps) -> Html {
    let hovered = use_state(|| false);
    let modal_open = use_state(|| false);

    let on_mouse_enter = {
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| hovered.set(true))
    };
    let on_mouse_leave = {
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| hovered.set(false))
    };
    let on_click = {
        let modal_open = modal_open.clone();
        Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            event.stop_propagation();
            modal_open.set(true);
        })
    };
    let on_close = {
        let modal_open = modal_open.clone();
        Callback::from(move |_| modal_open.set(false))
    };

    let border = if *hovered {
        classes!("border-orange-500", "bg-orange-50", "cursor-pointer")
    } else if props.comment_count > 0 {
        classes!("border-orange-500")
    } else {
        classes!("border-transparent")
    };

    html! {
        <>
            <div
                class={classes!(
                    "relative", "border-2", "rounded", "p-0.5", "-m-0.5",
                    "transition-all", "duration-200", border
                )}
                onmouseenter={on_mouse_enter}
                onmouseleave={on_mouse_leave}
                onclick={on_click}
            >
                { for props.children.iter() }
                {
                    if props.comment_count > 0 {
                        html! {
                            <span class={classes!(
                                "absolute", "-top-2", "-right-2", "bg-orange-500", "text-white",
                                "text-xs", "font-bold", "rounded-full", "w-6", "h-6",
                                "flex", "items-center", "justify-center", "shadow-md", "z-10"
                            )}>
                                { props.comment_count }
                            </span>
                        }
                    } else {
                        Html::default()
                    }
                }
            </div>

            {
                if *modal_open {
                    html! {
                        <CommentModal
                            section_key={props.section_key.clone()}
                            current_text={props.current_text.clone()}
                            product_id={props.product_id.clone()}
                            on_close={on_close}
                            on_comment_sent={props.on_comment_sent.clone()}
                        />
                    }
                } else {
                    Html::default()
                }
            }
        </>
    }
}
