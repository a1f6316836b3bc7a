use std::rc::Rc;

use uuid::Uuid;
use yew::prelude::*;

use crate::notify::{Toast, ToastFlavor};

/// Reducer-backed toast list, shared by both pages.
#[derive(Default, PartialEq)]
pub struct ToastList {
    pub items: Vec<Toast>,
}

pub enum ToastAction {
    Push(Toast),
    Dismiss(Uuid),
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut items = self.items.clone();
        match action {
            ToastAction::Push(toast) => items.push(toast),
            ToastAction::Dismiss(id) => items.retain(|toast| toast.id != id),
        }
        Rc::new(Self { items })
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastStackProps {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<Uuid>,
}

#[function_component(ToastStack)]
pub fn toast_stack(props: &ToastStackProps) -> Html {
    if props.toasts.is_empty() {
        return html! {};
    }
    html! {
        <div class="toast toast-end z-50">
            { for props.toasts.iter().map(|toast| {
                let class = match toast.flavor {
                    ToastFlavor::Info => "alert alert-info",
                    ToastFlavor::Success => "alert alert-success",
                    ToastFlavor::Error => "alert alert-error",
                };
                let on_dismiss = {
                    let on_dismiss = props.on_dismiss.clone();
                    let id = toast.id;
                    Callback::from(move |_: MouseEvent| on_dismiss.emit(id))
                };
                html! {
                    <div class={class} key={toast.id.to_string()}>
                        <span>{ toast.message.clone() }</span>
                        <button class="btn btn-ghost btn-xs" onclick={on_dismiss}>{"✕"}</button>
                    </div>
                }
            }) }
        </div>
    }
}
