use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct BroadcastModalProps {
    pub open: bool,
    pub on_send: Callback<String>,
    pub on_close: Callback<()>,
}

/// Modal composer for operator announcements to every connected user.
#[function_component(BroadcastModal)]
pub fn broadcast_modal(props: &BroadcastModalProps) -> Html {
    let draft = use_state(String::new);

    if !props.open {
        return html! {};
    }

    let oninput = {
        let draft = draft.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(area) = event.target_dyn_into::<HtmlTextAreaElement>() {
                draft.set(area.value());
            }
        })
    };

    let on_send = {
        let draft = draft.clone();
        let on_send = props.on_send.clone();
        Callback::from(move |_: MouseEvent| {
            let text = draft.trim().to_string();
            if text.is_empty() {
                return;
            }
            on_send.emit(text);
            draft.set(String::new());
        })
    };

    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let disable_send = draft.trim().is_empty();

    html! {
        <div class="modal modal-open">
            <div class="modal-box">
                <h3 class="font-bold text-lg">{"Broadcast to all users"}</h3>
                <textarea
                    class="textarea textarea-bordered w-full mt-4"
                    rows="4"
                    placeholder="Announcement text"
                    value={(*draft).clone()}
                    {oninput}
                />
                <div class="modal-action">
                    <button class="btn" onclick={on_close}>{"Cancel"}</button>
                    <button class="btn btn-primary" disabled={disable_send} onclick={on_send}>
                        {"Send to everyone"}
                    </button>
                </div>
            </div>
        </div>
    }
}
