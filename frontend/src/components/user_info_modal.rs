use shared::models::UserInfoResponse;
use shared::time;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UserInfoModalProps {
    pub info: Option<UserInfoResponse>,
    pub on_close: Callback<()>,
}

/// Profile and message statistics for one user.
#[function_component(UserInfoModal)]
pub fn user_info_modal(props: &UserInfoModalProps) -> Html {
    let Some(info) = &props.info else {
        return html! {};
    };

    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let last_activity = info.last_activity.as_ref().map_or_else(
        || "never".to_string(),
        |raw| {
            time::format_chat_time(raw)
                .map_or_else(|| raw.clone(), |t| format!("{} {}", t.date, t.time))
        },
    );
    let address = match (&info.address, &info.flat) {
        (Some(address), Some(flat)) => format!("{address}, flat {flat}"),
        (Some(address), None) => address.clone(),
        _ => "not provided".to_string(),
    };

    html! {
        <div class="modal modal-open">
            <div class="modal-box">
                <h3 class="font-bold text-lg">{ info.display_name() }</h3>
                <div class="py-2 text-sm">
                    <p>{ format!("Login: {}", info.login) }</p>
                    if let Some(patronymic) = &info.patronymic {
                        <p>{ format!("Patronymic: {patronymic}") }</p>
                    }
                    <p>{ format!("Address: {address}") }</p>
                </div>
                <div class="stats stats-vertical lg:stats-horizontal shadow">
                    <div class="stat">
                        <div class="stat-title">{"Total"}</div>
                        <div class="stat-value text-lg">{ info.total_messages }</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">{"Sent"}</div>
                        <div class="stat-value text-lg">{ info.sent_messages }</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">{"Received"}</div>
                        <div class="stat-value text-lg">{ info.received_messages }</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">{"Unread"}</div>
                        <div class="stat-value text-lg">{ info.unread_messages }</div>
                    </div>
                </div>
                <p class="mt-2 text-sm opacity-70">{ format!("Last activity: {last_activity}") }</p>
                <div class="modal-action">
                    <button class="btn" onclick={on_close}>{"Close"}</button>
                </div>
            </div>
        </div>
    }
}
