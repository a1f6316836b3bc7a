use std::collections::HashMap;

use shared::models::{ArchivedUser, ConnectedUser};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UserListProps {
    pub users: Vec<ConnectedUser>,
    pub archived: Vec<ArchivedUser>,
    pub unread: HashMap<String, u32>,
    #[prop_or_default]
    pub selected: Option<String>,
    pub on_select: Callback<String>,
    pub on_unarchive: Callback<String>,
}

/// Operator sidebar: active conversations on top, archived below.
#[function_component(UserList)]
pub fn user_list(props: &UserListProps) -> Html {
    html! {
        <div class="flex flex-col overflow-y-auto">
            <ul class="menu p-2">
                { for props.users.iter().map(|user| render_user(props, user)) }
                if props.users.is_empty() {
                    <li class="p-2 text-base-content/50">{"No users yet"}</li>
                }
            </ul>
            if !props.archived.is_empty() {
                <div class="divider text-xs">{"Archived"}</div>
                <ul class="menu p-2">
                    { for props.archived.iter().map(|user| render_archived(props, user)) }
                </ul>
            }
        </div>
    }
}

fn render_user(props: &UserListProps, user: &ConnectedUser) -> Html {
    let is_selected = props.selected.as_deref() == Some(user.user_id.as_str());
    let unread = props.unread.get(&user.user_id).copied().unwrap_or(0);
    let onclick = {
        let on_select = props.on_select.clone();
        let user_id = user.user_id.clone();
        Callback::from(move |_: MouseEvent| on_select.emit(user_id.clone()))
    };
    let presence = if user.connected {
        "status status-success"
    } else {
        "status status-neutral"
    };

    html! {
        <li key={user.user_id.clone()}>
            <button class={classes!(is_selected.then_some("active"))} {onclick}>
                <span class={presence} aria-hidden="true"></span>
                <span class="flex-1 truncate">{ user.name.clone() }</span>
                if unread > 0 {
                    <span class="badge badge-primary badge-sm">{ unread }</span>
                }
            </button>
        </li>
    }
}

fn render_archived(props: &UserListProps, user: &ArchivedUser) -> Html {
    let on_unarchive = {
        let on_unarchive = props.on_unarchive.clone();
        let user_id = user.user_id.clone();
        Callback::from(move |event: MouseEvent| {
            event.stop_propagation();
            on_unarchive.emit(user_id.clone());
        })
    };

    html! {
        <li key={user.user_id.clone()}>
            <div class="flex items-center opacity-70">
                <span class="flex-1 truncate">{ format!("📁 {}", user.name) }</span>
                if user.unread_count > 0 {
                    <span class="badge badge-ghost badge-sm">{ user.unread_count }</span>
                }
                <button class="btn btn-ghost btn-xs" title="Restore" onclick={on_unarchive}>
                    {"↩"}
                </button>
            </div>
        </li>
    }
}
