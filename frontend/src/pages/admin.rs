use std::collections::HashMap;

use gloo_storage::{LocalStorage, Storage};
use shared::models::{
    ArchivedUser, ConnectedUser, ConversationCache, Direction, ServerFrame, StoredMessage,
    UserInfoResponse,
};
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;
use yew_router::hooks::use_navigator;
use yewdux::prelude::use_store;

use crate::api::{ApiError, SupportApi};
use crate::auth;
use crate::components::{
    BroadcastModal, ConfirmModal, ConnectionState, ConnectionStatus, MessageList, ToastAction,
    ToastList, ToastStack, UserInfoModal, UserList,
};
use crate::models::app_state::AppState;
use crate::notify::{self, Notifier, Toast};
use crate::routes::MainRoute;
use crate::socket::{ChatSocket, EventKind, SocketEvent};

const HISTORY_PAGE: u32 = 100;

fn conversations_key(login: &str) -> String {
    format!("adminConversations_{login}")
}

fn last_user_key(login: &str) -> String {
    format!("adminLastUser_{login}")
}

fn persist_cache(key: &str, cache: &ConversationCache) {
    if LocalStorage::set(key, cache).is_err() {
        web_sys::console::warn_1(&"failed to persist operator conversations".into());
    }
}

fn refresh_archived(
    archived: UseStateHandle<Vec<ArchivedUser>>,
    toasts: yew::functional::UseReducerDispatcher<ToastList>,
) {
    spawn_local(async move {
        match SupportApi::shared().archived_conversations().await {
            Ok(response) => archived.set(response.archived_users),
            Err(ApiError::Unauthorized) => {}
            Err(error) => {
                toasts.dispatch(ToastAction::Push(Toast::error(error.to_string())));
            }
        }
    });
}

/// Action awaiting an explicit confirmation.
#[derive(Clone, PartialEq)]
enum PendingAction {
    Archive(String),
    ClearCache,
    ResetDatabase,
}

impl PendingAction {
    fn title(&self) -> &'static str {
        match self {
            PendingAction::Archive(_) => "Archive conversation",
            PendingAction::ClearCache => "Clear user cache",
            PendingAction::ResetDatabase => "Reset database",
        }
    }

    fn message(&self) -> String {
        match self {
            PendingAction::Archive(login) => {
                format!("Archive the conversation with {login}? It will move to the archived list.")
            }
            PendingAction::ClearCache => {
                "Drop the server-side user profile cache?".to_string()
            }
            PendingAction::ResetDatabase => {
                "Recreate the database schema? All messages will be lost.".to_string()
            }
        }
    }
}

#[function_component(AdminPage)]
pub fn admin_page() -> Html {
    let (state, dispatch) = use_store::<AppState>();
    let navigator = use_navigator();
    let socket = use_mut_ref(ChatSocket::new);
    let cache = use_mut_ref(ConversationCache::new);
    let roster_ref = use_mut_ref(Vec::<ConnectedUser>::new);
    let unread_ref = use_mut_ref(HashMap::<String, u32>::new);
    let selected_ref = use_mut_ref(|| None::<String>);

    let roster = use_state(Vec::<ConnectedUser>::new);
    let unread = use_state(HashMap::<String, u32>::new);
    let selected = use_state(|| None::<String>);
    let messages = use_state(Vec::<StoredMessage>::new);
    let archived = use_state(Vec::<ArchivedUser>::new);
    let connection = use_state(|| ConnectionState::Connecting);
    let toasts = use_reducer(ToastList::default);
    let draft = use_state(String::new);
    let sound_on = use_state(notify::sound_enabled);
    let user_info = use_state(|| None::<UserInfoResponse>);
    let broadcast_open = use_state(|| false);
    let pending = use_state(|| None::<PendingAction>);

    let profile = state.user.clone();
    let own_login = profile
        .as_ref()
        .map(|profile| profile.login.clone())
        .unwrap_or_default();

    let force_logout = {
        let socket = socket.clone();
        let dispatch = dispatch.clone();
        let navigator = navigator;
        Callback::from(move |()| {
            socket.borrow().disconnect();
            auth::clear();
            dispatch.set(AppState::default());
            if let Some(ref nav) = navigator {
                nav.push(&MainRoute::Login);
            }
        })
    };

    {
        let socket = socket.clone();
        let cache = cache.clone();
        let roster_ref = roster_ref.clone();
        let unread_ref = unread_ref.clone();
        let selected_ref = selected_ref.clone();
        let roster = roster.clone();
        let unread = unread.clone();
        let selected = selected.clone();
        let messages = messages.clone();
        let archived = archived.clone();
        let connection = connection.clone();
        let toasts = toasts.dispatcher();
        let profile_opt = profile.clone();
        use_effect_with((), move |_| {
            let cleanup: Box<dyn FnOnce()> = if let Some(profile) = profile_opt {
                let storage_key = conversations_key(&profile.login);
                let last_key = last_user_key(&profile.login);
                if let Ok(stored) = LocalStorage::get::<ConversationCache>(&storage_key) {
                    *cache.borrow_mut() = stored;
                }
                if let Ok(last) = LocalStorage::get::<String>(&last_key) {
                    messages.set(cache.borrow().messages(&last).to_vec());
                    *selected_ref.borrow_mut() = Some(last.clone());
                    selected.set(Some(last));
                }

                Notifier::request_permission();
                let notifier = Notifier::new({
                    let toasts = toasts.clone();
                    Callback::from(move |toast: Toast| toasts.dispatch(ToastAction::Push(toast)))
                });

                refresh_archived(archived.clone(), toasts.clone());

                let chat = socket.borrow().clone();

                {
                    let connection = connection.clone();
                    let selected_ref = selected_ref.clone();
                    let chat_handle = chat.clone();
                    chat.on(EventKind::Connected, move |_| {
                        connection.set(ConnectionState::Connected);
                        chat_handle.request_connected_users();
                        chat_handle.request_conversations();
                        let current = selected_ref.borrow().clone();
                        if let Some(user) = current {
                            chat_handle.request_history(&user, HISTORY_PAGE, 0);
                        }
                    });
                }
                {
                    let connection = connection.clone();
                    chat.on(EventKind::Disconnected, move |_| {
                        connection.set(ConnectionState::Offline);
                    });
                }
                {
                    let connection = connection.clone();
                    chat.on(EventKind::Reconnecting, move |event| {
                        if let SocketEvent::Reconnecting { attempt } = event {
                            connection.set(ConnectionState::Reconnecting(*attempt));
                        }
                    });
                }
                {
                    let connection = connection.clone();
                    let toasts = toasts.clone();
                    chat.on(EventKind::ReconnectFailed, move |_| {
                        connection.set(ConnectionState::Offline);
                        toasts.dispatch(ToastAction::Push(Toast::error(
                            "Connection lost. Reload the page to try again.",
                        )));
                    });
                }
                {
                    let toasts = toasts.clone();
                    chat.on(EventKind::Error, move |event| {
                        if let SocketEvent::Error { message } = event {
                            toasts.dispatch(ToastAction::Push(Toast::error(message.clone())));
                        }
                    });
                }
                let frame_listener = {
                    let cache = cache.clone();
                    let roster_ref = roster_ref.clone();
                    let unread_ref = unread_ref.clone();
                    let selected_ref = selected_ref.clone();
                    let roster = roster.clone();
                    let unread = unread.clone();
                    let messages = messages.clone();
                    let notifier = notifier.clone();
                    let chat_handle = chat.clone();
                    let storage_key = storage_key.clone();
                    chat.on(EventKind::Frame, move |event| {
                        let SocketEvent::Frame(frame) = event else { return };
                        match frame {
                            ServerFrame::Welcome { message, .. } => {
                                if let Some(text) = message {
                                    notifier.toast(Toast::success(text.clone()));
                                }
                            }
                            ServerFrame::UserMessage {
                                sender,
                                sender_name,
                                message,
                                timestamp,
                            }
                            | ServerFrame::OfflineMessage {
                                sender,
                                sender_name,
                                message,
                                timestamp,
                                ..
                            } => {
                                let offline =
                                    matches!(frame, ServerFrame::OfflineMessage { .. });
                                let stored = StoredMessage {
                                    content: message.clone(),
                                    sender: sender.clone(),
                                    sender_name: sender_name.clone(),
                                    timestamp: timestamp.clone(),
                                    direction: Direction::Received,
                                    offline,
                                    archived: false,
                                    broadcast: false,
                                };
                                if !cache.borrow_mut().push(sender, stored) {
                                    return;
                                }
                                persist_cache(&storage_key, &cache.borrow());
                                let is_open =
                                    selected_ref.borrow().as_deref() == Some(sender.as_str());
                                if is_open {
                                    messages.set(cache.borrow().messages(sender).to_vec());
                                    chat_handle.mark_as_read(sender);
                                } else {
                                    *unread_ref.borrow_mut().entry(sender.clone()).or_insert(0) +=
                                        1;
                                    unread.set(unread_ref.borrow().clone());
                                }
                                let known = roster_ref
                                    .borrow()
                                    .iter()
                                    .any(|user| user.user_id == *sender);
                                if !known {
                                    chat_handle.request_connected_users();
                                }
                                let title = sender_name
                                    .clone()
                                    .unwrap_or_else(|| sender.clone());
                                notifier.message_received(&title, message);
                            }
                            ServerFrame::AdminSent {
                                sender,
                                to,
                                message,
                                timestamp,
                                ..
                            } => {
                                let stored = StoredMessage {
                                    content: message.clone(),
                                    sender: sender.clone(),
                                    sender_name: None,
                                    timestamp: timestamp.clone(),
                                    direction: Direction::Sent,
                                    offline: false,
                                    archived: false,
                                    broadcast: false,
                                };
                                if cache.borrow_mut().push(to, stored) {
                                    persist_cache(&storage_key, &cache.borrow());
                                    if selected_ref.borrow().as_deref() == Some(to.as_str()) {
                                        messages.set(cache.borrow().messages(to).to_vec());
                                    }
                                }
                            }
                            ServerFrame::UserConnected { user_id, user_name } => {
                                {
                                    let mut list = roster_ref.borrow_mut();
                                    if let Some(entry) =
                                        list.iter_mut().find(|user| user.user_id == *user_id)
                                    {
                                        entry.connected = true;
                                    } else {
                                        list.push(ConnectedUser {
                                            user_id: user_id.clone(),
                                            name: user_name
                                                .clone()
                                                .unwrap_or_else(|| user_id.clone()),
                                            connected: true,
                                        });
                                    }
                                }
                                roster.set(roster_ref.borrow().clone());
                            }
                            ServerFrame::ConnectedUsers { users } => {
                                *roster_ref.borrow_mut() = users.clone();
                                roster.set(users.clone());
                            }
                            ServerFrame::ConversationsList { conversations } => {
                                {
                                    let mut counts = unread_ref.borrow_mut();
                                    for summary in conversations {
                                        if summary.unread_count > 0 {
                                            counts.insert(
                                                summary.participant_id.clone(),
                                                summary.unread_count,
                                            );
                                        }
                                    }
                                }
                                unread.set(unread_ref.borrow().clone());
                            }
                            ServerFrame::ConversationHistory {
                                with_user,
                                messages: history,
                            } => {
                                let converted: Vec<StoredMessage> = history
                                    .iter()
                                    .map(|entry| StoredMessage {
                                        content: entry.content.clone(),
                                        sender: entry.sender_id.clone(),
                                        sender_name: None,
                                        timestamp: entry.timestamp.clone(),
                                        direction: if entry.sender_id == *with_user {
                                            Direction::Received
                                        } else {
                                            Direction::Sent
                                        },
                                        offline: false,
                                        archived: entry.is_archived,
                                        broadcast: entry.message_type.as_deref()
                                            == Some("broadcast"),
                                    })
                                    .collect();
                                cache.borrow_mut().merge_history(with_user, converted);
                                persist_cache(&storage_key, &cache.borrow());
                                if selected_ref.borrow().as_deref() == Some(with_user.as_str()) {
                                    messages.set(cache.borrow().messages(with_user).to_vec());
                                }
                            }
                            ServerFrame::Error { message } => {
                                notifier.toast(Toast::error(message.clone()));
                            }
                            _ => {}
                        }
                    })
                };

                chat.connect();

                let chat_cleanup = chat.clone();
                Box::new(move || {
                    chat_cleanup.off(EventKind::Frame, frame_listener);
                    chat_cleanup.disconnect();
                })
            } else {
                Box::new(|| ())
            };
            move || cleanup()
        });
    }

    let on_select = {
        let socket = socket.clone();
        let cache = cache.clone();
        let unread_ref = unread_ref.clone();
        let selected_ref = selected_ref.clone();
        let selected = selected.clone();
        let unread = unread.clone();
        let messages = messages.clone();
        let last_key = last_user_key(&own_login);
        Callback::from(move |user_id: String| {
            *selected_ref.borrow_mut() = Some(user_id.clone());
            selected.set(Some(user_id.clone()));
            if LocalStorage::set(&last_key, &user_id).is_err() {
                web_sys::console::warn_1(&"failed to remember selected user".into());
            }
            messages.set(cache.borrow().messages(&user_id).to_vec());
            unread_ref.borrow_mut().remove(&user_id);
            unread.set(unread_ref.borrow().clone());
            let chat = socket.borrow().clone();
            chat.request_history(&user_id, HISTORY_PAGE, 0);
            chat.mark_as_read(&user_id);
        })
    };

    let oninput = {
        let draft = draft.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(area) = event.target_dyn_into::<HtmlTextAreaElement>() {
                draft.set(area.value());
            }
        })
    };

    let onsubmit = {
        let draft = draft.clone();
        let socket = socket.clone();
        let cache = cache.clone();
        let messages = messages.clone();
        let selected_ref = selected_ref.clone();
        let own_login = own_login.clone();
        let storage_key = conversations_key(&own_login);
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let text = draft.trim().to_string();
            let Some(user_id) = selected_ref.borrow().clone() else {
                return;
            };
            if text.is_empty() {
                return;
            }
            let chat = socket.borrow().clone();
            chat.send_admin_message(&user_id, &text);
            let stored = StoredMessage {
                content: text,
                sender: own_login.clone(),
                sender_name: None,
                timestamp: shared::time::now_iso(),
                direction: Direction::Sent,
                offline: false,
                archived: false,
                broadcast: false,
            };
            if cache.borrow_mut().push(&user_id, stored) {
                persist_cache(&storage_key, &cache.borrow());
                messages.set(cache.borrow().messages(&user_id).to_vec());
            }
            draft.set(String::new());
        })
    };

    let on_unarchive = {
        let socket = socket.clone();
        let archived = archived.clone();
        let toasts = toasts.dispatcher();
        let force_logout = force_logout.clone();
        Callback::from(move |user_id: String| {
            let socket = socket.clone();
            let archived = archived.clone();
            let toasts = toasts.clone();
            let force_logout = force_logout.clone();
            spawn_local(async move {
                match SupportApi::shared().unarchive_conversation(&user_id).await {
                    Ok(response) => {
                        toasts.dispatch(ToastAction::Push(Toast::success(response.message)));
                        refresh_archived(archived, toasts);
                        let chat = socket.borrow().clone();
                        chat.request_conversations();
                        chat.request_connected_users();
                    }
                    Err(ApiError::Unauthorized) => force_logout.emit(()),
                    Err(error) => {
                        toasts.dispatch(ToastAction::Push(Toast::error(error.to_string())));
                    }
                }
            });
        })
    };

    let on_show_info = {
        let selected = selected.clone();
        let user_info = user_info.clone();
        let toasts = toasts.dispatcher();
        let force_logout = force_logout.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(user_id) = (*selected).clone() else {
                return;
            };
            let user_info = user_info.clone();
            let toasts = toasts.clone();
            let force_logout = force_logout.clone();
            spawn_local(async move {
                match SupportApi::shared().user_info(&user_id).await {
                    Ok(info) => user_info.set(Some(info)),
                    Err(ApiError::Unauthorized) => force_logout.emit(()),
                    Err(error) => {
                        toasts.dispatch(ToastAction::Push(Toast::error(error.to_string())));
                    }
                }
            });
        })
    };

    let on_confirm = {
        let pending = pending.clone();
        let cache = cache.clone();
        let selected_ref = selected_ref.clone();
        let selected = selected.clone();
        let messages = messages.clone();
        let archived = archived.clone();
        let toasts = toasts.dispatcher();
        let force_logout = force_logout.clone();
        let storage_key = conversations_key(&own_login);
        Callback::from(move |()| {
            let Some(action) = (*pending).clone() else {
                return;
            };
            pending.set(None);
            let cache = cache.clone();
            let selected_ref = selected_ref.clone();
            let selected = selected.clone();
            let messages = messages.clone();
            let archived = archived.clone();
            let toasts = toasts.clone();
            let force_logout = force_logout.clone();
            let storage_key = storage_key.clone();
            spawn_local(async move {
                let client = SupportApi::shared();
                match action {
                    PendingAction::Archive(login) => {
                        match client.archive_conversation(&login).await {
                            Ok(response) => {
                                cache.borrow_mut().remove(&login);
                                persist_cache(&storage_key, &cache.borrow());
                                if selected_ref.borrow().as_deref() == Some(login.as_str()) {
                                    *selected_ref.borrow_mut() = None;
                                    selected.set(None);
                                    messages.set(Vec::new());
                                }
                                toasts.dispatch(ToastAction::Push(Toast::success(format!(
                                    "{} ({} messages)",
                                    response.message, response.archived_messages
                                ))));
                                refresh_archived(archived, toasts);
                            }
                            Err(ApiError::Unauthorized) => force_logout.emit(()),
                            Err(error) => {
                                toasts
                                    .dispatch(ToastAction::Push(Toast::error(error.to_string())));
                            }
                        }
                    }
                    PendingAction::ClearCache => match client.clear_user_cache().await {
                        Ok(response) => {
                            toasts.dispatch(ToastAction::Push(Toast::success(response.message)));
                        }
                        Err(ApiError::Unauthorized) => force_logout.emit(()),
                        Err(error) => {
                            toasts.dispatch(ToastAction::Push(Toast::error(error.to_string())));
                        }
                    },
                    PendingAction::ResetDatabase => match client.reset_database().await {
                        Ok(response) => {
                            toasts.dispatch(ToastAction::Push(Toast::success(response.message)));
                        }
                        Err(ApiError::Unauthorized) => force_logout.emit(()),
                        Err(error) => {
                            toasts.dispatch(ToastAction::Push(Toast::error(error.to_string())));
                        }
                    },
                }
            });
        })
    };

    let on_cancel_pending = {
        let pending = pending.clone();
        Callback::from(move |()| pending.set(None))
    };

    let on_archive_click = {
        let pending = pending.clone();
        let selected = selected.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(user_id) = (*selected).clone() {
                pending.set(Some(PendingAction::Archive(user_id)));
            }
        })
    };
    let on_clear_cache_click = {
        let pending = pending.clone();
        Callback::from(move |_: MouseEvent| pending.set(Some(PendingAction::ClearCache)))
    };
    let on_reset_click = {
        let pending = pending.clone();
        Callback::from(move |_: MouseEvent| pending.set(Some(PendingAction::ResetDatabase)))
    };

    let on_broadcast_open = {
        let broadcast_open = broadcast_open.clone();
        Callback::from(move |_: MouseEvent| broadcast_open.set(true))
    };
    let on_broadcast_close = {
        let broadcast_open = broadcast_open.clone();
        Callback::from(move |()| broadcast_open.set(false))
    };
    let on_broadcast_send = {
        let socket = socket.clone();
        let broadcast_open = broadcast_open.clone();
        let toasts = toasts.dispatcher();
        Callback::from(move |text: String| {
            if socket.borrow().send_broadcast(&text) {
                toasts.dispatch(ToastAction::Push(Toast::success("Broadcast sent")));
            }
            broadcast_open.set(false);
        })
    };

    let on_close_info = {
        let user_info = user_info.clone();
        Callback::from(move |()| user_info.set(None))
    };

    let on_toggle_sound = {
        let sound_on = sound_on.clone();
        Callback::from(move |_: MouseEvent| sound_on.set(notify::toggle_sound()))
    };

    let on_dismiss = {
        let toasts = toasts.dispatcher();
        Callback::from(move |id: Uuid| toasts.dispatch(ToastAction::Dismiss(id)))
    };

    let on_logout = {
        let force_logout = force_logout;
        Callback::from(move |_: MouseEvent| force_logout.emit(()))
    };

    let Some(profile) = profile else {
        return html! {};
    };

    let selected_name = (*selected).as_ref().map(|user_id| {
        roster
            .iter()
            .find(|user| &user.user_id == user_id)
            .map_or_else(|| user_id.clone(), |user| user.name.clone())
    });

    html! {
        <div class="flex flex-col h-screen bg-base-200">
            <header class="navbar bg-base-100 shadow">
                <div class="flex-1 gap-2">
                    <span class="text-lg font-semibold px-2">{"Support console"}</span>
                    <ConnectionStatus state={*connection} />
                </div>
                <div class="flex-none gap-2">
                    <span class="px-2">{ profile.display_name() }</span>
                    <button class="btn btn-ghost btn-sm" title="Broadcast" onclick={on_broadcast_open}>
                        {"📢"}
                    </button>
                    <button class="btn btn-ghost btn-sm" title="Toggle sound" onclick={on_toggle_sound}>
                        { if *sound_on { "🔊" } else { "🔇" } }
                    </button>
                    <button class="btn btn-ghost btn-sm" title="Clear user cache" onclick={on_clear_cache_click}>
                        {"🧹"}
                    </button>
                    <button class="btn btn-ghost btn-sm" title="Reset database" onclick={on_reset_click}>
                        {"⚠️"}
                    </button>
                    <button class="btn btn-ghost btn-sm" onclick={on_logout}>{"Sign out"}</button>
                </div>
            </header>
            <div class="flex flex-1 overflow-hidden">
                <aside class="w-72 bg-base-100 border-r border-base-300 overflow-y-auto">
                    <UserList
                        users={(*roster).clone()}
                        archived={(*archived).clone()}
                        unread={(*unread).clone()}
                        selected={(*selected).clone()}
                        on_select={on_select}
                        on_unarchive={on_unarchive}
                    />
                </aside>
                <main class="flex flex-col flex-1">
                    if let Some(name) = selected_name {
                        <div class="flex items-center gap-2 p-2 bg-base-100 border-b border-base-300">
                            <span class="font-semibold flex-1">{ name }</span>
                            <button class="btn btn-ghost btn-sm" title="User info" onclick={on_show_info}>
                                {"ℹ️"}
                            </button>
                            <button class="btn btn-ghost btn-sm" title="Archive" onclick={on_archive_click}>
                                {"📁"}
                            </button>
                        </div>
                        <MessageList messages={(*messages).clone()} />
                        <form class="p-4 bg-base-100 flex gap-2 items-end" onsubmit={onsubmit}>
                            <textarea
                                class="textarea textarea-bordered flex-1"
                                rows="2"
                                placeholder="Reply"
                                value={(*draft).clone()}
                                oninput={oninput}
                            />
                            <button
                                class="btn btn-primary"
                                type="submit"
                                disabled={draft.trim().is_empty()}
                            >
                                {"Send"}
                            </button>
                        </form>
                    } else {
                        <div class="flex flex-1 items-center justify-center text-base-content/50">
                            {"Select a conversation"}
                        </div>
                    }
                </main>
            </div>
            <BroadcastModal
                open={*broadcast_open}
                on_send={on_broadcast_send}
                on_close={on_broadcast_close}
            />
            if let Some(action) = &*pending {
                <ConfirmModal
                    open=true
                    title={action.title().to_string()}
                    message={action.message()}
                    on_confirm={on_confirm}
                    on_cancel={on_cancel_pending}
                />
            }
            <UserInfoModal info={(*user_info).clone()} on_close={on_close_info} />
            <ToastStack toasts={toasts.items.clone()} on_dismiss={on_dismiss} />
        </div>
    }
}
