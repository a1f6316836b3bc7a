use gloo_storage::{LocalStorage, Storage};
use shared::models::{ConversationCache, Direction, ServerFrame, StoredMessage};
use uuid::Uuid;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;
use yew_router::hooks::use_navigator;
use yewdux::prelude::use_store;

use crate::auth;
use crate::components::{
    ConnectionState, ConnectionStatus, MessageList, ToastAction, ToastList, ToastStack,
};
use crate::config::FrontendConfig;
use crate::models::app_state::AppState;
use crate::notify::{self, Notifier, Toast};
use crate::routes::MainRoute;
use crate::socket::{ChatSocket, EventKind, SocketEvent};

/// The counterpart login every user conversation is keyed under.
const OPERATOR: &str = "admin";
const MAX_MESSAGE_LEN: usize = 1000;

fn history_key(login: &str) -> String {
    format!("chatHistory_{login}")
}

// The limit counts characters, not bytes; Cyrillic text is two bytes per
// character in UTF-8 and must not halve the allowance.
fn within_limit(text: &str) -> bool {
    text.chars().count() <= MAX_MESSAGE_LEN
}

fn persist_history(key: &str, cache: &ConversationCache) {
    if LocalStorage::set(key, cache).is_err() {
        web_sys::console::warn_1(&"failed to persist chat history".into());
    }
}

fn received(
    message: &str,
    sender: &str,
    sender_name: Option<&str>,
    timestamp: &str,
) -> StoredMessage {
    StoredMessage {
        content: message.to_string(),
        sender: sender.to_string(),
        sender_name: sender_name.map(str::to_string),
        timestamp: timestamp.to_string(),
        direction: Direction::Received,
        offline: false,
        archived: false,
        broadcast: false,
    }
}

#[function_component(ChatPage)]
pub fn chat_page() -> Html {
    let (state, dispatch) = use_store::<AppState>();
    let navigator = use_navigator();
    let socket = use_mut_ref(ChatSocket::new);
    let cache = use_mut_ref(ConversationCache::new);
    let messages = use_state(Vec::<StoredMessage>::new);
    let connection = use_state(|| ConnectionState::Connecting);
    let toasts = use_reducer(ToastList::default);
    let draft = use_state(String::new);
    let sound_on = use_state(notify::sound_enabled);

    let profile = state.user.clone();

    {
        let socket = socket.clone();
        let cache = cache.clone();
        let messages = messages.clone();
        let connection = connection.clone();
        let toasts = toasts.dispatcher();
        let profile_opt = profile.clone();
        use_effect_with((), move |_| {
            let cleanup: Box<dyn FnOnce()> = if let Some(profile) = profile_opt {
                let storage_key = history_key(&profile.login);
                if let Ok(stored) = LocalStorage::get::<ConversationCache>(&storage_key) {
                    *cache.borrow_mut() = stored;
                    messages.set(cache.borrow().messages(OPERATOR).to_vec());
                }

                Notifier::request_permission();
                let notifier = Notifier::new({
                    let toasts = toasts.clone();
                    Callback::from(move |toast: Toast| toasts.dispatch(ToastAction::Push(toast)))
                });

                let chat = socket.borrow().clone();
                let page_size = FrontendConfig::default().history_page_size;

                {
                    let connection = connection.clone();
                    let chat_handle = chat.clone();
                    chat.on(EventKind::Connected, move |_| {
                        connection.set(ConnectionState::Connected);
                        chat_handle.request_history(OPERATOR, page_size, 0);
                        chat_handle.mark_as_read(OPERATOR);
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
                    let messages = messages.clone();
                    let notifier = notifier.clone();
                    let chat_handle = chat.clone();
                    let storage_key = storage_key.clone();
                    let own_login = profile.login.clone();
                    chat.on(EventKind::Frame, move |event| {
                        let SocketEvent::Frame(frame) = event else { return };
                        match frame {
                            ServerFrame::Welcome { message, .. } => {
                                if let Some(text) = message {
                                    notifier.toast(Toast::success(text.clone()));
                                }
                            }
                            ServerFrame::AdminMessage {
                                sender,
                                sender_name,
                                message,
                                timestamp,
                            } => {
                                let stored =
                                    received(message, sender, sender_name.as_deref(), timestamp);
                                if cache.borrow_mut().push(OPERATOR, stored) {
                                    persist_history(&storage_key, &cache.borrow());
                                    messages.set(cache.borrow().messages(OPERATOR).to_vec());
                                    let title = sender_name
                                        .clone()
                                        .unwrap_or_else(|| "Support".to_string());
                                    notifier.message_received(&title, message);
                                    chat_handle.mark_as_read(OPERATOR);
                                }
                            }
                            ServerFrame::Broadcast {
                                sender,
                                sender_name,
                                message,
                                timestamp,
                            } => {
                                let mut stored =
                                    received(message, sender, sender_name.as_deref(), timestamp);
                                stored.broadcast = true;
                                if cache.borrow_mut().push(OPERATOR, stored) {
                                    persist_history(&storage_key, &cache.borrow());
                                    messages.set(cache.borrow().messages(OPERATOR).to_vec());
                                    notifier.message_received("Announcement", message);
                                }
                            }
                            ServerFrame::OfflineMessage {
                                sender,
                                sender_name,
                                message,
                                message_type,
                                timestamp,
                            } => {
                                let mut stored =
                                    received(message, sender, sender_name.as_deref(), timestamp);
                                stored.offline = true;
                                stored.broadcast = message_type.as_deref() == Some("broadcast");
                                if cache.borrow_mut().push(OPERATOR, stored) {
                                    persist_history(&storage_key, &cache.borrow());
                                    messages.set(cache.borrow().messages(OPERATOR).to_vec());
                                    let title = sender_name
                                        .clone()
                                        .unwrap_or_else(|| "Support".to_string());
                                    notifier.message_received(&title, message);
                                    chat_handle.mark_as_read(OPERATOR);
                                }
                            }
                            ServerFrame::OfflineMessagesSummary { message, .. } => {
                                notifier.toast(Toast::info(message.clone()));
                            }
                            ServerFrame::ConversationHistory {
                                with_user,
                                messages: history,
                            } => {
                                if with_user != OPERATOR {
                                    return;
                                }
                                let converted: Vec<StoredMessage> = history
                                    .iter()
                                    .map(|entry| StoredMessage {
                                        content: entry.content.clone(),
                                        sender: entry.sender_id.clone(),
                                        sender_name: None,
                                        timestamp: entry.timestamp.clone(),
                                        direction: if entry.sender_id == own_login {
                                            Direction::Sent
                                        } else {
                                            Direction::Received
                                        },
                                        offline: false,
                                        archived: entry.is_archived,
                                        broadcast: entry.message_type.as_deref()
                                            == Some("broadcast"),
                                    })
                                    .collect();
                                cache.borrow_mut().merge_history(OPERATOR, converted);
                                persist_history(&storage_key, &cache.borrow());
                                messages.set(cache.borrow().messages(OPERATOR).to_vec());
                            }
                            ServerFrame::Error { message } => {
                                notifier.toast(Toast::error(message.clone()));
                            }
                            _ => {}
                        }
                    })
                };

                // Read receipts when the tab becomes visible again.
                let visibility = {
                    let chat = chat.clone();
                    Closure::wrap(Box::new(move || {
                        let hidden = web_sys::window()
                            .and_then(|window| window.document())
                            .is_some_and(|document| document.hidden());
                        if !hidden && chat.is_connected() {
                            chat.mark_as_read(OPERATOR);
                        }
                    }) as Box<dyn FnMut()>)
                };
                let document = web_sys::window().and_then(|window| window.document());
                if let Some(document) = &document {
                    if document
                        .add_event_listener_with_callback(
                            "visibilitychange",
                            visibility.as_ref().unchecked_ref(),
                        )
                        .is_err()
                    {
                        web_sys::console::warn_1(&"failed to register visibility listener".into());
                    }
                }

                chat.connect();

                let chat_cleanup = chat.clone();
                Box::new(move || {
                    if let Some(document) = document {
                        let _ = document.remove_event_listener_with_callback(
                            "visibilitychange",
                            visibility.as_ref().unchecked_ref(),
                        );
                    }
                    drop(visibility);
                    chat_cleanup.off(EventKind::Frame, frame_listener);
                    chat_cleanup.disconnect();
                })
            } else {
                Box::new(|| ())
            };
            move || cleanup()
        });
    }

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
        let own_login = profile
            .as_ref()
            .map(|profile| profile.login.clone())
            .unwrap_or_default();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let text = draft.trim().to_string();
            if text.is_empty() || !within_limit(&text) {
                return;
            }
            let chat = socket.borrow().clone();
            chat.send_user_message(&text);
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
            if cache.borrow_mut().push(OPERATOR, stored) {
                persist_history(&history_key(&own_login), &cache.borrow());
                messages.set(cache.borrow().messages(OPERATOR).to_vec());
            }
            draft.set(String::new());
        })
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
        let socket = socket.clone();
        let dispatch = dispatch.clone();
        let navigator = navigator;
        Callback::from(move |_: MouseEvent| {
            socket.borrow().disconnect();
            auth::clear();
            dispatch.set(AppState::default());
            if let Some(ref nav) = navigator {
                nav.push(&MainRoute::Login);
            }
        })
    };

    let Some(profile) = profile else {
        return html! {};
    };

    html! {
        <div class="flex flex-col h-screen bg-base-200">
            <header class="navbar bg-base-100 shadow">
                <div class="flex-1 gap-2">
                    <span class="text-lg font-semibold px-2">{"Support chat"}</span>
                    <ConnectionStatus state={*connection} />
                </div>
                <div class="flex-none gap-2">
                    <span class="px-2">{ profile.display_name() }</span>
                    <button class="btn btn-ghost btn-sm" title="Toggle sound" onclick={on_toggle_sound}>
                        { if *sound_on { "🔊" } else { "🔇" } }
                    </button>
                    <button class="btn btn-ghost btn-sm" onclick={on_logout}>{"Sign out"}</button>
                </div>
            </header>
            <MessageList
                messages={(*messages).clone()}
                empty_hint={"Write to support, we are online".to_string()}
            />
            <form class="p-4 bg-base-100 flex gap-2 items-end" onsubmit={onsubmit}>
                <div class="flex-1">
                    <textarea
                        class="textarea textarea-bordered w-full"
                        rows="2"
                        maxlength={MAX_MESSAGE_LEN.to_string()}
                        placeholder="Your message"
                        value={(*draft).clone()}
                        oninput={oninput}
                    />
                    <div class="text-xs opacity-50 text-right">
                        { format!("{}/{}", draft.chars().count(), MAX_MESSAGE_LEN) }
                    </div>
                </div>
                <button class="btn btn-primary" type="submit" disabled={draft.trim().is_empty()}>
                    {"Send"}
                </button>
            </form>
            <ToastStack toasts={toasts.items.clone()} on_dismiss={on_dismiss} />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_counts_characters_not_bytes() {
        let message = "д".repeat(MAX_MESSAGE_LEN);
        assert!(message.len() > MAX_MESSAGE_LEN);
        assert!(within_limit(&message));
    }

    #[test]
    fn over_limit_drafts_are_rejected() {
        assert!(within_limit(&"a".repeat(MAX_MESSAGE_LEN)));
        assert!(!within_limit(&"a".repeat(MAX_MESSAGE_LEN + 1)));
    }
}
