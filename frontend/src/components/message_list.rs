use shared::models::{Direction, StoredMessage};
use shared::time;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MessageListProps {
    pub messages: Vec<StoredMessage>,
    #[prop_or_default]
    pub empty_hint: Option<String>,
}

#[function_component(MessageList)]
pub fn message_list(props: &MessageListProps) -> Html {
    if props.messages.is_empty() {
        let hint = props
            .empty_hint
            .clone()
            .unwrap_or_else(|| "No messages yet".to_string());
        return html! {
            <div class="flex flex-1 items-center justify-center text-base-content/50">
                { hint }
            </div>
        };
    }

    html! {
        <div class="flex flex-1 flex-col gap-1 overflow-y-auto p-4">
            { for props.messages.iter().map(render_message) }
        </div>
    }
}

fn render_message(message: &StoredMessage) -> Html {
    let align = match message.direction {
        Direction::Sent => "chat chat-end",
        Direction::Received => "chat chat-start",
    };
    let bubble = if message.broadcast {
        "chat-bubble chat-bubble-warning"
    } else {
        match message.direction {
            Direction::Sent => "chat-bubble chat-bubble-primary",
            Direction::Received => "chat-bubble",
        }
    };
    let author = message
        .sender_name
        .clone()
        .unwrap_or_else(|| message.sender.clone());
    // Fall back to the raw wire value when the timestamp will not parse.
    let stamp = time::format_chat_time(&message.timestamp)
        .map_or_else(|| message.timestamp.clone(), |t| format!("{} {}", t.date, t.time));

    html! {
        <div class={align}>
            <div class="chat-header text-xs opacity-70">
                { author }
                { if message.broadcast { " 📢" } else { "" } }
                { if message.offline { " 📬" } else { "" } }
                { if message.archived { " 📁" } else { "" } }
            </div>
            <div class={bubble}>{ message.content.clone() }</div>
            <div class="chat-footer text-xs opacity-50">{ stamp }</div>
        </div>
    }
}
