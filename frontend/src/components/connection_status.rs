use yew::prelude::*;

/// Transport state as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Connecting,
    Reconnecting(u32),
    Offline,
}

#[derive(Properties, PartialEq)]
pub struct ConnectionStatusProps {
    pub state: ConnectionState,
}

#[function_component(ConnectionStatus)]
pub fn connection_status(props: &ConnectionStatusProps) -> Html {
    let (class, label) = match props.state {
        ConnectionState::Connected => ("badge badge-success", "Online".to_string()),
        ConnectionState::Connecting => ("badge badge-warning", "Connecting...".to_string()),
        ConnectionState::Reconnecting(attempt) => (
            "badge badge-warning",
            format!("Reconnecting (attempt {attempt})"),
        ),
        ConnectionState::Offline => ("badge badge-error", "Offline".to_string()),
    };
    html! { <span class={class}>{ label }</span> }
}
