//! Best-effort user alerts.
//!
//! Three independent channels: a system notification (only with granted
//! permission and a hidden tab), an in-page toast delivered through a
//! callback the owning page supplies, and a short two-tone audio cue
//! gated by a persisted preference. A failing channel logs a console
//! warning and never takes the others down.

use gloo_storage::{LocalStorage, Storage};
use gloo_timers::callback::Timeout;
use uuid::Uuid;
use web_sys::{AudioContext, Notification, NotificationOptions, NotificationPermission, OscillatorType};
use yew::Callback;

const SOUND_KEY: &str = "soundEnabled";
const SYSTEM_NOTIFICATION_TIMEOUT_MS: u32 = 5_000;

/// One in-page toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub flavor: ToastFlavor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastFlavor {
    Info,
    Success,
    Error,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_flavor(message, ToastFlavor::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_flavor(message, ToastFlavor::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_flavor(message, ToastFlavor::Error)
    }

    fn with_flavor(message: impl Into<String>, flavor: ToastFlavor) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            flavor,
        }
    }
}

/// Fan-out point for incoming-message alerts.
#[derive(Clone, PartialEq)]
pub struct Notifier {
    toast_sink: Callback<Toast>,
}

impl Notifier {
    pub fn new(toast_sink: Callback<Toast>) -> Self {
        Self { toast_sink }
    }

    /// Ask the browser for notification permission if still undecided.
    pub fn request_permission() {
        if Notification::permission() == NotificationPermission::Default {
            // The returned promise resolves with the user's choice; the
            // next notification call re-reads the permission anyway.
            let _ = Notification::request_permission();
        }
    }

    /// Announce an incoming message on every enabled channel.
    pub fn message_received(&self, title: &str, body: &str) {
        self.toast_sink.emit(Toast::info(body));
        system_notification(title, body);
        if sound_enabled() {
            play_chime();
        }
    }

    pub fn toast(&self, toast: Toast) {
        self.toast_sink.emit(toast);
    }
}

fn document_hidden() -> bool {
    web_sys::window()
        .and_then(|window| window.document())
        .is_some_and(|document| document.hidden())
}

/// System notifications only fire for hidden tabs; a visible chat page
/// already shows the message.
fn system_notification(title: &str, body: &str) {
    if Notification::permission() != NotificationPermission::Granted || !document_hidden() {
        return;
    }
    let options = NotificationOptions::new();
    options.set_body(body);
    match Notification::new_with_options(title, &options) {
        Ok(notification) => {
            Timeout::new(SYSTEM_NOTIFICATION_TIMEOUT_MS, move || notification.close()).forget();
        }
        Err(err) => web_sys::console::warn_2(&"notification failed:".into(), &err),
    }
}

fn play_chime() {
    if let Err(err) = try_play_chime() {
        web_sys::console::warn_2(&"audio cue failed:".into(), &err);
    }
}

/// Two descending sine tones, 800 Hz then 600 Hz, fading out over 0.2 s.
fn try_play_chime() -> Result<(), wasm_bindgen::JsValue> {
    let ctx = AudioContext::new()?;
    let oscillator = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    oscillator.set_type(OscillatorType::Sine);
    let start = ctx.current_time();
    oscillator.frequency().set_value_at_time(800.0, start)?;
    oscillator.frequency().set_value_at_time(600.0, start + 0.1)?;
    gain.gain().set_value_at_time(0.3, start)?;
    gain.gain().exponential_ramp_to_value_at_time(0.01, start + 0.2)?;

    oscillator.start()?;
    oscillator.stop_with_when(start + 0.2)?;
    Ok(())
}

/// Sound preference, on by default.
pub fn sound_enabled() -> bool {
    LocalStorage::get(SOUND_KEY).unwrap_or(true)
}

/// Flip and persist the sound preference; returns the new value.
pub fn toggle_sound() -> bool {
    let enabled = !sound_enabled();
    if LocalStorage::set(SOUND_KEY, enabled).is_err() {
        web_sys::console::warn_1(&"failed to persist sound preference".into());
    }
    enabled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_constructors_set_flavor() {
        assert_eq!(Toast::info("a").flavor, ToastFlavor::Info);
        assert_eq!(Toast::success("b").flavor, ToastFlavor::Success);
        assert_eq!(Toast::error("c").flavor, ToastFlavor::Error);
    }

    #[test]
    fn toast_ids_are_unique() {
        assert_ne!(Toast::info("same").id, Toast::info("same").id);
    }
}
