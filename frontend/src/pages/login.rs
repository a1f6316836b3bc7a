use crate::api::{ApiError, SupportApi};
use crate::auth;
use crate::components::PasswordInput;
use crate::models::app_state::AppState;
use crate::routes::MainRoute;
use shared::models::LoginRequest;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::hooks::use_navigator;
use yewdux::prelude::use_store;

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let login = use_state(String::new);
    let password = use_state(String::new);
    let error = use_state(|| None::<String>);
    let loading = use_state(|| false);
    let navigator = use_navigator();
    let (_state, dispatch) = use_store::<AppState>();

    let onsubmit = {
        let login_handle = login.clone();
        let password_handle = password.clone();
        let error_handle = error.clone();
        let loading_handle = loading.clone();
        let dispatch = dispatch.clone();
        let navigator = navigator;
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let login_value = (*login_handle).clone();
            let password_value = (*password_handle).clone();
            if !auth::is_valid_email(&login_value) {
                error_handle.set(Some("Enter a valid e-mail address".to_string()));
                return;
            }
            loading_handle.set(true);
            error_handle.set(None);
            let loading_ref = loading_handle.clone();
            let error_ref = error_handle.clone();
            let dispatch = dispatch.clone();
            let navigator_handle = navigator.clone();
            spawn_local(async move {
                let client = SupportApi::shared();
                let request = LoginRequest {
                    login: login_value,
                    password: password_value,
                };
                match client.login(&request).await {
                    Ok(response) => {
                        auth::remember(&response);
                        let destination = if response.user.is_admin {
                            MainRoute::Admin
                        } else {
                            MainRoute::Chat
                        };
                        dispatch.set(AppState {
                            user: Some(response.user),
                        });
                        if let Some(ref nav) = navigator_handle {
                            nav.push(&destination);
                        }
                    }
                    Err(ApiError::Rejected(detail)) => error_ref.set(Some(detail)),
                    Err(ApiError::Unauthorized) => {
                        error_ref.set(Some("Invalid credentials".to_string()));
                    }
                    Err(ApiError::Http(_)) => {
                        error_ref.set(Some("Unable to connect to server".to_string()));
                    }
                }
                loading_ref.set(false);
            });
        })
    };

    let on_login_change = {
        let login = login.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                login.set(input.value());
            }
        })
    };

    let on_password_change = {
        let password = password.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                password.set(input.value());
            }
        })
    };

    let is_busy = *loading;
    let disable_submit = (*login).is_empty() || (*password).is_empty() || is_busy;

    html! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-lg bg-base-100">
                <form class="card-body" onsubmit={onsubmit}>
                    <h2 class="card-title text-2xl">{"Support chat"}</h2>
                    if let Some(message) = &*error {
                        <div class="alert alert-error">
                            <span>{message.clone()}</span>
                        </div>
                    }
                    <div class="form-control">
                        <label class="label" for="login">
                            <span class="label-text">{"E-mail"}</span>
                        </label>
                        <input
                            id="login"
                            class="input input-bordered"
                            type="email"
                            required=true
                            value={(*login).clone()}
                            oninput={on_login_change}
                        />
                    </div>
                    <div class="form-control">
                        <label class="label" for="password">
                            <span class="label-text">{"Password"}</span>
                        </label>
                        <PasswordInput
                            id="password"
                            value={(*password).clone()}
                            oninput={on_password_change}
                        />
                    </div>
                    <div class="form-control mt-6">
                        <button class="btn btn-primary" type="submit" disabled={disable_submit}>
                            {if is_busy { "Signing in..." } else { "Sign in" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
