use crate::auth;
use crate::models::app_state::AppState;
use crate::routes::{self, MainRoute};
use yew::{Html, function_component, html, use_effect_with, use_state};
use yew_router::prelude::*;
use yewdux::prelude::use_store;

#[function_component(App)]
pub fn app() -> Html {
    let (_state, dispatch) = use_store::<AppState>();
    let restored = use_state(|| false);

    {
        let restored = restored.clone();
        let dispatch = dispatch.clone();
        use_effect_with((), move |_| {
            if auth::is_authenticated() {
                dispatch.set(AppState {
                    user: auth::profile(),
                });
            } else {
                auth::clear();
                dispatch.set(AppState::default());
            }
            restored.set(true);
            || ()
        });
    }

    if !*restored {
        return html! { /* Restoring the stored session */ };
    }

    html! {
        <BrowserRouter>
            <Switch<MainRoute> render={routes::switch} />
        </BrowserRouter>
    }
}
