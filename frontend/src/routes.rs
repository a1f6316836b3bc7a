use crate::models::app_state::AppState;
use crate::pages::{AdminPage, ChatPage, LoginPage};
use strum::EnumIter;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::use_selector;

/// The main routes
#[derive(Debug, Clone, PartialEq, Routable, EnumIter)]
pub enum MainRoute {
    #[at("/")]
    Chat,
    #[at("/login")]
    Login,
    #[at("/admin")]
    Admin,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[derive(Properties, PartialEq)]
pub struct MainRouteViewProps {
    pub route: MainRoute,
}

#[function_component(MainRouteView)]
fn main_route_view(props: &MainRouteViewProps) -> Html {
    let user = use_selector(|state: &AppState| state.user.clone());
    let user_opt = (*user).clone();
    let is_authenticated = user_opt.is_some();
    let is_admin = user_opt.as_ref().is_some_and(|user| user.is_admin);

    match props.route.clone() {
        MainRoute::Login => {
            if is_admin {
                html! { <Redirect<MainRoute> to={MainRoute::Admin} /> }
            } else if is_authenticated {
                html! { <Redirect<MainRoute> to={MainRoute::Chat} /> }
            } else {
                html! { <LoginPage /> }
            }
        }
        MainRoute::Chat => {
            if !is_authenticated {
                return html! { <Redirect<MainRoute> to={MainRoute::Login} /> };
            }
            if is_admin {
                return html! { <Redirect<MainRoute> to={MainRoute::Admin} /> };
            }
            html! { <ChatPage /> }
        }
        MainRoute::Admin => {
            if !is_authenticated {
                return html! { <Redirect<MainRoute> to={MainRoute::Login} /> };
            }
            if !is_admin {
                return html! { <Redirect<MainRoute> to={MainRoute::Chat} /> };
            }
            html! { <AdminPage /> }
        }
        MainRoute::NotFound => {
            if !is_authenticated {
                return html! { <Redirect<MainRoute> to={MainRoute::Login} /> };
            }
            html! {
                <div class="flex flex-col items-center justify-center min-h-screen bg-base-200">
                    <h1 class="text-4xl font-bold">{"404"}</h1>
                    <p class="mt-2">{"Page not found"}</p>
                </div>
            }
        }
    }
}

/// Switch function for the main routes.
pub fn switch(route: MainRoute) -> Html {
    web_sys::console::log_1(&format!("Switching to route: {:?}", route).into());
    html! { <MainRouteView {route} /> }
}
