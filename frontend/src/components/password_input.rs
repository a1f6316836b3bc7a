use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PasswordInputProps {
    pub value: String,
    pub oninput: Callback<InputEvent>,
    #[prop_or_default]
    pub id: Option<String>,
    #[prop_or_default]
    pub placeholder: Option<String>,
}

/// Password field with a show/hide toggle. The toggle never steals focus
/// from the field, so typing continues uninterrupted.
#[function_component(PasswordInput)]
pub fn password_input(props: &PasswordInputProps) -> Html {
    let revealed = use_state(|| false);

    let toggle = {
        let revealed = revealed.clone();
        Callback::from(move |_: MouseEvent| revealed.set(!*revealed))
    };
    let keep_focus = Callback::from(|event: MouseEvent| event.prevent_default());

    let input_type = if *revealed { "text" } else { "password" };
    let label = if *revealed {
        "Hide password"
    } else {
        "Show password"
    };

    html! {
        <div class="relative">
            <input
                id={props.id.clone()}
                class="input input-bordered w-full pr-12"
                type={input_type}
                required=true
                value={props.value.clone()}
                oninput={props.oninput.clone()}
                placeholder={props.placeholder.clone()}
            />
            <button
                type="button"
                class="btn btn-ghost btn-sm absolute right-1 top-1/2 -translate-y-1/2"
                aria-label={label}
                onmousedown={keep_focus}
                onclick={toggle}
            >
                { if *revealed { "🙈" } else { "👁" } }
            </button>
        </div>
    }
}
