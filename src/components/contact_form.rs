use leptos::prelude::*;

use crate::api::contact::ContactRequest;
use crate::components::locale_switcher::use_locale;

/// Store a contact message through the same validation as
/// `POST /api/v1/messages`.
#[server]
pub async fn send_message(request: ContactRequest) -> Result<(), ServerFnError> {
    use crate::state::AppState;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    crate::api::contact::submit_message(state.rows.as_ref(), request)
        .await
        .map(|_| ())
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[component]
pub fn ContactPage() -> impl IntoView {
    let i18n = use_locale();
    let nom = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let sujet = RwSignal::new(String::new());
    let contenu = RwSignal::new(String::new());

    let send_action = Action::new(|request: &ContactRequest| {
        let request = request.clone();
        async move { send_message(request).await }
    });

    // Clear the form once the message is stored
    Effect::new(move |_| {
        if let Some(Ok(())) = send_action.value().get() {
            sujet.set(String::new());
            contenu.set(String::new());
        }
    });

    view! {
        <h1>{move || i18n.t("nav", "contact")}</h1>
        <form
            class="contact-form"
            on:submit=move |ev| {
                ev.prevent_default();
                send_action.dispatch(ContactRequest {
                    nom: nom.get_untracked(),
                    email: email.get_untracked(),
                    sujet: Some(sujet.get_untracked()),
                    contenu: contenu.get_untracked(),
                });
            }
        >
            <label>
                {move || i18n.t("pages", "name")}
                <input type="text" required on:input=move |ev| nom.set(event_target_value(&ev)) prop:value=nom/>
            </label>
            <label>
                {move || i18n.t("pages", "email")}
                <input type="email" required on:input=move |ev| email.set(event_target_value(&ev)) prop:value=email/>
            </label>
            <label>
                {move || i18n.t("pages", "subject")}
                <input type="text" on:input=move |ev| sujet.set(event_target_value(&ev)) prop:value=sujet/>
            </label>
            <label>
                {move || i18n.t("pages", "message")}
                <textarea rows="8" required on:input=move |ev| contenu.set(event_target_value(&ev)) prop:value=contenu></textarea>
            </label>
            <button type="submit" disabled=move || send_action.pending().get()>
                {move || i18n.t("pages", "send")}
            </button>
        </form>
        {move || send_action.value().get().map(|res| match res {
            Ok(()) => view! { <p class="success">{i18n.t("pages", "sent")}</p> }.into_any(),
            Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
        })}
    }
}
