use desktop_runtime::{DesktopProvider, DesktopShell};
use leptos::*;
use leptos_meta::*;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Web Desktop" />
        <Meta name="description" content="A desktop environment that runs in the browser." />

        <main class="site-root">
            <DesktopEntry />
        </main>
    }
}

#[component]
pub fn DesktopEntry() -> impl IntoView {
    view! {
        <DesktopProvider>
            <DesktopShell />
        </DesktopProvider>
    }
}
