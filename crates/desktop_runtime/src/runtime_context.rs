//! Runtime provider and context wiring for the desktop shell.
//!
//! This module owns the long-lived reducer container, the runtime effect queue, the pointer
//! gesture tracker, and the message bus. UI composition stays in [`crate::components`].
#![allow(clippy::clone_on_copy)]

use std::rc::Rc;

use leptos::*;

use crate::{
    app_bus::MessageBus,
    effect_executor,
    host::DesktopHostContext,
    interaction::GestureTracker,
    model::DesktopState,
    persistence::StartupApp,
    reducer::{reduce_desktop, DesktopAction, RuntimeEffect, Transition},
    shell_service::{shell_service_methods, ShellPort, SHELL_APP_ID, SHELL_SERVICE},
};

/// Bus registration id for the shell itself; window ids start at 1.
const SHELL_RUNTIME_ID: u64 = 0;

#[derive(Clone, Copy)]
/// Leptos context for reading desktop runtime state and dispatching [`DesktopAction`] values.
pub struct DesktopRuntimeContext {
    /// Host service bundle for executing runtime side effects and environment queries.
    pub host: StoredValue<DesktopHostContext>,
    /// Reactive desktop state signal.
    pub state: RwSignal<DesktopState>,
    /// Pointer drag/resize gesture in progress, if any.
    pub gesture: RwSignal<GestureTracker>,
    /// Queue of runtime effects emitted by the reducer and processed by the shell.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// App-to-app message bus shared with hosted apps.
    pub bus: StoredValue<MessageBus>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<DesktopAction>,
}

impl DesktopRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: DesktopAction) {
        self.dispatch.call(action);
    }
}

fn register_shell_service(runtime: DesktopRuntimeContext) {
    let port = ShellPort {
        dispatch: Rc::new(move |action: DesktopAction| runtime.dispatch_action(action)),
        snapshot: Rc::new(move || runtime.state.get_untracked()),
        save_startup_apps: Rc::new(move |apps: Vec<StartupApp>| {
            runtime.host.get_value().save_startup_apps(apps)
        }),
    };
    runtime.bus.with_value(|bus| {
        bus.register_app(SHELL_APP_ID, SHELL_RUNTIME_ID);
        bus.register_service(SHELL_APP_ID, SHELL_SERVICE, shell_service_methods(port));
    });
}

fn install_runtime_orchestration(runtime: DesktopRuntimeContext) {
    let host = runtime.host.get_value();
    runtime.dispatch_action(DesktopAction::SetViewport {
        viewport: host.viewport_size(),
    });
    register_shell_service(runtime);
    effect_executor::install(runtime);
    host.install_boot_hydration(runtime.dispatch);
}

#[component]
/// Provides [`DesktopRuntimeContext`] and the [`MessageBus`] to descendant components and boots
/// persisted state.
pub fn DesktopProvider(
    /// Host bundle; defaults to the browser blob store.
    #[prop(optional)]
    host: Option<DesktopHostContext>,
    children: Children,
) -> impl IntoView {
    let host = store_value(host.unwrap_or_default());
    let state = create_rw_signal(DesktopState::default());
    let gesture = create_rw_signal(GestureTracker::default());
    let effects = create_rw_signal(Vec::<RuntimeEffect>::new());
    let bus = MessageBus::new();

    let dispatch = Callback::new(move |action: DesktopAction| {
        let current = state.get_untracked();
        let Transition {
            state: next,
            effects: new_effects,
        } = reduce_desktop(&current, action);

        if next != current {
            state.set(next);
        }
        if !new_effects.is_empty() {
            effects.update(|queue| queue.extend(new_effects));
        }
    });

    let runtime = DesktopRuntimeContext {
        host,
        state,
        gesture,
        effects,
        bus: store_value(bus.clone()),
        dispatch,
    };

    provide_context(runtime.clone());
    provide_context(bus);

    install_runtime_orchestration(runtime);

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
