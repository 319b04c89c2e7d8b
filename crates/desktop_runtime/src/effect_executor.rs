//! Drains reducer-emitted runtime effects in order.

use leptos::*;

use crate::runtime_context::DesktopRuntimeContext;

/// Installs the effect executor.
pub fn install(runtime: DesktopRuntimeContext) {
    // Take the whole batch first; effects that dispatch again queue into a fresh vector.
    create_effect(move |_| {
        let queued = runtime.effects.get();
        if queued.is_empty() {
            return;
        }

        runtime.effects.set(Vec::new());

        let host = runtime.host.get_value();
        for effect in queued {
            host.run_runtime_effect(runtime, effect);
        }
    });
}
