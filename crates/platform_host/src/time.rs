//! Clock helpers shared by host contracts and the runtime message bus.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static LAST_ISSUED_MS: Cell<u64> = const { Cell::new(0) };
}

/// Returns the current wall-clock time in unix milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Returns a strictly increasing unix millisecond stamp for the current thread.
///
/// Two calls within the same millisecond still yield distinct, ordered values.
pub fn next_monotonic_timestamp_ms() -> u64 {
    let now = unix_time_ms_now();
    LAST_ISSUED_MS.with(|last| {
        let issued = now.max(last.get().saturating_add(1));
        last.set(issued);
        issued
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_stamps_never_repeat() {
        let first = next_monotonic_timestamp_ms();
        let second = next_monotonic_timestamp_ms();
        let third = next_monotonic_timestamp_ms();
        assert!(first < second && second < third);
    }
}
