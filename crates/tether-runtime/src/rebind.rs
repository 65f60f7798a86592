#![forbid(unsafe_code)]

//! Teardown reset selection when a bound key is bound again.
//!
//! When a bind call targets a key that is already bound, the prior binding is
//! torn down first, and the reset argument for that teardown is computed from
//! the NEW binding's effective configuration:
//!
//! | `wait`  | `reset`            | teardown argument  |
//! |---------|--------------------|--------------------|
//! | `false` | any                | `reset`, verbatim  |
//! | `true`  | a producer         | that producer      |
//! | `true`  | anything else      | [`Reset::Keep`]    |
//!
//! A waiting rebind keeps the old value on screen until the new data arrives;
//! an eager reset there would flash the property to its default. A caller
//! that supplies an explicit producer gets it honored even while waiting —
//! the producer is the caller's own transition value.

use tether_core::{BindConfig, Reset};

/// Reset argument for the prior binding's teardown, per the table above.
#[must_use]
pub fn teardown_reset(next: &BindConfig) -> Reset {
    if !next.wait {
        return next.reset.clone();
    }
    match &next.reset {
        Reset::With(_) => next.reset.clone(),
        _ => Reset::Keep,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config(wait: bool, reset: Reset) -> BindConfig {
        BindConfig {
            reset,
            wait,
            ..BindConfig::default()
        }
    }

    #[test]
    fn not_waiting_passes_reset_verbatim() {
        assert!(matches!(
            teardown_reset(&config(false, Reset::Clear)),
            Reset::Clear
        ));
        assert!(matches!(
            teardown_reset(&config(false, Reset::Keep)),
            Reset::Keep
        ));
        let literal = teardown_reset(&config(false, Reset::Value(json!("offline"))));
        assert!(matches!(literal, Reset::Value(value) if value == json!("offline")));
    }

    #[test]
    fn waiting_honors_a_producer() {
        let produced = teardown_reset(&config(true, Reset::with(|| json!("transition"))));
        let Reset::With(producer) = produced else {
            panic!("producer should pass through while waiting");
        };
        assert_eq!(producer(), json!("transition"));
    }

    #[test]
    fn waiting_suppresses_everything_else() {
        assert!(matches!(
            teardown_reset(&config(true, Reset::Clear)),
            Reset::Keep
        ));
        assert!(matches!(
            teardown_reset(&config(true, Reset::Keep)),
            Reset::Keep
        ));
        assert!(matches!(
            teardown_reset(&config(true, Reset::Value(json!([])))),
            Reset::Keep
        ));
    }
}
