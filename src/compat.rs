//! Compatibility layer for non-Linux builds.
//!
//! The force-feedback records and `input_event` come from libc where it has them, and from
//! mirrored definitions everywhere else.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(any(
        target_os = "linux",
        target_os = "l4re",
        target_os = "android",
        target_os = "emscripten"
    ))] {
        pub(crate) use libc::{
            ff_condition_effect, ff_constant_effect, ff_envelope, ff_periodic_effect, ff_ramp_effect,
            ff_replay, ff_rumble_effect, ff_trigger, input_event,
        };
    } else {
        mod non_linux;
        pub(crate) use non_linux::{
            ff_condition_effect, ff_constant_effect, ff_envelope, ff_periodic_effect, ff_ramp_effect,
            ff_replay, ff_rumble_effect, ff_trigger, input_event,
        };
    }
}
