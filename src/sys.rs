use crate::compat::{
    ff_condition_effect, ff_constant_effect, ff_periodic_effect, ff_ramp_effect, ff_replay,
    ff_rumble_effect, ff_trigger,
};
use nix::{ioctl_write_int, ioctl_write_ptr};

/// Kind-specific parameters of `struct ff_effect`.
///
/// Only `constant` is ever written by this crate, but every member has to be present so the
/// union, and therefore the ioctl request size, matches the kernel's.
#[repr(C)]
#[derive(Clone, Copy)]
pub union ff_effect_union {
    pub constant: ff_constant_effect,
    pub ramp: ff_ramp_effect,
    pub periodic: ff_periodic_effect,
    pub condition: [ff_condition_effect; 2],
    pub rumble: ff_rumble_effect,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct ff_effect {
    pub type_: u16,
    pub id: i16,
    pub direction: u16,
    pub trigger: ff_trigger,
    pub replay: ff_replay,
    pub u: ff_effect_union,
}

impl ff_effect {
    /// An all-zero record, including every byte of the parameter union.
    pub fn zeroed() -> Self {
        // SAFETY: every field is an integer or a raw pointer, for which all-zero is valid.
        unsafe { std::mem::zeroed() }
    }
}

// The kernel writes the assigned effect id back into the record.
ioctl_write_ptr!(eviocsff, b'E', 0x80, ff_effect);
ioctl_write_int!(eviocrmff, b'E', 0x81);
