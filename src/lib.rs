//! Force feedback effect slots on Linux event devices.
//!
//! An evdev device that supports force feedback stores a small, fixed number of effects in
//! kernel-managed *slots*. Userspace uploads an effect description with the `EVIOCSFF` ioctl
//! (getting back the slot it landed in), starts and stops it by writing `EV_FF` events to the
//! device node, and frees the slot again with `EVIOCRMFF`. The upstream kernel documentation is
//! here:
//!
//! - https://www.kernel.org/doc/Documentation/input/ff.txt
//!
//! This crate wraps that protocol in two pieces. [`EffectDescriptor`] (built through
//! [`EffectBuilder`]) describes an effect with every field of the kernel record set, and always
//! converts into a fully zero-initialized record. [`EffectSession`] owns the slots one process
//! uploaded to one device and enforces the order of operations: only effects uploaded through
//! the session can be played, stopped, updated or removed, and a removed effect stays removed.
//!
//! Only constant-force effects are supported. Opening the device is left to the caller; any
//! writable `File` for a `/dev/input/eventN` node can be handed to a session:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use evdev_ff::{EffectDescriptor, EffectSession};
//! use std::fs::OpenOptions;
//!
//! let file = OpenOptions::new()
//!     .read(true)
//!     .write(true)
//!     .open("/dev/input/event0")?;
//! let mut session = EffectSession::new(file);
//!
//! let push_left = EffectDescriptor::constant(-0x4000).length(500).build()?;
//! let effect = session.upload(push_left)?;
//! session.play(effect)?;
//! std::thread::sleep(std::time::Duration::from_millis(500));
//! session.remove(effect)?;
//! # Ok(())
//! # }
//! ```
//!
//! For a single force whose strength keeps changing, such as a steering wheel's centering
//! force, [`EffectSession::set_constant_level`] uploads one effect on the first call and
//! updates it in place after that.
//!
//! A session performs blocking syscalls and does no locking of its own. Use one session per
//! device, and put it behind a mutex if several threads need it.

#![cfg(any(unix, target_os = "android"))]
#![allow(non_camel_case_types)]

mod compat;
mod constants;
mod device;
mod error;
mod event;
mod ff;
mod session;
mod sys;

pub use crate::constants::{EnumParseError, EventType, FFEffectType};
pub use crate::device::FFDevice;
pub use crate::error::{Error, Result};
pub use crate::event::{InputEvent, PlaybackAction, PlaybackCommand};
pub use crate::ff::{
    EffectBuilder, EffectDescriptor, EffectKind, EffectRecord, Envelope, Replay, SlotPolicy,
    Trigger,
};
pub use crate::session::{EffectHandle, EffectSession, SlotState};

/// Views a kernel record as the bytes handed to the kernel.
///
/// # Safety
///
/// `T` must have no padding bytes that could be uninitialized.
unsafe fn cast_to_bytes<T: ?Sized>(mem: &T) -> &[u8] {
    std::slice::from_raw_parts(mem as *const T as *const u8, std::mem::size_of_val(mem))
}

#[cfg(test)]
mod test {
    use crate::compat::input_event;
    use crate::sys::ff_effect;

    #[test]
    fn records_have_kernel_sizes() {
        // struct input_event: struct timeval + u16 + u16 + s32
        assert_eq!(
            std::mem::size_of::<input_event>(),
            std::mem::size_of::<libc::timeval>() + 8
        );

        // struct ff_effect: 7 x u16 header, then the union aligned to a pointer
        #[cfg(target_pointer_width = "64")]
        assert_eq!(std::mem::size_of::<ff_effect>(), 48);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(std::mem::size_of::<ff_effect>(), 44);
    }
}
