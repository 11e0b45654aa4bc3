use std::fs::File;
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;

use crate::event::InputEvent;
use crate::ff::EffectRecord;
use crate::sys;

/// The kernel calls an [`EffectSession`](crate::EffectSession) needs from a device.
///
/// This is implemented for an open, writable evdev node (`File`). Tests and simulations can
/// implement it to record or script what the kernel would do.
pub trait FFDevice {
    /// Uploads an effect with `EVIOCSFF`.
    ///
    /// On success the assigned slot has been written back into `effect`.
    fn upload_effect(&mut self, effect: &mut EffectRecord) -> nix::Result<()>;

    /// Writes one event record, returning how many bytes the device accepted.
    ///
    /// Implementations must not retry or buffer; a short count is reported as is.
    fn write_event(&mut self, event: &InputEvent) -> io::Result<usize>;

    /// Frees a slot with `EVIOCRMFF`.
    fn erase_effect(&mut self, slot: i16) -> nix::Result<()>;
}

impl FFDevice for File {
    fn upload_effect(&mut self, effect: &mut EffectRecord) -> nix::Result<()> {
        log::trace!("EVIOCSFF {:?}", effect);
        unsafe { sys::eviocsff(self.as_raw_fd(), &mut effect.0 as *mut sys::ff_effect)? };
        Ok(())
    }

    fn write_event(&mut self, event: &InputEvent) -> io::Result<usize> {
        log::trace!("write {:?}", event);
        self.write(event.as_bytes())
    }

    fn erase_effect(&mut self, slot: i16) -> nix::Result<()> {
        log::trace!("EVIOCRMFF {}", slot);
        unsafe { sys::eviocrmff(self.as_raw_fd(), slot as _)? };
        Ok(())
    }
}

impl<D: FFDevice + ?Sized> FFDevice for &mut D {
    fn upload_effect(&mut self, effect: &mut EffectRecord) -> nix::Result<()> {
        (**self).upload_effect(effect)
    }

    fn write_event(&mut self, event: &InputEvent) -> io::Result<usize> {
        (**self).write_event(event)
    }

    fn erase_effect(&mut self, slot: i16) -> nix::Result<()> {
        (**self).erase_effect(slot)
    }
}
