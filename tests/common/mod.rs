#![allow(dead_code)]

use evdev_ff::{EffectRecord, FFDevice, InputEvent};
use nix::errno::Errno;
use std::io;

/// One kernel call, as seen by the fake device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// `EVIOCSFF` with the id the caller sent.
    Upload { requested: i16, level: Option<i16> },
    /// A playback event write.
    Write { slot: u16, value: i32 },
    /// `EVIOCRMFF`.
    Erase(i16),
}

/// An in-memory stand-in for an evdev node, allocating slots like the kernel does (lowest free
/// slot first) and recording every call in order.
pub struct FakeDevice {
    pub calls: Vec<Call>,
    slots: Vec<bool>,
    pub short_write: Option<usize>,
    pub write_error: Option<i32>,
    pub upload_error: Option<Errno>,
    pub erase_error: Option<Errno>,
    /// Written back instead of a free slot on the next new upload.
    pub assigned_id: Option<i16>,
}

impl FakeDevice {
    pub fn new(max_effects: usize) -> Self {
        Self {
            calls: Vec::new(),
            slots: vec![false; max_effects],
            short_write: None,
            write_error: None,
            upload_error: None,
            erase_error: None,
            assigned_id: None,
        }
    }

    pub fn occupied(&self, slot: i16) -> bool {
        self.slots.get(slot as usize).copied().unwrap_or(false)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| **s).count()
    }
}

impl FFDevice for FakeDevice {
    fn upload_effect(&mut self, effect: &mut EffectRecord) -> nix::Result<()> {
        self.calls.push(Call::Upload {
            requested: effect.id(),
            level: effect.constant().map(|(level, _)| level),
        });
        if let Some(errno) = self.upload_error {
            return Err(errno);
        }

        if effect.id() == -1 {
            if let Some(id) = self.assigned_id.take() {
                effect.set_id(id);
                return Ok(());
            }
            let free = self.slots.iter().position(|s| !*s).ok_or(Errno::ENOSPC)?;
            self.slots[free] = true;
            effect.set_id(free as i16);
            Ok(())
        } else if self.occupied(effect.id()) {
            Ok(())
        } else {
            Err(Errno::EINVAL)
        }
    }

    fn write_event(&mut self, event: &InputEvent) -> io::Result<usize> {
        self.calls.push(Call::Write {
            slot: event.code(),
            value: event.value(),
        });
        if let Some(code) = self.write_error {
            return Err(io::Error::from_raw_os_error(code));
        }
        Ok(self.short_write.unwrap_or(event.as_bytes().len()))
    }

    fn erase_effect(&mut self, slot: i16) -> nix::Result<()> {
        self.calls.push(Call::Erase(slot));
        if let Some(errno) = self.erase_error {
            return Err(errno);
        }
        if !self.occupied(slot) {
            return Err(Errno::EINVAL);
        }
        self.slots[slot as usize] = false;
        Ok(())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
