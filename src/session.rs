use std::collections::BTreeMap;
use std::mem;

use log::{debug, warn};
use nix::errno::Errno;

use crate::device::FFDevice;
use crate::error::{Error, Result};
use crate::event::{InputEvent, PlaybackCommand};
use crate::ff::{EffectDescriptor, EffectKind, EffectRecord, SlotPolicy};

/// Refers to an effect uploaded through an [`EffectSession`].
///
/// Handles are plain tokens: the session keeps the actual state. A handle outlives the slot it
/// names, and every operation on a handle whose slot was removed fails with
/// [`Error::InvalidSlotRequest`], even if the kernel has since handed the same slot number to
/// another upload.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EffectHandle {
    slot: i16,
    serial: u64,
}

impl EffectHandle {
    /// The kernel-assigned slot id. Always non-negative.
    pub fn slot(&self) -> i16 {
        self.slot
    }
}

/// Where an effect is in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SlotState {
    /// Stored on the device, not playing.
    Uploaded,
    /// A start event has been written and no stop event since.
    Playing,
    /// Freed. Terminal.
    Removed,
}

#[derive(Debug)]
struct SlotRecord {
    serial: u64,
    descriptor: EffectDescriptor,
    state: SlotState,
}

/// Owns the force feedback slots this process uploaded to one device.
///
/// Every operation is a blocking syscall on the wrapped device and nothing is retried. Sharing a
/// session between threads requires external locking; the upload and the following play are not
/// atomic with respect to other writers of the same device.
///
/// Slots are only ever freed by [`remove`](Self::remove), [`remove_all`](Self::remove_all) or by
/// the kernel when the device is closed; dropping the session leaves them in place.
#[derive(Debug)]
pub struct EffectSession<D> {
    device: D,
    slots: BTreeMap<i16, SlotRecord>,
    next_serial: u64,
    level_effect: Option<EffectHandle>,
}

impl<D: FFDevice> EffectSession<D> {
    /// Wraps an open, writable device.
    pub fn new(device: D) -> Self {
        Self {
            device,
            slots: BTreeMap::new(),
            next_serial: 0,
            level_effect: None,
        }
    }

    /// Uploads an effect.
    ///
    /// With [`SlotPolicy::RequestNew`] the kernel assigns a free slot. With
    /// [`SlotPolicy::ReuseSlot`] the slot must currently belong to this session; its effect is
    /// redefined in place and keeps its playback state, so an effect that is playing restarts
    /// with the new parameters.
    pub fn upload(&mut self, descriptor: EffectDescriptor) -> Result<EffectHandle> {
        match descriptor.slot() {
            SlotPolicy::RequestNew => self.upload_new(descriptor),
            SlotPolicy::ReuseSlot(slot) => self.upload_in_place(slot, descriptor),
        }
    }

    fn upload_new(&mut self, descriptor: EffectDescriptor) -> Result<EffectHandle> {
        let mut record = EffectRecord::from(&descriptor);
        debug!("uploading {:?} to a new slot", descriptor.kind());
        self.device
            .upload_effect(&mut record)
            .map_err(|errno| Error::UploadRejected { errno })?;

        let slot = record.id();
        if slot < 0 {
            // The kernel always assigns a slot on success; anything else cannot be addressed.
            warn!("upload succeeded without assigning a slot (id {})", slot);
            return Err(Error::UploadRejected {
                errno: Errno::EINVAL,
            });
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        let stored = descriptor.with_slot(SlotPolicy::ReuseSlot(slot))?;
        let previous = self.slots.insert(
            slot,
            SlotRecord {
                serial,
                descriptor: stored,
                state: SlotState::Uploaded,
            },
        );
        if previous.is_some() {
            warn!("kernel reassigned slot {} that this session still tracked", slot);
        }
        debug!("effect uploaded to slot {}", slot);

        Ok(EffectHandle { slot, serial })
    }

    fn upload_in_place(&mut self, slot: i16, descriptor: EffectDescriptor) -> Result<EffectHandle> {
        let serial = match self.slots.get(&slot) {
            Some(record) => record.serial,
            None => return Err(Error::InvalidSlotRequest { slot }),
        };

        let mut record = EffectRecord::from(&descriptor);
        debug!("updating effect in slot {}", slot);
        self.device
            .upload_effect(&mut record)
            .map_err(|errno| Error::UploadRejected { errno })?;

        if let Some(entry) = self.slots.get_mut(&slot) {
            entry.descriptor = descriptor;
        }

        Ok(EffectHandle { slot, serial })
    }

    /// Starts playback of an uploaded effect.
    ///
    /// If the device accepts fewer bytes than a whole event, this fails with
    /// [`Error::WriteIncomplete`] and the effect stays `Uploaded`.
    pub fn play(&mut self, handle: EffectHandle) -> Result<()> {
        match self.live_state(handle)? {
            SlotState::Uploaded => {}
            _ => return Err(Error::AlreadyPlaying { slot: handle.slot }),
        }

        debug!("starting effect in slot {}", handle.slot);
        self.send(PlaybackCommand::start(handle.slot))?;
        self.set_state(handle, SlotState::Playing);
        Ok(())
    }

    /// Stops a playing effect.
    ///
    /// Stopping an effect that is not playing reports [`Error::NotPlaying`] without writing
    /// anything to the device.
    pub fn stop(&mut self, handle: EffectHandle) -> Result<()> {
        match self.live_state(handle)? {
            SlotState::Playing => {}
            _ => return Err(Error::NotPlaying { slot: handle.slot }),
        }

        debug!("stopping effect in slot {}", handle.slot);
        self.send(PlaybackCommand::stop(handle.slot))?;
        self.set_state(handle, SlotState::Uploaded);
        Ok(())
    }

    /// Frees the effect's slot. A playing effect is stopped by the kernel.
    ///
    /// On failure the effect stays tracked in its previous state.
    pub fn remove(&mut self, handle: EffectHandle) -> Result<()> {
        self.live_state(handle)?;

        debug!("removing effect in slot {}", handle.slot);
        self.device
            .erase_effect(handle.slot)
            .map_err(|errno| Error::RemovalFailed {
                slot: handle.slot,
                errno,
            })?;
        self.slots.remove(&handle.slot);
        Ok(())
    }

    /// Uploads an effect into a new slot and starts it right away.
    ///
    /// If `superseded` is given, that effect is removed only after the new effect's start event
    /// has been written, so the device is never left without either of them; for a moment both
    /// slots are occupied. If playing the new effect fails, the new slot is freed again and
    /// `superseded` is left untouched.
    ///
    /// If removing `superseded` fails, [`Error::SupersedeFailed`] is returned. It carries the
    /// handle of the new effect, which stays uploaded and playing.
    pub fn upload_and_play_once(
        &mut self,
        descriptor: EffectDescriptor,
        superseded: Option<EffectHandle>,
    ) -> Result<EffectHandle> {
        if let SlotPolicy::ReuseSlot(slot) = descriptor.slot() {
            return Err(Error::InvalidSlotRequest { slot });
        }
        if let Some(old) = superseded {
            self.live_state(old)?;
        }

        let handle = self.upload_new(descriptor)?;
        if let Err(err) = self.play(handle) {
            if let Err(cleanup) = self.remove(handle) {
                warn!(
                    "failed to free slot {} after its playback failed: {}",
                    handle.slot, cleanup
                );
            }
            return Err(err);
        }

        if let Some(old) = superseded {
            debug!("slot {} supersedes slot {}", handle.slot, old.slot);
            self.remove(old).map_err(|err| match err {
                Error::RemovalFailed { slot, errno } => Error::SupersedeFailed {
                    handle,
                    slot,
                    errno,
                },
                other => other,
            })?;
        }
        Ok(handle)
    }

    /// Drives one constant force whose level changes over time.
    ///
    /// The first call uploads a new effect at `level` and starts it. Later calls redefine that
    /// effect in place and start it again if it was stopped. A level equal to the one already
    /// uploaded is not uploaded again. If the effect has been removed, the next call starts over
    /// with a new slot.
    pub fn set_constant_level(&mut self, level: i16) -> Result<EffectHandle> {
        let current = self
            .level_effect
            .and_then(|h| self.record(h).map(|r| (h, r.descriptor, r.state)));
        let (handle, descriptor, state) = match current {
            Some(current) => current,
            None => {
                let descriptor = EffectDescriptor::constant(level).build()?;
                let handle = self.upload_and_play_once(descriptor, None)?;
                self.level_effect = Some(handle);
                return Ok(handle);
            }
        };

        if descriptor.level() != level {
            debug!("changing level of slot {} to {}", handle.slot, level);
            self.upload_in_place(handle.slot, descriptor.with_level(level))?;
        }
        if state != SlotState::Playing {
            self.play(handle)?;
        }
        Ok(handle)
    }

    /// Removes every effect this session uploaded, lowest slot first.
    ///
    /// Stops at the first failure, leaving that effect and the ones after it in place.
    pub fn remove_all(&mut self) -> Result<()> {
        let handles: Vec<EffectHandle> = self.handles().collect();
        for handle in handles {
            self.remove(handle)?;
        }
        Ok(())
    }

    /// Returns the lifecycle state of the effect behind `handle`.
    pub fn state(&self, handle: EffectHandle) -> SlotState {
        match self.slots.get(&handle.slot) {
            Some(record) if record.serial == handle.serial => record.state,
            _ => SlotState::Removed,
        }
    }

    /// Returns the descriptor last uploaded for `handle`.
    ///
    /// The descriptor targets the handle's slot, so a modified copy can be passed straight back
    /// to [`upload`](Self::upload) to update the effect in place.
    pub fn descriptor(&self, handle: EffectHandle) -> Option<&EffectDescriptor> {
        self.record(handle).map(|r| &r.descriptor)
    }

    /// Returns the kind of the effect behind `handle`.
    pub fn kind(&self, handle: EffectHandle) -> Option<EffectKind> {
        self.descriptor(handle).map(EffectDescriptor::kind)
    }

    /// Iterates over the effects currently uploaded, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = EffectHandle> + '_ {
        self.slots.iter().map(|(&slot, record)| EffectHandle {
            slot,
            serial: record.serial,
        })
    }

    /// The number of effects currently uploaded.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Gives the device back. Uploaded effects stay on the device.
    pub fn into_inner(self) -> D {
        self.device
    }

    fn record(&self, handle: EffectHandle) -> Option<&SlotRecord> {
        self.slots
            .get(&handle.slot)
            .filter(|r| r.serial == handle.serial)
    }

    fn live_state(&self, handle: EffectHandle) -> Result<SlotState> {
        self.record(handle)
            .map(|r| r.state)
            .ok_or(Error::InvalidSlotRequest { slot: handle.slot })
    }

    fn set_state(&mut self, handle: EffectHandle, state: SlotState) {
        if let Some(record) = self.slots.get_mut(&handle.slot) {
            record.state = state;
        }
    }

    fn send(&mut self, command: PlaybackCommand) -> Result<()> {
        let event = command.into_event();
        let expected = mem::size_of::<InputEvent>();
        let written = self
            .device
            .write_event(&event)
            .map_err(Error::WriteFailed)?;
        if written != expected {
            return Err(Error::WriteIncomplete { written, expected });
        }
        Ok(())
    }
}
