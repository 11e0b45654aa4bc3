use std::fmt;
use std::time::Duration;

use crate::compat::{ff_constant_effect, ff_envelope, ff_replay, ff_trigger};
use crate::constants::FFEffectType;
use crate::error::{Error, Result};
use crate::sys;

/// Where an uploaded effect should live on the device.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlotPolicy {
    /// Let the kernel pick a free slot.
    RequestNew,
    /// Overwrite the effect already stored in this slot.
    ReuseSlot(i16),
}

impl SlotPolicy {
    /// The value of the record's `id` field; `-1` asks the kernel to assign one.
    fn wire_id(self) -> i16 {
        match self {
            Self::RequestNew => -1,
            Self::ReuseSlot(id) => id,
        }
    }

    fn validate(self) -> Result<Self> {
        match self {
            Self::ReuseSlot(slot) if slot < 0 => Err(Error::InvalidSlotRequest { slot }),
            policy => Ok(policy),
        }
    }
}

/// Describes a generic force feedback effect envelope.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    /// How long the attack should last in milliseconds.
    pub attack_length: u16,
    /// The level of the attack at the beginning of the attack.
    pub attack_level: u16,
    /// How long the fade should last in milliseconds.
    pub fade_length: u16,
    /// The level of the fade at the end of the fade.
    pub fade_level: u16,
}

impl From<ff_envelope> for Envelope {
    fn from(value: ff_envelope) -> Self {
        Self {
            attack_length: value.attack_length,
            attack_level: value.attack_level,
            fade_length: value.fade_length,
            fade_level: value.fade_level,
        }
    }
}

impl From<Envelope> for ff_envelope {
    fn from(value: Envelope) -> Self {
        ff_envelope {
            attack_length: value.attack_length,
            attack_level: value.attack_level,
            fade_length: value.fade_length,
            fade_level: value.fade_level,
        }
    }
}

/// Trigger information for the force feedback effect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    /// The button that triggers the effect; 0 for none.
    pub button: u16,
    /// How long to wait before the effect can be triggered again in milliseconds.
    pub interval: u16,
}

impl From<ff_trigger> for Trigger {
    fn from(value: ff_trigger) -> Self {
        Self {
            button: value.button,
            interval: value.interval,
        }
    }
}

impl From<Trigger> for ff_trigger {
    fn from(value: Trigger) -> Self {
        ff_trigger {
            button: value.button,
            interval: value.interval,
        }
    }
}

/// Scheduling information for the force feedback effect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Replay {
    /// How long the effect plays in milliseconds; 0 plays until stopped.
    pub length: u16,
    /// How long to wait before the effect starts in milliseconds.
    pub delay: u16,
}

impl From<ff_replay> for Replay {
    fn from(value: ff_replay) -> Self {
        Self {
            length: value.length,
            delay: value.delay,
        }
    }
}

impl From<Replay> for ff_replay {
    fn from(value: Replay) -> Self {
        ff_replay {
            length: value.length,
            delay: value.delay,
        }
    }
}

/// The type of effect and its kind-specific parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// A constant force, applied for the whole replay length.
    Constant {
        /// The strength of the effect.
        level: i16,
        /// Envelope data.
        envelope: Envelope,
    },
}

impl From<EffectKind> for FFEffectType {
    fn from(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Constant { .. } => FFEffectType::FF_CONSTANT,
        }
    }
}

/// A complete, validated effect definition.
///
/// Descriptors are only produced by [`EffectBuilder::build`] and the `with_*` methods, which
/// check the slot policy, so a descriptor always converts into a record the kernel can accept.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EffectDescriptor {
    slot: SlotPolicy,
    direction: u16,
    trigger: Trigger,
    replay: Replay,
    kind: EffectKind,
}

impl EffectDescriptor {
    /// Starts building a constant-force effect with the given level.
    pub fn constant(level: i16) -> EffectBuilder {
        EffectBuilder::new(level)
    }

    pub fn slot(&self) -> SlotPolicy {
        self.slot
    }

    pub fn direction(&self) -> u16 {
        self.direction
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn replay(&self) -> Replay {
        self.replay
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// The constant-force level of this effect.
    pub fn level(&self) -> i16 {
        match self.kind {
            EffectKind::Constant { level, .. } => level,
        }
    }

    /// Returns a copy targeting a different slot.
    pub fn with_slot(self, slot: SlotPolicy) -> Result<Self> {
        Ok(Self {
            slot: slot.validate()?,
            ..self
        })
    }

    /// Returns a copy with a different constant-force level.
    pub fn with_level(self, level: i16) -> Self {
        let kind = match self.kind {
            EffectKind::Constant { envelope, .. } => EffectKind::Constant { level, envelope },
        };
        Self { kind, ..self }
    }

    /// Returns a copy with a different direction.
    pub fn with_direction(self, direction: u16) -> Self {
        Self { direction, ..self }
    }
}

/// Builds an [`EffectDescriptor`], filling every field the caller leaves alone with the value
/// the kernel treats as "none".
#[derive(Clone, Copy, Debug)]
pub struct EffectBuilder {
    slot: SlotPolicy,
    direction: u16,
    trigger: Trigger,
    length: Duration,
    delay: Duration,
    level: i16,
    envelope: Envelope,
}

impl EffectBuilder {
    pub fn new(level: i16) -> Self {
        Self {
            slot: SlotPolicy::RequestNew,
            direction: 0,
            trigger: Trigger::default(),
            length: Duration::ZERO,
            delay: Duration::ZERO,
            level,
            envelope: Envelope::default(),
        }
    }

    pub fn slot(mut self, slot: SlotPolicy) -> Self {
        self.slot = slot;
        self
    }

    /// Sets the direction of the effect as an angle, where 0 is omni-directional.
    pub fn direction(mut self, direction: u16) -> Self {
        self.direction = direction;
        self
    }

    pub fn trigger(mut self, button: u16, interval: u16) -> Self {
        self.trigger = Trigger { button, interval };
        self
    }

    /// Bounds the effect to `length_ms` milliseconds. Zero plays until stopped.
    pub fn length(self, length_ms: u16) -> Self {
        self.duration(Duration::from_millis(length_ms.into()))
    }

    /// Bounds the effect to `length`, which must fit in 65535 milliseconds.
    pub fn duration(mut self, length: Duration) -> Self {
        self.length = length;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn build(self) -> Result<EffectDescriptor> {
        let slot = self.slot.validate()?;
        let replay = Replay {
            length: millis(self.length)
                .ok_or(Error::InvalidParameter("replay length exceeds 65535 ms"))?,
            delay: millis(self.delay)
                .ok_or(Error::InvalidParameter("replay delay exceeds 65535 ms"))?,
        };

        Ok(EffectDescriptor {
            slot,
            direction: self.direction,
            trigger: self.trigger,
            replay,
            kind: EffectKind::Constant {
                level: self.level,
                envelope: self.envelope,
            },
        })
    }
}

fn millis(d: Duration) -> Option<u16> {
    u16::try_from(d.as_millis()).ok()
}

/// The kernel's `struct ff_effect`, ready to be passed to the upload ioctl.
///
/// Records are only created from an [`EffectDescriptor`], starting from an all-zero record, so
/// the parameter union never carries stale bytes from another effect kind.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct EffectRecord(pub(crate) sys::ff_effect);

impl EffectRecord {
    /// The effect id. `-1` before upload with [`SlotPolicy::RequestNew`]; after a successful
    /// upload, the slot the kernel assigned.
    pub fn id(&self) -> i16 {
        self.0.id
    }

    /// Stores the assigned slot, as the kernel does on upload. Useful for device fakes.
    pub fn set_id(&mut self, id: i16) {
        self.0.id = id;
    }

    pub fn effect_type(&self) -> FFEffectType {
        FFEffectType(self.0.type_)
    }

    pub fn direction(&self) -> u16 {
        self.0.direction
    }

    pub fn trigger(&self) -> Trigger {
        self.0.trigger.into()
    }

    pub fn replay(&self) -> Replay {
        self.0.replay.into()
    }

    /// Returns the constant-force parameters, or `None` for any other effect type.
    pub fn constant(&self) -> Option<(i16, Envelope)> {
        if self.effect_type() != FFEffectType::FF_CONSTANT {
            return None;
        }
        // SAFETY: the type field says the constant member is the populated one.
        let constant = unsafe { self.0.u.constant };
        Some((constant.level, constant.envelope.into()))
    }

    /// The raw bytes of the kind-specific parameter union.
    pub fn parameter_bytes(&self) -> &[u8] {
        // SAFETY: every byte of the union is covered by an integer or pointer member, and
        // records are zero-initialized before any member is written.
        unsafe { crate::cast_to_bytes(&self.0.u) }
    }
}

impl From<&EffectDescriptor> for EffectRecord {
    fn from(descriptor: &EffectDescriptor) -> Self {
        let mut effect = sys::ff_effect::zeroed();

        let type_: FFEffectType = descriptor.kind.into();
        effect.type_ = type_.0;
        effect.id = descriptor.slot.wire_id();
        effect.direction = descriptor.direction;
        effect.trigger = descriptor.trigger.into();
        effect.replay = descriptor.replay.into();

        match descriptor.kind {
            EffectKind::Constant { level, envelope } => {
                effect.u.constant = ff_constant_effect {
                    level,
                    envelope: envelope.into(),
                };
            }
        }

        EffectRecord(effect)
    }
}

impl fmt::Debug for EffectRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut debug = f.debug_struct("EffectRecord");
        debug
            .field("type", &self.effect_type())
            .field("id", &self.id())
            .field("direction", &self.direction())
            .field("trigger", &self.trigger())
            .field("replay", &self.replay());
        if let Some((level, envelope)) = self.constant() {
            debug.field("level", &level).field("envelope", &envelope);
        }
        debug.finish()
    }
}
