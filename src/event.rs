use std::fmt;
use std::time::Duration;

use nix::time::{clock_gettime, ClockId};

use crate::compat::input_event;
use crate::constants::EventType;

/// A single `struct input_event` record, as read from or written to an evdev device.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct InputEvent(pub(crate) input_event);

impl InputEvent {
    pub(crate) fn new_at(time: libc::timeval, type_: EventType, code: u16, value: i32) -> Self {
        InputEvent(input_event {
            time,
            type_: type_.0,
            code,
            value,
        })
    }

    /// Returns the timestamp carried by the event.
    ///
    /// For playback commands this is time on the monotonic clock, not the wall clock.
    pub fn timestamp(&self) -> Duration {
        let tv = &self.0.time;
        Duration::new(tv.tv_sec.max(0) as u64, (tv.tv_usec.max(0) as u32) * 1000)
    }

    #[inline]
    pub fn event_type(&self) -> EventType {
        EventType(self.0.type_)
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.0.code
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.0.value
    }

    /// The raw record, exactly as it is written to the device.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { crate::cast_to_bytes(&self.0) }
    }
}

impl fmt::Debug for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("InputEvent")
            .field("time", &self.timestamp())
            .field("type", &self.event_type())
            .field("code", &self.code())
            .field("value", &self.value())
            .finish()
    }
}

/// Whether a playback command starts or stops an effect.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PlaybackAction {
    Start,
    Stop,
}

impl PlaybackAction {
    fn value(self) -> i32 {
        match self {
            Self::Start => 1,
            Self::Stop => 0,
        }
    }
}

/// A start or stop request for one effect slot.
///
/// Built right before it is written to the device; the timestamp is taken when the command is
/// created.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackCommand {
    slot: i16,
    action: PlaybackAction,
    timestamp: libc::timeval,
}

impl PlaybackCommand {
    pub fn new(slot: i16, action: PlaybackAction) -> Self {
        Self {
            slot,
            action,
            timestamp: monotonic_now(),
        }
    }

    pub fn start(slot: i16) -> Self {
        Self::new(slot, PlaybackAction::Start)
    }

    pub fn stop(slot: i16) -> Self {
        Self::new(slot, PlaybackAction::Stop)
    }

    pub fn slot(&self) -> i16 {
        self.slot
    }

    pub fn action(&self) -> PlaybackAction {
        self.action
    }

    pub fn into_event(self) -> InputEvent {
        InputEvent::new_at(
            self.timestamp,
            EventType::FORCEFEEDBACK,
            self.slot as u16,
            self.action.value(),
        )
    }
}

fn zero_timeval() -> libc::timeval {
    libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    }
}

fn monotonic_now() -> libc::timeval {
    match clock_gettime(ClockId::CLOCK_MONOTONIC) {
        Ok(ts) => libc::timeval {
            tv_sec: ts.tv_sec() as libc::time_t,
            tv_usec: (ts.tv_nsec() / 1000) as libc::suseconds_t,
        },
        // The kernel ignores the timestamp of events written to it.
        Err(_) => zero_timeval(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_stop_records() {
        let start = PlaybackCommand::start(3).into_event();
        assert_eq!(start.event_type(), EventType::FORCEFEEDBACK);
        assert_eq!(start.code(), 3);
        assert_eq!(start.value(), 1);

        let stop = PlaybackCommand::stop(3).into_event();
        assert_eq!(stop.code(), 3);
        assert_eq!(stop.value(), 0);
    }

    #[test]
    fn record_is_written_whole() {
        let ev = PlaybackCommand::start(0).into_event();
        assert_eq!(ev.as_bytes().len(), std::mem::size_of::<input_event>());
    }

    #[test]
    fn timestamps_are_monotonic() {
        let first = PlaybackCommand::start(0).into_event().timestamp();
        let second = PlaybackCommand::stop(0).into_event().timestamp();
        assert!(second >= first);
        assert!(first > Duration::ZERO);
    }
}
