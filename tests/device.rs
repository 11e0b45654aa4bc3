#![cfg(feature = "device-test")]

//! Runs against a real force feedback device named by `EVDEV_FF_TEST_DEVICE`
//! (e.g. `/dev/input/event5`). The device will move.

mod common;

use common::init_logging;
use evdev_ff::{EffectDescriptor, EffectSession, SlotState};
use std::fs::OpenOptions;
use std::thread;
use std::time::Duration;

fn open_test_device() -> std::io::Result<std::fs::File> {
    let path = std::env::var("EVDEV_FF_TEST_DEVICE")
        .map_err(|_| std::io::Error::other("EVDEV_FF_TEST_DEVICE is not set"))?;
    OpenOptions::new().read(true).write(true).open(path)
}

#[test]
pub fn test_constant_effect_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let mut session = EffectSession::new(open_test_device()?);

    let left = EffectDescriptor::constant(-0x4000).direction(0x4000).build()?;
    let handle = session.upload(left)?;
    assert!(handle.slot() >= 0);

    session.play(handle)?;
    thread::sleep(Duration::from_millis(200));

    let right = session.descriptor(handle).unwrap().with_level(0x4000);
    session.upload(right)?;
    thread::sleep(Duration::from_millis(200));

    session.stop(handle)?;
    session.remove(handle)?;
    assert_eq!(session.state(handle), SlotState::Removed);

    Ok(())
}

#[test]
pub fn test_two_effects_get_distinct_slots() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = EffectSession::new(open_test_device()?);

    let first = session.upload(EffectDescriptor::constant(0x1000).build()?)?;
    let second = session.upload_and_play_once(
        EffectDescriptor::constant(0x2000).length(100).build()?,
        Some(first),
    )?;

    assert_ne!(first.slot(), second.slot());
    assert_eq!(session.state(first), SlotState::Removed);

    session.remove_all()?;
    Ok(())
}

#[test]
pub fn test_changing_constant_level() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = EffectSession::new(open_test_device()?);

    let handle = session.set_constant_level(0x2000)?;
    thread::sleep(Duration::from_millis(200));
    assert_eq!(session.set_constant_level(-0x2000)?, handle);
    thread::sleep(Duration::from_millis(200));

    assert_eq!(session.state(handle), SlotState::Playing);
    session.remove(handle)?;
    Ok(())
}
