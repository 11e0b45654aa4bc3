use nix::errno::Errno;
use std::io;
use thiserror::Error;

use crate::session::EffectHandle;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned while building, uploading, playing or removing effects.
///
/// Contract violations (`InvalidSlotRequest`, `InvalidParameter`, `NotPlaying`,
/// `AlreadyPlaying`) are detected before any syscall is made. The remaining variants carry the
/// error the kernel reported.
#[derive(Debug, Error)]
pub enum Error {
    #[error("slot {slot} was not allocated by this session or has been removed")]
    InvalidSlotRequest { slot: i16 },
    #[error("invalid effect parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("kernel rejected effect upload: {errno}")]
    UploadRejected { errno: Errno },
    #[error("short write of playback event: {written} of {expected} bytes")]
    WriteIncomplete { written: usize, expected: usize },
    #[error("writing playback event failed: {0}")]
    WriteFailed(#[source] io::Error),
    #[error("kernel refused to remove slot {slot}: {errno}")]
    RemovalFailed { slot: i16, errno: Errno },
    /// The new effect is uploaded and playing as `handle`, but the effect it replaces in `slot`
    /// is still on the device.
    #[error("new effect is playing but superseded slot {slot} could not be removed: {errno}")]
    SupersedeFailed {
        handle: EffectHandle,
        slot: i16,
        errno: Errno,
    },
    #[error("effect in slot {slot} is not playing")]
    NotPlaying { slot: i16 },
    #[error("effect in slot {slot} is already playing")]
    AlreadyPlaying { slot: i16 },
}

impl Error {
    /// Returns the numeric error code reported by the kernel, if this error came from a syscall.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Self::UploadRejected { errno }
            | Self::RemovalFailed { errno, .. }
            | Self::SupersedeFailed { errno, .. } => Some(*errno),
            Self::WriteFailed(err) => err.raw_os_error().map(Errno::from_raw),
            _ => None,
        }
    }

    /// `NotPlaying` only reports that nothing needed doing.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::NotPlaying { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_is_carried_through() {
        let err = Error::UploadRejected { errno: Errno::ENOSPC };
        assert_eq!(err.errno(), Some(Errno::ENOSPC));

        let err = Error::WriteFailed(io::Error::from_raw_os_error(libc::EBADF));
        assert_eq!(err.errno(), Some(Errno::EBADF));

        let err = Error::InvalidSlotRequest { slot: 3 };
        assert_eq!(err.errno(), None);
        assert!(!err.is_informational());
        assert!(Error::NotPlaying { slot: 0 }.is_informational());
    }
}
