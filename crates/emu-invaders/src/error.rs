//! Cabinet errors.

use std::path::PathBuf;

use intel_8080::CpuError;
use thiserror::Error;

/// Errors from building or running a cabinet.
#[derive(Debug, Error)]
pub enum InvadersError {
    #[error("cannot read ROM {}: {source}", path.display())]
    RomRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ROM image is empty")]
    EmptyRom,

    /// The image does not fit between the load address and the top of
    /// the 64K address space.
    #[error("ROM image of {len} bytes does not fit at {load_address:#06X}")]
    RomTooLarge { len: usize, load_address: u16 },

    #[error("cannot run {frames_per_second} frames per second from a {clock_hz} Hz clock")]
    BadTiming {
        clock_hz: u64,
        frames_per_second: u64,
    },

    #[error(transparent)]
    Cpu(#[from] CpuError),
}
