//! Cabinet configuration.

use intel_8080::UndefinedPolicy;

use crate::error::InvadersError;

/// CPU clock of the Midway 8080 board.
pub const DEFAULT_CLOCK_HZ: u64 = 2_000_000;

/// Video refresh rate.
pub const DEFAULT_FRAMES_PER_SECOND: u64 = 60;

/// When the video hardware interrupts the CPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterruptCadence {
    /// RST 1 at mid-frame and RST 2 at the end of the frame, as the
    /// cabinet does.
    #[default]
    HalfAndFullFrame,
    /// RST 2 once per frame only.
    FullFrameOnly,
}

/// Configuration for creating an [`Invaders`](crate::Invaders) instance.
#[derive(Debug, Clone)]
pub struct InvadersConfig {
    /// Program image, copied into memory at `load_address`.
    pub rom: Vec<u8>,
    pub load_address: u16,
    pub clock_hz: u64,
    pub frames_per_second: u64,
    pub cadence: InterruptCadence,
    pub undefined_policy: UndefinedPolicy,
    /// DIP switch bank read back on input port 2.
    ///
    /// Only bits 0, 1, 3 and 7 are switches. Bits 0-1 select 3-6 ships,
    /// bit 3 moves the extra ship from 1500 to 1000 points, bit 7 hides the
    /// coin info on the demo screen.
    pub dip_switches: u8,
}

impl InvadersConfig {
    /// Configuration for a cabinet ROM image with every other setting at
    /// its hardware default.
    #[must_use]
    pub fn with_rom(rom: Vec<u8>) -> Self {
        Self {
            rom,
            ..Self::default()
        }
    }

    /// Check the configuration can build a machine.
    pub fn validate(&self) -> Result<(), InvadersError> {
        if self.rom.is_empty() {
            return Err(InvadersError::EmptyRom);
        }
        if usize::from(self.load_address) + self.rom.len() > 0x1_0000 {
            return Err(InvadersError::RomTooLarge {
                len: self.rom.len(),
                load_address: self.load_address,
            });
        }
        if self.frames_per_second == 0 || self.frames_per_second >= self.clock_hz {
            return Err(InvadersError::BadTiming {
                clock_hz: self.clock_hz,
                frames_per_second: self.frames_per_second,
            });
        }
        Ok(())
    }
}

impl Default for InvadersConfig {
    fn default() -> Self {
        Self {
            rom: Vec::new(),
            load_address: 0x0000,
            clock_hz: DEFAULT_CLOCK_HZ,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            cadence: InterruptCadence::default(),
            undefined_policy: UndefinedPolicy::Fault,
            dip_switches: 0x00,
        }
    }
}
