//! Cabinet input and output ports, apart from the shift register.
//!
//! # Inputs
//!
//! | Port | Bit 0  | Bit 1    | Bit 2    | Bit 3  | Bit 4   | Bit 5   | Bit 6    | Bit 7  |
//! |------|--------|----------|----------|--------|---------|---------|----------|--------|
//! | 0    | DIP 4  | 1        | 1        | 1      | Fire    | Left    | Right    | -      |
//! | 1    | Coin   | 2P start | 1P start | 1      | 1P fire | 1P left | 1P right | -      |
//! | 2    | DIP 3  | DIP 5    | Tilt     | DIP 6  | 2P fire | 2P left | 2P right | DIP 7  |
//!
//! Controls are active high. Port 3 belongs to the shift register.
//!
//! # Outputs
//!
//! Ports 3 and 5 latch sound triggers, port 6 is the watchdog. Ports 2 and
//! 4 belong to the shift register.

use emu_core::Value;

/// A device that answers the port numbers the shift register does not.
pub trait PortDevice {
    /// IN from `port`.
    fn read(&mut self, port: u8) -> u8;

    /// OUT to `port`.
    fn write(&mut self, port: u8, value: u8);

    /// Press or release a cabinet control. Devices without controls ignore
    /// this.
    fn set_button(&mut self, _button: Button, _pressed: bool) {}

    /// Inspect device state; see [`emu_core::Observable::query`].
    fn query(&self, _path: &str) -> Option<Value> {
        None
    }
}

/// A cabinet control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Coin,
    P1Start,
    P2Start,
    P1Fire,
    P1Left,
    P1Right,
    P2Fire,
    P2Left,
    P2Right,
    Tilt,
}

impl Button {
    /// Input port and bit mask.
    #[must_use]
    pub const fn port_bit(self) -> (u8, u8) {
        match self {
            Self::Coin => (1, 0x01),
            Self::P2Start => (1, 0x02),
            Self::P1Start => (1, 0x04),
            Self::P1Fire => (1, 0x10),
            Self::P1Left => (1, 0x20),
            Self::P1Right => (1, 0x40),
            Self::Tilt => (2, 0x04),
            Self::P2Fire => (2, 0x10),
            Self::P2Left => (2, 0x20),
            Self::P2Right => (2, 0x40),
        }
    }
}

/// DIP switch bits on port 2.
const DIP_MASK: u8 = 0x8B;

/// Port 0 bits 1-3 and port 1 bit 3 are tied high.
const PORT0_FIXED: u8 = 0x0E;
const PORT1_FIXED: u8 = 0x08;

/// Player 1 fire/left/right, mirrored onto port 0.
const P1_CONTROLS: u8 = 0x70;

const SOUND1_PORT: u8 = 3;
const SOUND2_PORT: u8 = 5;
const WATCHDOG_PORT: u8 = 6;

/// The Midway board's controls, DIP switches, sound latches and watchdog.
#[derive(Debug, Clone, Default)]
pub struct CabinetPorts {
    /// Held controls for port 1.
    port1: u8,
    /// Held controls for port 2 (DIP bits excluded).
    port2: u8,
    dip_switches: u8,
    /// Last value written to port 3: UFO, shot, player death, invader
    /// death, extra life, amplifier enable.
    sound1: u8,
    /// Last value written to port 5: fleet steps 1-4, UFO hit.
    sound2: u8,
    watchdog_kicks: u64,
}

impl CabinetPorts {
    #[must_use]
    pub fn new(dip_switches: u8) -> Self {
        Self {
            dip_switches: dip_switches & DIP_MASK,
            ..Self::default()
        }
    }

    /// Last values latched on the two sound ports (3, 5).
    #[must_use]
    pub fn sound_latches(&self) -> (u8, u8) {
        (self.sound1, self.sound2)
    }

    /// Number of writes to the watchdog port.
    #[must_use]
    pub fn watchdog_kicks(&self) -> u64 {
        self.watchdog_kicks
    }

    pub fn release_all(&mut self) {
        self.port1 = 0;
        self.port2 = 0;
    }
}

impl PortDevice for CabinetPorts {
    fn read(&mut self, port: u8) -> u8 {
        match port {
            0 => PORT0_FIXED | (self.port1 & P1_CONTROLS),
            1 => PORT1_FIXED | self.port1,
            2 => self.dip_switches | self.port2,
            _ => 0x00,
        }
    }

    fn write(&mut self, port: u8, value: u8) {
        match port {
            SOUND1_PORT => {
                if value != self.sound1 {
                    log::trace!("sound port 3: {:#04X} -> {value:#04X}", self.sound1);
                }
                self.sound1 = value;
            }
            SOUND2_PORT => {
                if value != self.sound2 {
                    log::trace!("sound port 5: {:#04X} -> {value:#04X}", self.sound2);
                }
                self.sound2 = value;
            }
            WATCHDOG_PORT => self.watchdog_kicks += 1,
            _ => log::debug!("OUT to unmapped port {port}: {value:#04X}"),
        }
    }

    fn set_button(&mut self, button: Button, pressed: bool) {
        let (port, bit) = button.port_bit();
        let latch = if port == 1 { &mut self.port1 } else { &mut self.port2 };
        if pressed {
            *latch |= bit;
        } else {
            *latch &= !bit;
        }
    }

    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "sound1" => Some(self.sound1.into()),
            "sound2" => Some(self.sound2.into()),
            "watchdog" => Some(self.watchdog_kicks.into()),
            "dip" => Some(self.dip_switches.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_inputs_read_fixed_bits() {
        let mut ports = CabinetPorts::new(0);
        assert_eq!(ports.read(0), 0x0E);
        assert_eq!(ports.read(1), 0x08);
        assert_eq!(ports.read(2), 0x00);
        assert_eq!(ports.read(7), 0x00);
    }

    #[test]
    fn buttons_set_and_clear_their_bit() {
        let mut ports = CabinetPorts::new(0);
        ports.set_button(Button::Coin, true);
        ports.set_button(Button::P1Fire, true);
        ports.set_button(Button::P2Left, true);
        assert_eq!(ports.read(1), 0x08 | 0x01 | 0x10);
        assert_eq!(ports.read(0), 0x0E | 0x10);
        assert_eq!(ports.read(2), 0x20);

        ports.set_button(Button::Coin, false);
        assert_eq!(ports.read(1), 0x08 | 0x10);

        ports.release_all();
        assert_eq!(ports.read(1), 0x08);
        assert_eq!(ports.read(2), 0x00);
    }

    #[test]
    fn dip_switches_only_use_switch_bits() {
        let mut ports = CabinetPorts::new(0xFF);
        assert_eq!(ports.read(2), 0x8B);
        ports.set_button(Button::Tilt, true);
        assert_eq!(ports.read(2), 0x8F);
    }

    #[test]
    fn outputs_latch_sound_and_count_watchdog() {
        let mut ports = CabinetPorts::new(0);
        ports.write(3, 0x02);
        ports.write(5, 0x10);
        ports.write(6, 0x00);
        ports.write(6, 0x00);
        ports.write(9, 0xAA);
        assert_eq!(ports.sound_latches(), (0x02, 0x10));
        assert_eq!(ports.watchdog_kicks(), 2);
        assert_eq!(ports.query("watchdog"), Some(Value::U64(2)));
        assert_eq!(ports.query("sound1"), Some(Value::U8(0x02)));
    }
}
