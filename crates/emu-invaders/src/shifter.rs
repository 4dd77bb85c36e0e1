//! The cabinet's 16-bit shift register.
//!
//! The 8080 has no barrel shifter, so the board adds one for sprite
//! placement. Writes to port 4 feed bytes in from the top, port 2 sets how
//! far to shift, and port 3 reads back eight bits of the 16-bit window.
//!
//! | Port  | Dir | Effect                                      |
//! |-------|-----|---------------------------------------------|
//! | 2     | OUT | `offset = data & 7`                         |
//! | 4     | OUT | `value = (data << 8) \| (value >> 8)`       |
//! | 3     | IN  | `(value >> (8 - offset)) & 0xFF`            |

/// Shift register state. Starts zeroed and is never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shifter {
    value: u16,
    offset: u8,
}

impl Shifter {
    pub const OFFSET_PORT: u8 = 2;
    pub const RESULT_PORT: u8 = 3;
    pub const DATA_PORT: u8 = 4;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// OUT 2.
    pub fn set_offset(&mut self, data: u8) {
        self.offset = data & 0x07;
    }

    /// OUT 4: the previous high byte moves down and `data` becomes the new
    /// high byte.
    pub fn push(&mut self, data: u8) {
        self.value = (u16::from(data) << 8) | (self.value >> 8);
    }

    /// IN 3.
    #[must_use]
    pub fn result(&self) -> u8 {
        (self.value >> (8 - self.offset)) as u8
    }

    #[must_use]
    pub fn value(&self) -> u16 {
        self.value
    }

    #[must_use]
    pub fn offset(&self) -> u8 {
        self.offset
    }
}
