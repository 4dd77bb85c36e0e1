//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// The CPU reaches memory and port-mapped peripherals through this trait.
/// Addresses are 16 bits wide, so every computed address already wraps
/// modulo 65536 before it gets here. Port numbers are 8 bits (the 8080
/// puts the port on both halves of the address bus).
pub trait Bus {
    /// Read a byte from memory.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to memory.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from an input port (`IN`).
    fn io_read(&mut self, port: u8) -> u8;

    /// Write a byte to an output port (`OUT`).
    fn io_write(&mut self, port: u8, value: u8);
}

/// Flat 64 KiB RAM with latched input ports.
///
/// Used by tests and by CP/M-style harnesses that have no peripherals.
/// Input ports read back whatever was set with [`SimpleBus::set_input`]
/// (0xFF, a floating bus, until then). Output writes are recorded in order.
pub struct SimpleBus {
    ram: Box<[u8; 0x1_0000]>,
    inputs: [u8; 256],
    outputs: Vec<(u8, u8)>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x1_0000]),
            inputs: [0xFF; 256],
            outputs: Vec::new(),
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at the top of
    /// the address space.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read RAM without going through the CPU.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    /// Set the value an `IN` from `port` will return.
    pub fn set_input(&mut self, port: u8, value: u8) {
        self.inputs[usize::from(port)] = value;
    }

    /// Every `(port, value)` written by `OUT`, oldest first.
    #[must_use]
    pub fn outputs(&self) -> &[(u8, u8)] {
        &self.outputs
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    fn io_read(&mut self, port: u8) -> u8 {
        self.inputs[usize::from(port)]
    }

    fn io_write(&mut self, port: u8, value: u8) {
        self.outputs.push((port, value));
    }
}
