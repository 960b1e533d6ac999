use crate::hardware::keyboard::Keyboard;
use std::fmt::{Debug, Formatter};

/// Address the PC starts at.
pub const PROGRAM_SECTION_START: u16 = 0x3000;
/// Number of addressable `u16` words.
pub const MEMORY_SIZE: usize = 1 << 16;

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

/// The complete 64K words address space of the LC-3 including the memory-mapped keyboard.
pub struct Memory {
    /// Index equals memory address
    data: Box<[u16]>,
    keyboard: Keyboard,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(f, "Memory: {used} non-zero words of {MEMORY_SIZE}")
    }
}

impl Memory {
    const KEYBOARD_STATUS_REGISTER_SET: u16 = 1 << 15;
    const KEYBOARD_STATUS_REGISTER_UNSET: u16 = 0;

    #[must_use]
    pub fn new(keyboard: Keyboard) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE].into_boxed_slice(),
            keyboard,
        }
    }
    /// Reads the word at `address`.
    ///
    /// Reading the keyboard status register polls the keyboard first: if a character is pending
    /// it is latched into the keyboard data register and the status register's top bit is set,
    /// otherwise the status register is cleared.
    pub fn read(&mut self, address: u16) -> u16 {
        if MemoryMappedIOLocations::n(address) == Some(MemoryMappedIOLocations::Kbsr) {
            let status = if self.keyboard.poll_input_ready()
                && let Some(c) = self.keyboard.take_input()
            {
                self.data[usize::from(MemoryMappedIOLocations::Kbdr as u16)] = c;
                Self::KEYBOARD_STATUS_REGISTER_SET
            } else {
                Self::KEYBOARD_STATUS_REGISTER_UNSET
            };
            self.data[usize::from(address)] = status;
        }
        self.data[usize::from(address)]
    }
    pub fn write(&mut self, address: u16, value: u16) {
        self.data[usize::from(address)] = value;
    }
    /// Contiguous words from `offset` up to the top of the address space.
    pub fn slice_from_mut(&mut self, offset: u16) -> &mut [u16] {
        &mut self.data[usize::from(offset)..]
    }
    /// Replaces the input source, e.g. once the terminal is in raw mode.
    pub fn set_keyboard(&mut self, keyboard: Keyboard) {
        self.keyboard = keyboard;
    }
    pub const fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }
    #[must_use]
    pub const fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }
}
