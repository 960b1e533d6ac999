//! Machine state of the LC-3: memory, register file and the keyboard device.
pub mod keyboard;
pub mod memory;
pub mod registers;
