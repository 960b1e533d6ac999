//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` executes program images for the Little Computer 3, a 16-bit educational
//! instruction set with 64K words of memory, eight registers and trap routines for console IO.
//!
//!  # Example
//! ```
//! use lc3_vm::emulator;
//! // .ORIG x3000, ADD R0, R0, #7, HALT
//! let mut emu = emulator::from_program_bytes(&[0x30, 0x00, 0x10, 0x27, 0xF0, 0x25]).unwrap();
//! let mut output = Vec::new();
//! emu.execute_with(&mut output).unwrap();
//! assert_eq!(emu.registers().get(0).as_decimal(), 7);
//! assert_eq!(output, b"\nHALT\n");
//! ```
//! # Errors
//! - Loading: image file cannot be read or is missing the origin word
//! - Execution: invalid opcode or trap code, console IO failure, user interrupt

pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod numbers;
pub mod terminal;
