//! Trap routines for console IO and halting, dispatched by the TRAP instruction.
//!
//! Every routine returns [`ControlFlow::Continue`] to go on with the next instruction,
//! `Break(Ok(()))` ends the program regularly and `Break(Err(_))` with a fatal error.
use crate::errors::ExecutionError;
use crate::hardware::keyboard::Keyboard;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use std::io::Write;
use std::ops::ControlFlow;

pub type TrapResult = ControlFlow<Result<(), ExecutionError>>;

const IN_PROMPT: &[u8] = b"Enter a character: ";
const HALT_MESSAGE: &[u8] = b"\nHALT\n";

fn read_character_into_r0(regs: &mut Registers, keyboard: &mut Keyboard) -> TrapResult {
    match keyboard.read_blocking() {
        Ok(c) => {
            regs.set(0, from_binary(c & 0xFF));
            ControlFlow::Continue(())
        }
        Err(e) => ControlFlow::Break(Err(e)),
    }
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(regs: &mut Registers, keyboard: &mut Keyboard) -> TrapResult {
    read_character_into_r0(regs, keyboard)
}

/// IN: Print a prompt on the screen and read a single character echoed back from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    keyboard: &mut Keyboard,
    stdout: &mut impl Write,
) -> TrapResult {
    write_out(IN_PROMPT, stdout)?;
    read_character_into_r0(regs, keyboard)?;
    write_out(&[low_byte(regs.get(0).as_binary())], stdout)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> TrapResult {
    write_out(&[low_byte(regs.get(0).as_binary())], stdout)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Truncation is what is expected here"
)]
const fn low_byte(word: u16) -> u8 {
    word as u8
}

fn put_one_char_per_u16(input: u16, append_to: &mut Vec<u8>) {
    append_to.push(low_byte(input));
}

fn put_two_chars_per_u16(input: u16, append_to: &mut Vec<u8>) {
    append_to.push(low_byte(input));
    let high = low_byte(input >> 8);
    if high != 0 {
        append_to.push(high);
    }
}

fn put(
    regs: &Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
    handle_char: fn(u16, &mut Vec<u8>),
) -> TrapResult {
    let mut address = regs.get(0).as_binary();
    let mut s = Vec::with_capacity(120);
    loop {
        let word = mem.read(address);
        if word == 0 {
            break;
        }
        handle_char(word, &mut s);
        address = address.wrapping_add(1);
    }
    write_out(&s, stdout)
}

/// PUTS: print null-delimited char* from register 0's address
pub fn put_s(regs: &Registers, mem: &mut Memory, stdout: &mut impl Write) -> TrapResult {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// The second character of the last memory location can be 0x00.
/// Writing terminates with a 0x000 char.
pub fn put_sp(regs: &Registers, mem: &mut Memory, stdout: &mut impl Write) -> TrapResult {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: End program and stdout a message
pub fn halt(stdout: &mut impl Write) -> TrapResult {
    write_out(HALT_MESSAGE, stdout)?;
    ControlFlow::Break(Ok(()))
}

fn write_out(message: &[u8], stdout: &mut impl Write) -> TrapResult {
    match stdout.write_all(message).and_then(|()| stdout.flush()) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => ControlFlow::Break(Err(e.into())),
    }
}
