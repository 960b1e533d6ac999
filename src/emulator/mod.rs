//! The fetch-decode-execute engine of the LC-3.
pub mod instruction;
pub mod loader;
pub mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

use crate::emulator::instruction::{Instruction, Operation, TrapCode};
use crate::emulator::loader::LoadedImage;
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::Keyboard;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Path;

/// Running an LC-3 program ends only via the HALT trap or a fatal error, both leave the
/// machine `Halted` until [`Emulator::reset_registers`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Halted,
}

/// The public facing emulator used to run LC-3 programs.
#[derive(Debug)]
pub struct Emulator {
    memory: Memory,
    registers: Registers,
    state: MachineState,
}

/// Creates an emulator reading the terminal keyboard and loads the program image at `path`.
///
/// Key events are only delivered one by one while the caller holds the lock of
/// [`crate::terminal::set_terminal_raw`] during execution.
///
/// # Errors
/// See [`Emulator::load_program_file`]
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new(Keyboard::from_terminal());
    emu.load_program_file(path)?;
    Ok(emu)
}

/// Creates an emulator without keyboard input and loads `image`.
///
/// # Errors
/// See [`Emulator::load_image`]
pub fn from_program_bytes(image: &[u8]) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new(Keyboard::disconnected());
    emu.load_image(image)?;
    Ok(emu)
}

impl Emulator {
    /// Creates a machine with cleared memory, PC at `0x3000` and reading input from `keyboard`.
    #[must_use]
    pub fn new(keyboard: Keyboard) -> Self {
        Self {
            memory: Memory::new(keyboard),
            registers: Registers::new(),
            state: MachineState::Running,
        }
    }
    /// Places an image into memory at its origin, see [`loader::load_image`].
    /// Several images can be loaded, later ones overwrite earlier ones where they overlap.
    ///
    /// # Errors
    /// - Image is missing the origin word
    pub fn load_image(&mut self, image: &[u8]) -> Result<LoadedImage, LoadProgramError> {
        loader::load_image(&mut self.memory, image)
    }
    /// Reads the image file at `path` and loads it, see [`Emulator::load_image`].
    ///
    /// # Errors
    /// - File cannot be read
    /// - Image is missing the origin word
    pub fn load_program_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<LoadedImage, LoadProgramError> {
        let image = loader::read_image_file(path.as_ref())?;
        self.load_image(&image)
    }
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
    #[must_use]
    pub const fn state(&self) -> MachineState {
        self.state
    }
    /// Start over from `0x3000` with cleared registers, memory is kept.
    pub const fn reset_registers(&mut self) {
        self.registers = Registers::new();
        self.state = MachineState::Running;
    }

    /// Runs the program writing its output to stdout.
    ///
    /// # Errors
    /// See [`Emulator::execute_with`]
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        self.execute_with(&mut io::stdout())
    }
    /// Runs the program until it halts.
    ///
    /// # Errors
    /// - Invalid opcode or trap code
    /// - Reading input or writing output failed
    /// - Interrupted by the user
    pub fn execute_with(&mut self, stdout: &mut impl Write) -> Result<(), ExecutionError> {
        while self.state == MachineState::Running {
            self.step(stdout)?;
        }
        Ok(())
    }
    /// Fetches, decodes and executes exactly one instruction.
    ///
    /// The PC is incremented before execution, so PC relative addresses are based on the
    /// address following the instruction. A halted machine executes nothing, every error halts it.
    ///
    /// # Errors
    /// See [`Emulator::execute_with`]
    pub fn step(&mut self, stdout: &mut impl Write) -> Result<MachineState, ExecutionError> {
        if self.state == MachineState::Halted {
            return Ok(self.state);
        }
        let result = self.execute_next(stdout);
        if let Err(e) = &result {
            log::debug!("Halting after fatal error: {e}");
            self.state = MachineState::Halted;
        }
        result
    }

    fn execute_next(&mut self, stdout: &mut impl Write) -> Result<MachineState, ExecutionError> {
        if self.memory.keyboard().is_interrupted() {
            return Err(ExecutionError::Interrupted);
        }
        let address = self.registers.increment_pc();
        let i = Instruction::from(self.memory.read(address));
        log::trace!("{address:#06X}: {i:?}");
        let invalid_opcode = || ExecutionError::InvalidOpcode {
            opcode: i.op_code(),
            address,
        };
        let r = &mut self.registers;
        let memory = &mut self.memory;
        match i.operation().ok_or_else(invalid_opcode)? {
            Operation::Br => opcodes::br(i, r),
            Operation::Add => opcodes::add(i, r),
            Operation::Ld => opcodes::ld(i, r, memory),
            Operation::St => opcodes::st(i, r, memory),
            Operation::Jsr => opcodes::jsr(i, r),
            Operation::And => opcodes::and(i, r),
            Operation::Ldr => opcodes::ldr(i, r, memory),
            Operation::Str => opcodes::str(i, r, memory),
            Operation::Not => opcodes::not(i, r),
            Operation::Ldi => opcodes::ldi(i, r, memory),
            Operation::Sti => opcodes::sti(i, r, memory),
            Operation::Jmp => opcodes::jmp_or_ret(i, r),
            Operation::Lea => opcodes::lea(i, r),
            Operation::Trap => self.trap(i, address, stdout)?,
            Operation::Rti | Operation::Res => return Err(invalid_opcode()),
        }
        Ok(self.state)
    }

    fn trap(
        &mut self,
        i: Instruction,
        address: u16,
        stdout: &mut impl Write,
    ) -> Result<(), ExecutionError> {
        let trap_code =
            TrapCode::n(i.trap_vector()).ok_or(ExecutionError::InvalidTrapCode {
                trap_code: i.trap_vector(),
                address,
            })?;
        let r = &mut self.registers;
        let flow = match trap_code {
            TrapCode::GetC => trap_routines::get_c(r, self.memory.keyboard_mut()),
            TrapCode::Out => trap_routines::out(r, stdout),
            TrapCode::PutS => trap_routines::put_s(r, &mut self.memory, stdout),
            TrapCode::In => trap_routines::in_trap(r, self.memory.keyboard_mut(), stdout),
            TrapCode::PutSp => trap_routines::put_sp(r, &mut self.memory, stdout),
            TrapCode::Halt => trap_routines::halt(stdout),
        };
        match flow {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(Ok(())) => {
                log::info!("Program halted at {address:#06X}");
                self.state = MachineState::Halted;
                Ok(())
            }
            ControlFlow::Break(Err(e)) => Err(e),
        }
    }
}
