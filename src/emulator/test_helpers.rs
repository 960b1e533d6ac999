use crate::emulator::Emulator;
use crate::hardware::keyboard::Keyboard;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::sync::mpsc::Sender;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Emulator with a program loaded at `0x3000`, keyboard input from memory and captured output.
pub struct FakeEmulator {
    pub inner: Emulator,
    sender: Option<Sender<u16>>,
    /// Shared with the keyboard, setting it simulates CTRL-C
    pub interrupted: Arc<AtomicBool>,
    pub stdout: StringWriter,
}
impl FakeEmulator {
    pub fn new(program_no_header: &[u16]) -> Self {
        let mut image = Vec::with_capacity(2 * (program_no_header.len() + 1));
        image.extend_from_slice(&0x3000u16.to_be_bytes());
        for word in program_no_header {
            image.extend_from_slice(&word.to_be_bytes());
        }
        let (sender, receiver) = mpsc::channel();
        let interrupted = Arc::new(AtomicBool::new(false));
        let keyboard = Keyboard::new(receiver, Arc::clone(&interrupted));
        let mut emu = Emulator::new(keyboard);
        emu.load_image(&image).unwrap();
        Self {
            inner: emu,
            sender: Some(sender),
            interrupted,
            stdout: StringWriter::new(),
        }
    }
    /// Queues keyboard input, the input ends with the call to [`FakeEmulator::get_parts`].
    pub fn add_stdin_input(&mut self, input: &[u8]) -> &mut Self {
        if let Some(sender) = &self.sender {
            for b in input {
                sender.send(u16::from(*b)).unwrap();
            }
        }
        self
    }
    /// Closes keyboard input, already queued characters can still be read.
    pub fn close_stdin(&mut self) {
        self.sender = None;
    }
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        self.close_stdin();
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.stdout,
        )
    }
}
