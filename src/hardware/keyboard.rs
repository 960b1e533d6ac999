use crate::errors::ExecutionError;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, read};
use std::io::{BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

/// The input side of the LC-3 console.
///
/// Characters arrive through a channel, which allows a non-blocking readiness check for the
/// memory-mapped keyboard status register as well as blocking reads for the `GETC` and `IN` traps.
pub struct Keyboard {
    receiver: Receiver<u16>,
    pending: Option<u16>,
    interrupted: Arc<AtomicBool>,
}

impl Keyboard {
    #[must_use]
    pub const fn new(receiver: Receiver<u16>, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            receiver,
            pending: None,
            interrupted,
        }
    }
    /// Keyboard without any input source, every blocking read fails.
    #[must_use]
    pub fn disconnected() -> Self {
        let (_sender, receiver) = mpsc::channel();
        Self::new(receiver, Arc::new(AtomicBool::new(false)))
    }
    /// Keyboard fed by a background thread reading terminal key events.
    ///
    /// Expects the terminal to be in raw mode, see [`crate::terminal::set_terminal_raw`].
    /// CTRL-C sets the interrupted flag and ends the thread.
    #[must_use]
    pub fn from_terminal() -> Self {
        let (sender, receiver) = mpsc::channel();
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        thread::spawn(move || read_terminal_events(&sender, &flag));
        Self::new(receiver, interrupted)
    }
    /// Keyboard fed byte by byte from `reader` in a background thread, used when standard input
    /// is not a terminal. Input is closed at the end of `reader`.
    #[must_use]
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || read_bytes(reader, &sender));
        Self::new(receiver, Arc::new(AtomicBool::new(false)))
    }
    /// Checks without waiting whether a character is available.
    pub fn poll_input_ready(&mut self) -> bool {
        if self.pending.is_none() {
            self.pending = match self.receiver.try_recv() {
                Ok(c) => Some(c),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
            };
        }
        self.pending.is_some()
    }
    /// Takes the character found by [`Keyboard::poll_input_ready`], if any.
    pub const fn take_input(&mut self) -> Option<u16> {
        self.pending.take()
    }
    /// Waits until a character is available.
    ///
    /// # Errors
    /// - `Interrupted` if input ended because of CTRL-C
    /// - `IOInputOutputError` if the input source is gone
    pub fn read_blocking(&mut self) -> Result<u16, ExecutionError> {
        if let Some(c) = self.pending.take() {
            return Ok(c);
        }
        self.receiver.recv().map_err(|_| {
            if self.is_interrupted() {
                ExecutionError::Interrupted
            } else {
                ExecutionError::IOInputOutputError("Keyboard input closed".into())
            }
        })
    }
    /// True if CTRL-C was triggered
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }
}

fn read_terminal_events(sender: &Sender<u16>, interrupted: &AtomicBool) {
    loop {
        let event = match read() {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Stopped reading keyboard events: {e}");
                return;
            }
        };
        if let Event::Key(key) = event
            && key.kind == KeyEventKind::Press
        {
            if is_ctrl_c(&key) {
                interrupted.store(true, Ordering::Relaxed);
                return;
            }
            if let Some(c) = key_to_character(key.code)
                && sender.send(c).is_err()
            {
                // emulator is gone
                return;
            }
        }
    }
}

fn read_bytes(reader: impl Read, sender: &Sender<u16>) {
    for byte in BufReader::new(reader).bytes() {
        match byte {
            Ok(b) => {
                if sender.send(u16::from(b)).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::warn!("Stopped reading standard input: {e}");
                return;
            }
        }
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn key_to_character(code: KeyCode) -> Option<u16> {
    match code {
        KeyCode::Char(c) if c.is_ascii() => Some(c as u16),
        KeyCode::Enter => Some(u16::from(b'\n')),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Tab => Some(u16::from(b'\t')),
        KeyCode::Esc => Some(0x1B),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use std::io::Cursor;

    #[gtest]
    pub fn test_poll_without_input() {
        let (_sender, receiver) = mpsc::channel();
        let mut kbd = Keyboard::new(receiver, Arc::new(AtomicBool::new(false)));
        expect_that!(kbd.poll_input_ready(), eq(false));
        expect_that!(kbd.take_input(), none());
    }
    #[gtest]
    pub fn test_poll_keeps_character_until_taken() {
        let (sender, receiver) = mpsc::channel();
        let mut kbd = Keyboard::new(receiver, Arc::new(AtomicBool::new(false)));
        sender.send(u16::from(b'x')).unwrap();
        sender.send(u16::from(b'y')).unwrap();
        expect_that!(kbd.poll_input_ready(), eq(true));
        expect_that!(kbd.poll_input_ready(), eq(true));
        expect_that!(kbd.take_input(), some(eq(u16::from(b'x'))));
        expect_that!(kbd.read_blocking(), eq(&Ok(u16::from(b'y'))));
    }
    #[gtest]
    pub fn test_read_blocking_on_closed_input() {
        let mut kbd = Keyboard::disconnected();
        expect_that!(
            kbd.read_blocking(),
            eq(&Err(ExecutionError::IOInputOutputError(
                "Keyboard input closed".into()
            )))
        );
    }
    #[gtest]
    pub fn test_read_blocking_after_interrupt() {
        let (sender, receiver) = mpsc::channel::<u16>();
        let interrupted = Arc::new(AtomicBool::new(false));
        let mut kbd = Keyboard::new(receiver, Arc::clone(&interrupted));
        interrupted.store(true, Ordering::Relaxed);
        drop(sender);
        expect_that!(kbd.is_interrupted(), eq(true));
        expect_that!(kbd.read_blocking(), eq(&Err(ExecutionError::Interrupted)));
    }
    #[gtest]
    pub fn test_from_reader_delivers_bytes_then_closes() {
        let mut kbd = Keyboard::from_reader(Cursor::new(b"hi\n".to_vec()));
        expect_that!(kbd.read_blocking(), eq(&Ok(u16::from(b'h'))));
        expect_that!(kbd.read_blocking(), eq(&Ok(u16::from(b'i'))));
        expect_that!(kbd.read_blocking(), eq(&Ok(u16::from(b'\n'))));
        expect_that!(
            kbd.read_blocking(),
            eq(&Err(ExecutionError::IOInputOutputError(
                "Keyboard input closed".into()
            )))
        );
        expect_that!(kbd.is_interrupted(), eq(false));
    }
    #[gtest]
    pub fn test_key_to_character() {
        expect_that!(key_to_character(KeyCode::Char('a')), some(eq(97)));
        expect_that!(key_to_character(KeyCode::Enter), some(eq(10)));
        expect_that!(key_to_character(KeyCode::Char('ä')), none());
        expect_that!(key_to_character(KeyCode::F(1)), none());
    }
}
