use clap::Parser;
use lc3_vm::emulator::Emulator;
use lc3_vm::errors::ExecutionError;
use lc3_vm::hardware::keyboard::Keyboard;
use lc3_vm::terminal;
use lc3_vm::terminal::{RawLock, RawModeWriter};
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status after CTRL-C, the `-2` of a signal style termination.
const INTERRUPTED_EXIT_CODE: u8 = 254;

#[derive(Parser, Debug)]
#[command(name = "lc3-vm", version)]
#[command(about = "Run LC-3 program images", long_about = None)]
struct Args {
    /// Program images, loaded in the given order
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    // missing images exit with status 2 via clap's usage error
    let args = Args::parse();

    let mut emu = Emulator::new(Keyboard::disconnected());
    for path in &args.images {
        if let Err(e) = emu.load_program_file(path) {
            eprintln!("Failed to load image: {e}");
            return ExitCode::FAILURE;
        }
    }
    // single keystrokes from a terminal, plain bytes from redirected input
    let interactive = io::stdin().is_terminal();
    let result = {
        let lock = interactive.then(terminal::set_terminal_raw);
        let raw = lock.as_ref().is_some_and(RawLock::is_enabled);
        emu.memory_mut().set_keyboard(if interactive {
            Keyboard::from_terminal()
        } else {
            Keyboard::from_reader(io::stdin())
        });
        emu.execute_with(&mut RawModeWriter::new(io::stdout(), raw))
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(ExecutionError::Interrupted) => {
            eprintln!("Interrupted");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
        Err(e) => {
            eprintln!("Aborted: {e}");
            ExitCode::FAILURE
        }
    }
}
