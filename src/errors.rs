//! Errors of loading program images and of executing them.
use std::io;
use std::path::PathBuf;

/// Failure to get a program image into memory. Nothing is executed after one of these.
#[derive(displaydoc::Display, thiserror::Error, Debug)]
pub enum LoadProgramError {
    /// Could not read program image {path:?}: {source}
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Program is missing valid .ORIG header
    ProgramMissingOrigHeader,
}

/// Fatal error while running a loaded program, the faulting instruction is not skipped.
#[derive(displaydoc::Display, thiserror::Error, Debug, PartialEq, Eq)]
pub enum ExecutionError {
    /// Invalid opcode {opcode:#06b} at address {address:#06X}
    InvalidOpcode { opcode: u8, address: u16 },
    /// Invalid trap code {trap_code:#04X} at address {address:#06X}
    InvalidTrapCode { trap_code: u8, address: u16 },
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Execution interrupted by user
    Interrupted,
}

impl From<io::Error> for ExecutionError {
    fn from(error: io::Error) -> Self {
        Self::IOInputOutputError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_execution_error_messages() {
        expect_that!(
            ExecutionError::InvalidOpcode {
                opcode: 0b1101,
                address: 0x3004
            }
            .to_string(),
            eq("Invalid opcode 0b1101 at address 0x3004")
        );
        expect_that!(
            ExecutionError::InvalidTrapCode {
                trap_code: 0x26,
                address: 0x3010
            }
            .to_string(),
            eq("Invalid trap code 0x26 at address 0x3010")
        );
    }
    #[gtest]
    pub fn test_load_error_keeps_source() {
        let err = LoadProgramError::Io {
            path: PathBuf::from("missing.obj"),
            source: io::Error::new(io::ErrorKind::NotFound, "not there"),
        };
        expect_that!(
            err.to_string(),
            eq("Could not read program image \"missing.obj\": not there")
        );
        expect_that!(std::error::Error::source(&err).is_some(), eq(true));
    }
}
