use crate::hardware::memory::PROGRAM_SECTION_START;
use std::fmt::{Debug, Formatter};

/// Value of one general purpose register.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Register(u16);

impl Register {
    #[must_use]
    pub const fn from_binary(value: u16) -> Self {
        Self(value)
    }
    #[must_use]
    pub const fn from_decimal(value: i16) -> Self {
        Self(value.cast_unsigned())
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    /// Two's complement interpretation of the register content.
    #[must_use]
    pub const fn as_decimal(self) -> i16 {
        self.0.cast_signed()
    }
}

impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X} ({})", self.0, self.as_decimal())
    }
}

#[must_use]
pub const fn from_binary(value: u16) -> Register {
    Register::from_binary(value)
}
#[must_use]
pub const fn from_decimal(value: i16) -> Register {
    Register::from_decimal(value)
}

/// Register file of the LC-3: `R0` to `R7`, program counter and condition flags.
pub struct Registers {
    general_purpose: [Register; 8],
    pc: u16,
    cond: ConditionFlag,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PC: {:#06X}, COND: {:?}, R: {:?}",
            self.pc, self.cond, self.general_purpose
        )
    }
}

impl Registers {
    pub const GENERAL_PURPOSE_COUNT: u8 = 8;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [Register(0); 8],
            pc: PROGRAM_SECTION_START,
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` is not a general purpose register index, decoded instructions cannot produce this
    #[must_use]
    pub fn get(&self, r: u8) -> Register {
        assert!(
            r < Self::GENERAL_PURPOSE_COUNT,
            "Invalid general purpose register get: {r}"
        );
        self.general_purpose[usize::from(r)]
    }
    /// Writes a general purpose register and derives the condition flags from the new value.
    ///
    /// # Panics
    /// - `r` is not a general purpose register index, decoded instructions cannot produce this
    pub fn set(&mut self, r: u8, value: Register) {
        assert!(
            r < Self::GENERAL_PURPOSE_COUNT,
            "Invalid general purpose register set: {r}"
        );
        self.general_purpose[usize::from(r)] = value;
        self.cond = ConditionFlag::from(value.as_binary());
    }
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }
    /// Returns the current PC and moves it to the next instruction.
    pub const fn increment_pc(&mut self) -> u16 {
        let current = self.pc;
        self.pc = self.pc.wrapping_add(1);
        current
    }
    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    pub const fn set_conditional_register(&mut self, cond: ConditionFlag) {
        self.cond = cond;
    }
}

/// Result classification of the last write to a general purpose register.
///
/// The discriminants are the `n`, `z` and `p` bit positions of the BR instruction.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}

impl ConditionFlag {
    #[must_use]
    pub const fn as_nzp_bits(self) -> u16 {
        self as u16
    }
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
