use crate::numbers::sign_extend;
use std::fmt::{Debug, Formatter};

/// Operations selected by bits `[15:12]` of an instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Br = 0b0000,
    Add = 0b0001,
    Ld = 0b0010,
    St = 0b0011,
    Jsr = 0b0100,
    And = 0b0101,
    Ldr = 0b0110,
    Str = 0b0111,
    /// Return from interrupt, not supported without privilege modes
    Rti = 0b1000,
    Not = 0b1001,
    Ldi = 0b1010,
    Sti = 0b1011,
    Jmp = 0b1100,
    /// Reserved
    Res = 0b1101,
    Lea = 0b1110,
    Trap = 0b1111,
}

/// Trap routines selected by bits `[7:0]` of a TRAP instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapCode {
    GetC = 0x20,
    Out = 0x21,
    PutS = 0x22,
    In = 0x23,
    PutSp = 0x24,
    Halt = 0x25,
}

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (0..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        let width = u32::from(to - from + 1);
        let mask = u16::MAX.checked_shr(u16::BITS - width).unwrap_or(0);
        (self.0 >> from) & mask
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "at most 8 bits wide")]
    pub fn get_bit_range_u8(self, from: u8, to: u8) -> u8 {
        debug_assert!(to - from < 8, "bit range {from}..={to} does not fit into u8");
        self.get_bit_range(from, to) as u8
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.get_bit_range_u8(12, 15)
    }
    /// Decoded operation, `None` for encodings outside the instruction set.
    #[must_use]
    pub fn operation(self) -> Option<Operation> {
        Operation::n(self.op_code())
    }
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11)
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8)
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2)
    }
    /// Condition bits `n`, `z` and `p` of a BR instruction, same positions as
    /// [`crate::hardware::registers::ConditionFlag`].
    #[must_use]
    pub fn nzp(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Distinguishes JSR (PC relative) from JSRR (base register).
    #[must_use]
    pub fn is_long_offset(self) -> bool {
        self.get_bit(11)
    }
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        sign_extend(self.get_bit_range(0, 4), 5)
    }
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7)
    }
    /// Offset of `len` bits to add to program counter PC or a base register.
    /// Can be positive or negative.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> i16 {
        sign_extend(self.get_bit_range(0, len - 1), len).cast_signed()
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#06X} Op: {:?}, DR: {:03b}, PC_Off: {}",
            self.0,
            self.operation(),
            self.dr_number(),
            self.pc_offset(9)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_instr_get_bit_range_valid() {
        let sut = Instruction::from(0b1010_101_001010101);
        expect_that!(sut.op_code(), eq(0b1010));
        expect_that!(sut.dr_number(), eq(0b101));
        expect_that!(sut.pc_offset(9), eq(0b0_0101_0101));
        expect_that!(sut.get_bit_range(0, 15), eq(0b1010_101_001010101));

        // Add: DR: 3, SR1: 2, Immediate: false, SR2: 1
        let sut = Instruction::from(0b0001_011_010_0_00_001);
        expect_that!(sut.operation(), some(eq(Operation::Add)));
        expect_that!(sut.dr_number(), eq(3));
        expect_that!(sut.sr1_number(), eq(2));
        expect_that!(sut.sr2_number(), eq(1));
        expect_that!(sut.is_immediate(), eq(false));

        // Add: DR: 7, SR1: 0, Immediate: true, imm5: 14
        let sut = Instruction::from(0b0001_111_000_1_01110);
        expect_that!(sut.dr_number(), eq(7));
        expect_that!(sut.sr1_number(), eq(0));
        expect_that!(sut.is_immediate(), eq(true));
        expect_that!(sut.get_immediate(), eq(14));

        // Add: imm5: -1
        let sut = Instruction::from(0b0001_111_000_1_11111);
        expect_that!(sut.get_immediate(), eq(0xFFFF));
    }
    #[gtest]
    pub fn test_instr_offsets_are_sign_extended() {
        // LD with PCoffset9 0x1FF
        let sut = Instruction::from(0b0010_000_111111111);
        expect_that!(sut.pc_offset(9), eq(-1));
        // LDR with offset6 -32
        let sut = Instruction::from(0b0110_010_110_100000);
        expect_that!(sut.pc_offset(6), eq(-32));
        // JSR with PCoffset11 -1024
        let sut = Instruction::from(0b0100_1_10000000000);
        expect_that!(sut.is_long_offset(), eq(true));
        expect_that!(sut.pc_offset(11), eq(-1024));
        // JSRR
        let sut = Instruction::from(0b0100_0_00_110_000000);
        expect_that!(sut.is_long_offset(), eq(false));
    }
    #[gtest]
    pub fn test_instr_trap_vector() {
        let sut = Instruction::from(0xF025);
        expect_that!(sut.operation(), some(eq(Operation::Trap)));
        expect_that!(sut.trap_vector(), eq(0x25));
        expect_that!(TrapCode::n(sut.trap_vector()), some(eq(TrapCode::Halt)));
        expect_that!(TrapCode::n(0x26), none());
    }
    #[parameterized(
        br = { 0x0, Operation::Br },
        rti = { 0x8, Operation::Rti },
        res = { 0xD, Operation::Res },
        trap = { 0xF, Operation::Trap },
    )]
    fn test_operation_from_op_code(op_code: u16, expected: Operation) {
        let sut = Instruction::from(op_code << 12);
        assert_that!(sut.operation(), some(eq(expected)));
    }
    #[gtest]
    #[should_panic(expected = "wrong direction of from: 2 and to: 1")]
    pub fn test_instr_get_bit_range_wrong_order() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 1);
    }
    #[gtest]
    #[should_panic(expected = "index: 16 to u16 is greater than maximum value 15")]
    pub fn test_instr_get_bit_range_index_too_large() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 16);
    }
}
