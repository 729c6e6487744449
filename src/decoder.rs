use serde::{Deserialize, Serialize};

use crate::instructions::opcode;

/// Word reserved for the `halt` pseudo-instruction.
pub const HALT_WORD: u32 = 0xFFFF_FFFF;

/// Extract the inclusive bit range `[high, low]` of `word`, right-aligned.
///
/// The field is `high - low + 1` bits wide.
#[inline]
pub fn bits(word: u32, high: u32, low: u32) -> u32 {
    debug_assert!(high >= low && high < 32);
    let width = high - low + 1;
    let mask = if width == 32 { u32::MAX } else { (1u32 << width) - 1 };
    (word >> low) & mask
}

/// Register format: `opcode(31:26)=0 rs(25:21) rt(20:16) rd(15:11) shamt(10:6) func(5:0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RFields {
    pub rs: u8,
    pub rt: u8,
    pub rd: u8,
    pub shamt: u8,
    pub func: u8,
}

/// Immediate format: `opcode(31:26) rs(25:21) rt(20:16) immediate(15:0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IFields {
    pub opcode: u8,
    pub rs: u8,
    pub rt: u8,
    pub imm: u16,
}

impl IFields {
    /// The immediate reinterpreted as a signed 16-bit quantity.
    pub fn simm(&self) -> i32 {
        self.imm as i16 as i32
    }
}

/// Jump format: `opcode(31:26) address(25:0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JFields {
    pub opcode: u8,
    pub address: u32,
}

/// One machine instruction. The structural fields are the only stored
/// representation; the word is derived on demand by [`Instruction::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    Register(RFields),
    Immediate(IFields),
    Jump(JFields),
    /// The sentinel word [`HALT_WORD`]. Other words with the halt opcode
    /// decode as `Immediate`.
    Halt,
}

impl Instruction {
    pub fn opcode(&self) -> u8 {
        match self {
            Instruction::Register(_) => opcode::SPECIAL,
            Instruction::Immediate(i) => i.opcode,
            Instruction::Jump(j) => j.opcode,
            Instruction::Halt => opcode::HALT,
        }
    }

    pub fn encode(&self) -> u32 {
        match *self {
            Instruction::Register(r) => {
                ((r.rs as u32 & 0x1F) << 21)
                    | ((r.rt as u32 & 0x1F) << 16)
                    | ((r.rd as u32 & 0x1F) << 11)
                    | ((r.shamt as u32 & 0x1F) << 6)
                    | (r.func as u32 & 0x3F)
            }
            Instruction::Immediate(i) => {
                ((i.opcode as u32 & 0x3F) << 26)
                    | ((i.rs as u32 & 0x1F) << 21)
                    | ((i.rt as u32 & 0x1F) << 16)
                    | i.imm as u32
            }
            Instruction::Jump(j) => ((j.opcode as u32 & 0x3F) << 26) | (j.address & 0x03FF_FFFF),
            Instruction::Halt => HALT_WORD,
        }
    }

    /// Conditional PC-relative branch (`beq`/`bne`).
    pub fn is_branch(&self) -> bool {
        matches!(self, Instruction::Immediate(i) if i.opcode == opcode::BEQ || i.opcode == opcode::BNE)
    }

    /// `offset(base)` load or store; the immediate is a byte offset.
    pub fn is_memory(&self) -> bool {
        use crate::instructions::opcode::*;
        matches!(self, Instruction::Immediate(i) if matches!(i.opcode, LW | LBU | LHU | SB | SH | SW | LL | SC))
    }
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Instruction;
}
