/// Primary opcodes, bits 31:26.
pub mod opcode {
    pub const SPECIAL: u8 = 0x00;
    pub const J: u8 = 0x02;
    pub const JAL: u8 = 0x03;
    pub const BEQ: u8 = 0x04;
    pub const BNE: u8 = 0x05;
    pub const ADDI: u8 = 0x08;
    pub const ADDIU: u8 = 0x09;
    pub const SLTI: u8 = 0x0a;
    pub const SLTIU: u8 = 0x0b;
    pub const ANDI: u8 = 0x0c;
    pub const ORI: u8 = 0x0d;
    pub const LUI: u8 = 0x0f;
    pub const LW: u8 = 0x23;
    pub const LBU: u8 = 0x24;
    pub const LHU: u8 = 0x25;
    pub const SB: u8 = 0x28;
    pub const SH: u8 = 0x29;
    pub const SW: u8 = 0x2b;
    pub const LL: u8 = 0x30;
    pub const SC: u8 = 0x38;
    pub const HALT: u8 = 0x3f;
}

/// Function codes of the register format, bits 5:0.
pub mod funct {
    pub const SLL: u8 = 0x00;
    pub const SRL: u8 = 0x02;
    pub const JR: u8 = 0x08;
    pub const ADD: u8 = 0x20;
    pub const ADDU: u8 = 0x21;
    pub const SUB: u8 = 0x22;
    pub const SUBU: u8 = 0x23;
    pub const AND: u8 = 0x24;
    pub const OR: u8 = 0x25;
    pub const NOR: u8 = 0x27;
    pub const SLT: u8 = 0x2a;
    pub const SLTU: u8 = 0x2b;
}

/// Operand layout expected by the statement parser and printed by the disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `rd, rs, rt`
    Rrr,
    /// `rd, rs, shamt`
    Shift,
    /// `rs`
    RegJump,
    /// `rt, rs, imm`
    Rri,
    /// `rt, imm`
    Upper,
    /// `rs, rt, target`
    Branch,
    /// `rt, offset(base)`
    Memory,
    /// `target`
    Jump,
    /// no operands
    Nullary,
}

impl Shape {
    pub fn operand_count(self) -> usize {
        match self {
            Shape::Rrr | Shape::Shift | Shape::Rri | Shape::Branch => 3,
            Shape::Upper | Shape::Memory => 2,
            Shape::RegJump | Shape::Jump => 1,
            Shape::Nullary => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    pub opcode: u8,
    /// Function code; only meaningful when `opcode == 0`.
    pub func: u8,
    pub shape: Shape,
}

const fn r(mnemonic: &'static str, func: u8, shape: Shape) -> InstrDesc {
    InstrDesc { mnemonic, opcode: opcode::SPECIAL, func, shape }
}

const fn i(mnemonic: &'static str, opcode: u8, shape: Shape) -> InstrDesc {
    InstrDesc { mnemonic, opcode, func: 0, shape }
}

pub const TABLE: &[InstrDesc] = &[
    r("add", funct::ADD, Shape::Rrr),
    r("addu", funct::ADDU, Shape::Rrr),
    r("and", funct::AND, Shape::Rrr),
    r("jr", funct::JR, Shape::RegJump),
    r("nor", funct::NOR, Shape::Rrr),
    r("or", funct::OR, Shape::Rrr),
    r("slt", funct::SLT, Shape::Rrr),
    r("sltu", funct::SLTU, Shape::Rrr),
    r("sll", funct::SLL, Shape::Shift),
    r("srl", funct::SRL, Shape::Shift),
    r("sub", funct::SUB, Shape::Rrr),
    r("subu", funct::SUBU, Shape::Rrr),
    i("addi", opcode::ADDI, Shape::Rri),
    i("addiu", opcode::ADDIU, Shape::Rri),
    i("andi", opcode::ANDI, Shape::Rri),
    i("ori", opcode::ORI, Shape::Rri),
    i("slti", opcode::SLTI, Shape::Rri),
    i("sltiu", opcode::SLTIU, Shape::Rri),
    i("lui", opcode::LUI, Shape::Upper),
    i("beq", opcode::BEQ, Shape::Branch),
    i("bne", opcode::BNE, Shape::Branch),
    i("lw", opcode::LW, Shape::Memory),
    i("sw", opcode::SW, Shape::Memory),
    i("lbu", opcode::LBU, Shape::Memory),
    i("lhu", opcode::LHU, Shape::Memory),
    i("ll", opcode::LL, Shape::Memory),
    i("sb", opcode::SB, Shape::Memory),
    i("sc", opcode::SC, Shape::Memory),
    i("sh", opcode::SH, Shape::Memory),
    i("j", opcode::J, Shape::Jump),
    i("jal", opcode::JAL, Shape::Jump),
    i("halt", opcode::HALT, Shape::Nullary),
];

/// ABI register names indexed by register number.
pub const REGISTER_NAMES: [&str; 32] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", //
    "$t0", "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7", //
    "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7", //
    "$t8", "$t9", "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

pub const REG_RA: u8 = 31;
