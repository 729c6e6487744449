use std::collections::HashMap;

use crate::decoder::{bits, Decoder, IFields, Instruction, JFields, RFields, HALT_WORD};
use crate::instructions::{opcode, InstrDesc, Shape, REGISTER_NAMES, TABLE};

/// Lookup tables for the reduced MIPS32 subset.
///
/// Built once by the caller and shared by reference with the parser,
/// disassembler and machine. Absence from a table is always reported as
/// `None`, never as a defaulted code.
#[derive(Debug, Clone)]
pub struct Isa {
    by_mnemonic: HashMap<&'static str, &'static InstrDesc>,
    by_opcode: HashMap<u8, &'static InstrDesc>,
    by_func: HashMap<u8, &'static InstrDesc>,
    registers: HashMap<String, u8>,
}

impl Isa {
    pub fn new() -> Self {
        let mut by_mnemonic = HashMap::new();
        let mut by_opcode = HashMap::new();
        let mut by_func = HashMap::new();
        for desc in TABLE {
            by_mnemonic.insert(desc.mnemonic, desc);
            if desc.opcode == opcode::SPECIAL {
                by_func.insert(desc.func, desc);
            } else {
                by_opcode.insert(desc.opcode, desc);
            }
        }

        let mut registers = HashMap::new();
        for (n, name) in REGISTER_NAMES.iter().enumerate() {
            registers.insert((*name).to_string(), n as u8);
            registers.insert(format!("${n}"), n as u8);
        }

        Self { by_mnemonic, by_opcode, by_func, registers }
    }

    pub fn lookup(&self, mnemonic: &str) -> Option<&'static InstrDesc> {
        self.by_mnemonic.get(mnemonic.to_ascii_lowercase().as_str()).copied()
    }

    pub fn opcode(&self, mnemonic: &str) -> Option<u8> {
        self.lookup(mnemonic).map(|d| d.opcode)
    }

    /// Function code of a register-format mnemonic.
    pub fn func(&self, mnemonic: &str) -> Option<u8> {
        self.lookup(mnemonic).filter(|d| d.opcode == opcode::SPECIAL).map(|d| d.func)
    }

    pub fn register(&self, name: &str) -> Option<u8> {
        self.registers.get(name.to_ascii_lowercase().as_str()).copied()
    }

    pub fn register_name(&self, index: u8) -> Option<&'static str> {
        REGISTER_NAMES.get(index as usize).copied()
    }

    /// Table entry describing an already decoded instruction.
    pub fn describe(&self, ins: &Instruction) -> Option<&'static InstrDesc> {
        match ins {
            Instruction::Register(r) => self.by_func.get(&r.func).copied(),
            Instruction::Immediate(i) => self
                .by_opcode
                .get(&i.opcode)
                .copied()
                .filter(|d| d.shape != Shape::Nullary),
            Instruction::Jump(j) => self.by_opcode.get(&j.opcode).copied(),
            Instruction::Halt => self.by_opcode.get(&opcode::HALT).copied(),
        }
    }

    pub fn mnemonic(&self, ins: &Instruction) -> Option<&'static str> {
        self.describe(ins).map(|d| d.mnemonic)
    }
}

impl Default for Isa {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits 32-bit words into the three instruction formats.
pub struct Mips32Decoder;

impl Mips32Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Mips32Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Mips32Decoder {
    fn decode(&self, raw32: u32) -> Instruction {
        if raw32 == HALT_WORD {
            return Instruction::Halt;
        }
        let op = bits(raw32, 31, 26) as u8;
        match op {
            opcode::SPECIAL => Instruction::Register(RFields {
                rs: bits(raw32, 25, 21) as u8,
                rt: bits(raw32, 20, 16) as u8,
                rd: bits(raw32, 15, 11) as u8,
                shamt: bits(raw32, 10, 6) as u8,
                func: bits(raw32, 5, 0) as u8,
            }),
            opcode::J | opcode::JAL => Instruction::Jump(JFields { opcode: op, address: bits(raw32, 25, 0) }),
            _ => Instruction::Immediate(IFields {
                opcode: op,
                rs: bits(raw32, 25, 21) as u8,
                rt: bits(raw32, 20, 16) as u8,
                imm: bits(raw32, 15, 0) as u16,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_absent_not_zero() {
        let isa = Isa::new();
        assert_eq!(isa.register("$zero"), Some(0));
        assert_eq!(isa.register("$0"), Some(0));
        assert_eq!(isa.register("$31"), Some(31));
        assert_eq!(isa.register("$32"), None);
        assert_eq!(isa.register("$bogus"), None);
        assert_eq!(isa.opcode("frob"), None);
        assert_eq!(isa.func("addi"), None);
        assert_eq!(isa.func("sll"), Some(0));
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        let isa = Isa::new();
        assert_eq!(isa.opcode("LW"), Some(0x23));
        assert_eq!(isa.register("$T0"), Some(8));
    }
}
