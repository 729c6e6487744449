use crate::decoder::Instruction;
use crate::instructions::Shape;
use crate::isa::mips32::Isa;

/// Render an instruction in the same syntax the statement parser accepts.
pub fn fmt_instruction(isa: &Isa, ins: &Instruction) -> String {
    fmt_with_operand(isa, ins, None)
}

/// Like [`fmt_instruction`], but prints `symbol` in place of the branch
/// offset, jump address or immediate when the operand is still unresolved.
pub fn fmt_with_operand(isa: &Isa, ins: &Instruction, symbol: Option<&str>) -> String {
    let Some(desc) = isa.describe(ins) else {
        return format!(".word {:#010x}", ins.encode());
    };
    let mn = desc.mnemonic;
    let reg = |r: u8| isa.register_name(r).unwrap_or("$?");

    match (*ins, desc.shape) {
        (Instruction::Register(r), Shape::Rrr) => {
            format!("{mn} {}, {}, {}", reg(r.rd), reg(r.rs), reg(r.rt))
        }
        (Instruction::Register(r), Shape::Shift) => {
            format!("{mn} {}, {}, {}", reg(r.rd), reg(r.rs), r.shamt)
        }
        (Instruction::Register(r), Shape::RegJump) => format!("{mn} {}", reg(r.rs)),
        (Instruction::Immediate(i), Shape::Rri) => {
            let imm = symbol.map_or_else(|| imm_text(i.opcode, i.imm), str::to_string);
            format!("{mn} {}, {}, {imm}", reg(i.rt), reg(i.rs))
        }
        (Instruction::Immediate(i), Shape::Upper) => {
            let imm = symbol.map_or_else(|| i.imm.to_string(), str::to_string);
            format!("{mn} {}, {imm}", reg(i.rt))
        }
        (Instruction::Immediate(i), Shape::Branch) => {
            let off = symbol.map_or_else(|| i.simm().to_string(), str::to_string);
            format!("{mn} {}, {}, {off}", reg(i.rs), reg(i.rt))
        }
        (Instruction::Immediate(i), Shape::Memory) => {
            let off = symbol.map_or_else(|| i.simm().to_string(), str::to_string);
            format!("{mn} {}, {off}({})", reg(i.rt), reg(i.rs))
        }
        (Instruction::Jump(j), Shape::Jump) => {
            let target = symbol.map_or_else(|| format!("{:#x}", j.address), str::to_string);
            format!("{mn} {target}")
        }
        (Instruction::Halt, _) => "halt".to_string(),
        _ => format!(".word {:#010x}", ins.encode()),
    }
}

// andi/ori zero-extend their immediate; the rest sign-extend.
fn imm_text(opcode: u8, imm: u16) -> String {
    use crate::instructions::opcode::{ANDI, ORI};
    match opcode {
        ANDI | ORI => imm.to_string(),
        _ => (imm as i16).to_string(),
    }
}
