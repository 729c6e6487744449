use tracing::warn;

use crate::asm::symbols::SymbolTable;
use crate::decoder::Instruction;
use crate::error::LinkError;
use crate::memory::TEXT_BASE;
use crate::program::{Program, Protogram};

/// Resolve every symbolic operand in place.
///
/// Branches get `target - (pc + 1)`. Memory offsets get the byte offset of
/// the label within its 64K-word window, so a base register holding the
/// window start (`lui`) reaches it. Other immediates and jump addresses get
/// the label's absolute address. All symbols are resolved before any
/// statement is touched, so on error the protogram is left unchanged.
pub fn relocate(proto: &mut Protogram, symbols: &SymbolTable) -> Result<(), LinkError> {
    let mut patches = Vec::new();
    for (index, stmt) in proto.text.iter().enumerate() {
        let Some(label) = stmt.symbol.as_deref() else {
            continue;
        };
        let target = symbols.get(label).ok_or_else(|| LinkError::UndefinedLabel {
            label: label.to_string(),
        })?;
        let pc = TEXT_BASE.wrapping_add(index as u32);
        patches.push((index, resolve(stmt.instruction, label, pc, target)?));
    }

    for (index, instruction) in patches {
        let stmt = &mut proto.text[index];
        stmt.instruction = instruction;
        stmt.symbol = None;
    }
    Ok(())
}

fn resolve(mut ins: Instruction, label: &str, pc: u32, target: u32) -> Result<Instruction, LinkError> {
    let branch = ins.is_branch();
    let memory = ins.is_memory();
    match &mut ins {
        Instruction::Immediate(i) if branch => {
            let offset = target as i64 - (pc as i64 + 1);
            if offset < i16::MIN as i64 || offset > i16::MAX as i64 {
                return Err(LinkError::BranchOutOfRange {
                    label: label.to_string(),
                    offset,
                });
            }
            i.imm = offset as i16 as u16;
        }
        Instruction::Immediate(i) if memory => {
            let offset = (target & 0xFFFF) as i64 * 4;
            if offset > i16::MAX as i64 {
                return Err(LinkError::OffsetOutOfRange {
                    label: label.to_string(),
                    offset,
                });
            }
            i.imm = offset as u16;
        }
        Instruction::Immediate(i) => {
            if target > 0xFFFF {
                warn!("`{label}` at {target:#010x} truncated to 16 bits at {pc:#010x}");
            }
            i.imm = target as u16;
        }
        Instruction::Jump(j) => {
            if target & !0x03FF_FFFF != 0 {
                warn!("`{label}` at {target:#010x} truncated to 26 bits at {pc:#010x}");
            }
            j.address = target & 0x03FF_FFFF;
        }
        Instruction::Register(_) | Instruction::Halt => {}
    }
    Ok(ins)
}

/// Relocate, then encode the text section and concatenate the data words.
pub fn link(mut proto: Protogram, symbols: &SymbolTable) -> Result<Program, LinkError> {
    relocate(&mut proto, symbols)?;
    Ok(Program {
        bin: proto.text.iter().map(|s| s.instruction.encode()).collect(),
        static_data: proto.data.into_iter().flat_map(|d| d.words).collect(),
    })
}
