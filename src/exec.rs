use crate::cpu::{Cpu, Fetch, Trap};
use crate::decoder::{IFields, Instruction, JFields, RFields};
use crate::instructions::{funct, opcode, REG_RA};
use crate::memory::Bus;

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, f: &Fetch) -> Result<(), Trap>;
}

/// Integer executor for the MIPS subset. On entry `cpu.pc` already points at
/// the next sequential word; control-flow instructions overwrite it.
pub struct MipsExecutor;

impl Executor for MipsExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, f: &Fetch) -> Result<(), Trap> {
        match f.instruction {
            Instruction::Register(r) => exec_register(cpu, f, r),
            Instruction::Immediate(i) => exec_immediate(cpu, bus, f, i),
            Instruction::Jump(j) => exec_jump(cpu, f, j),
            // The run loop stops on the sentinel before dispatch.
            Instruction::Halt => Ok(()),
        }
    }
}

/// Signed add that reports overflow when both operands share a sign the result lacks.
fn add_checked(pc: u32, lhs: u32, rhs: u32) -> Result<u32, Trap> {
    match (lhs as i32).checked_add(rhs as i32) {
        Some(v) => Ok(v as u32),
        None => Err(Trap::Overflow { pc, lhs, rhs }),
    }
}

fn exec_register(cpu: &mut Cpu, f: &Fetch, r: RFields) -> Result<(), Trap> {
    let a = cpu.reg(r.rs);
    let b = cpu.reg(r.rt);
    let res = match r.func {
        funct::ADD => add_checked(f.pc, a, b)?,
        funct::ADDU => a.wrapping_add(b),
        funct::SUB | funct::SUBU => a.wrapping_sub(b),
        funct::AND => a & b,
        funct::OR => a | b,
        funct::NOR => !(a | b),
        funct::SLT => ((a as i32) < (b as i32)) as u32,
        funct::SLTU => (a < b) as u32,
        funct::SLL => a << (r.shamt & 0x1F),
        funct::SRL => a >> (r.shamt & 0x1F),
        funct::JR => {
            cpu.pc = a;
            return Ok(());
        }
        _ => {
            return Err(Trap::Unsupported {
                pc: f.pc,
                word: f.word,
            })
        }
    };
    cpu.set_reg(r.rd, res);
    Ok(())
}

fn exec_immediate<B: Bus>(cpu: &mut Cpu, bus: &mut B, f: &Fetch, i: IFields) -> Result<(), Trap> {
    let s = cpu.reg(i.rs);
    let simm = i.simm() as u32;
    let zimm = i.imm as u32;
    match i.opcode {
        opcode::ADDI => {
            let v = add_checked(f.pc, s, simm)?;
            cpu.set_reg(i.rt, v);
        }
        opcode::ADDIU => cpu.set_reg(i.rt, s.wrapping_add(simm)),
        opcode::ANDI => cpu.set_reg(i.rt, s & zimm),
        opcode::ORI => cpu.set_reg(i.rt, s | zimm),
        opcode::SLTI => cpu.set_reg(i.rt, ((s as i32) < i.simm()) as u32),
        opcode::SLTIU => cpu.set_reg(i.rt, (s < simm) as u32),
        opcode::LUI => cpu.set_reg(i.rt, zimm << 16),
        opcode::BEQ => {
            if s == cpu.reg(i.rt) {
                cpu.pc = cpu.pc.wrapping_add(simm);
            }
        }
        opcode::BNE => {
            if s != cpu.reg(i.rt) {
                cpu.pc = cpu.pc.wrapping_add(simm);
            }
        }
        opcode::LW => {
            let addr = effective_address(f, s, i)?;
            let val = bus
                .read_word(addr)
                .map_err(|source| Trap::Bus { addr, source })?;
            cpu.set_reg(i.rt, val);
        }
        opcode::SW => {
            let addr = effective_address(f, s, i)?;
            let val = cpu.reg(i.rt);
            bus.write_word(addr, val)
                .map_err(|source| Trap::Bus { addr, source })?;
        }
        // lbu, lhu, ll, sb, sc, sh and anything unassigned
        _ => {
            return Err(Trap::Unsupported {
                pc: f.pc,
                word: f.word,
            })
        }
    }
    Ok(())
}

/// Memory is word-addressed; the encoded offset is in bytes and must be
/// word-aligned.
#[inline]
fn effective_address(f: &Fetch, base: u32, i: IFields) -> Result<u32, Trap> {
    let offset = i.simm();
    if offset & 3 != 0 {
        return Err(Trap::Unaligned { pc: f.pc, offset });
    }
    Ok(base.wrapping_add((offset >> 2) as u32))
}

fn exec_jump(cpu: &mut Cpu, f: &Fetch, j: JFields) -> Result<(), Trap> {
    // pc already points past the jump; its top 6 bits select the segment
    let target = (cpu.pc & 0xFC00_0000) | (j.address & 0x03FF_FFFF);
    match j.opcode {
        opcode::J => cpu.pc = target,
        opcode::JAL => {
            let ret = cpu.pc;
            cpu.set_reg(REG_RA, ret);
            cpu.pc = target;
        }
        _ => {
            return Err(Trap::Unsupported {
                pc: f.pc,
                word: f.word,
            })
        }
    }
    Ok(())
}
