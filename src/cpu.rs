use anyhow::Error;
use crate::decoder::{Decoder, Instruction};
use crate::exec::Executor;
use crate::memory::{Bus, TEXT_BASE};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
/// Classes of runtime condition. Used both to tag a [`Trap`] and to select
/// which of them stop a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions: u8 {
const OVERFLOW = 1 << 0; // signed add overflow
const UNSUPPORTED = 1 << 1; // recognised but unimplemented or unknown encoding
const BUS = 1 << 2; // memory access outside the array
const UNALIGNED = 1 << 3; // load/store byte offset not a multiple of 4
}
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Conditions that end the run instead of being reported and skipped.
    pub halt_on: Conditions,
    /// Instruction-count ceiling; `None` runs until halt.
    pub max_steps: Option<u64>,
    /// Discard writes to `$zero`.
    pub hardwire_zero: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            halt_on: Conditions::BUS.union(Conditions::UNALIGNED),
            max_steps: None,
            hardwire_zero: false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("arithmetic overflow at {pc:#010x}: {lhs:#010x} + {rhs:#010x}")]
    Overflow { pc: u32, lhs: u32, rhs: u32 },
    #[error("unsupported instruction {word:#010x} at {pc:#010x}")]
    Unsupported { pc: u32, word: u32 },
    #[error("unaligned access at {pc:#010x}: byte offset {offset} is not a multiple of 4")]
    Unaligned { pc: u32, offset: i32 },
    #[error("bus error at {addr:#010x}: {source}")]
    Bus { addr: u32, #[source] source: Error },
}

impl Trap {
    pub fn condition(&self) -> Conditions {
        match self {
            Trap::Overflow { .. } => Conditions::OVERFLOW,
            Trap::Unsupported { .. } => Conditions::UNSUPPORTED,
            Trap::Unaligned { .. } => Conditions::UNALIGNED,
            Trap::Bus { .. } => Conditions::BUS,
        }
    }
}

/// One fetched and decoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetch {
    pub pc: u32,
    pub word: u32,
    pub instruction: Instruction,
}

impl Fetch {
    pub fn is_halt(&self) -> bool {
        self.instruction == Instruction::Halt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Fetch),
    Halted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: u32,         // Program Counter, in words
    pub gpr: [u32; 32],  // General purpose registers
    pub cfg: CpuConfig,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            pc: TEXT_BASE,
            gpr: [0; 32],
            cfg,
        }
    }

    pub fn reset(&mut self, reset_pc: u32) {
        self.pc = reset_pc;
    }

    #[inline]
    pub fn reg(&self, r: u8) -> u32 {
        self.gpr[r as usize & 0x1F]
    }

    #[inline]
    pub fn set_reg(&mut self, r: u8, val: u32) {
        if r == 0 && self.cfg.hardwire_zero {
            return;
        }
        self.gpr[r as usize & 0x1F] = val;
    }

    pub fn fetch<B: Bus, D: Decoder>(&self, bus: &mut B, dec: &D) -> Result<Fetch, Trap> {
        let pc = self.pc;
        let word = bus
            .read_word(pc)
            .map_err(|source| Trap::Bus { addr: pc, source })?;
        Ok(Fetch {
            pc,
            word,
            instruction: dec.decode(word),
        })
    }

    /// Advance the PC past `f` and execute it. Control-flow instructions
    /// overwrite the advanced PC.
    pub fn execute<B: Bus, X: Executor>(&mut self, bus: &mut B, exec: &X, f: &Fetch) -> Result<(), Trap> {
        self.pc = f.pc.wrapping_add(1);
        exec.exec(self, bus, f)
    }

    /// Fetch, advance the PC by one word and execute. The sentinel leaves the
    /// PC where it is.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<Step, Trap> {
        let f = self.fetch(bus, dec)?;
        if f.is_halt() {
            return Ok(Step::Halted);
        }
        self.execute(bus, exec, &f)?;
        Ok(Step::Executed(f))
    }
}
