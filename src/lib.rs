pub mod asm;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod exec;
pub mod instructions;
pub mod machine;
pub mod memory;
pub mod program;

pub mod isa {
    pub mod mips32;
}

pub use asm::{assemble, build, SymbolTable};
pub use cpu::{Conditions, Cpu, CpuConfig, Fetch, Trap};
pub use decoder::{Decoder, Instruction};
pub use error::{AsmError, Error, LinkError, LoadError, ParseError};
pub use isa::mips32::{Isa, Mips32Decoder};
pub use machine::{Exit, Machine, RunSummary, State};
pub use memory::{Bus, SparseMemory};
pub use program::{Program, Protogram, StaticData, TextStatement};
