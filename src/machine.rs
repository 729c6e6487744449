use tracing::{debug, info, trace, warn};

use crate::cpu::{Cpu, CpuConfig, Fetch, Trap};
use crate::disasm::fmt_instruction;
use crate::error::LoadError;
use crate::exec::MipsExecutor;
use crate::isa::mips32::{Isa, Mips32Decoder};
use crate::memory::{Bus, SparseMemory, DYNAMIC_DATA_BASE, STATIC_DATA_BASE, TEXT_BASE};
use crate::program::Program;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Fetched the halt word.
    Sentinel,
    /// The PC moved past the start of static data.
    PastText,
    /// `max_steps` instructions executed.
    StepLimit,
    /// A trap selected by `halt_on` fired.
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Halted(Exit),
}

#[derive(Debug)]
pub struct RunSummary {
    /// Instructions executed, the halt word excluded.
    pub steps: u64,
    pub exit: Exit,
    /// Traps that were reported and skipped.
    pub reported: Vec<Trap>,
}

/// Each segment may fill its window exactly.
fn check_sizes(text_words: usize, data_words: usize) -> Result<(), LoadError> {
    let text_limit = (STATIC_DATA_BASE - TEXT_BASE) as usize;
    if text_words > text_limit {
        return Err(LoadError::ProgramTooLarge {
            words: text_words,
            limit: text_limit,
        });
    }
    let data_limit = (DYNAMIC_DATA_BASE - STATIC_DATA_BASE) as usize;
    if data_words > data_limit {
        return Err(LoadError::DataTooLarge {
            words: data_words,
            limit: data_limit,
        });
    }
    Ok(())
}

/// Memory, CPU and decoder wired together.
pub struct Machine<B: Bus = SparseMemory> {
    pub cpu: Cpu,
    pub mem: B,
    isa: Isa,
    dec: Mips32Decoder,
    exec: MipsExecutor,
    state: State,
}

impl Machine<SparseMemory> {
    pub fn new(cfg: CpuConfig) -> Self {
        Self::with_bus(cfg, SparseMemory::default())
    }
}

impl<B: Bus> Machine<B> {
    pub fn with_bus(cfg: CpuConfig, mem: B) -> Self {
        Self {
            cpu: Cpu::new(cfg),
            mem,
            isa: Isa::new(),
            dec: Mips32Decoder::new(),
            exec: MipsExecutor,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn isa(&self) -> &Isa {
        &self.isa
    }

    /// Clear registers and return to `Idle`. Memory keeps its contents.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new(self.cpu.cfg);
        self.state = State::Idle;
    }

    /// Copy the program's text words to `TEXT_BASE` and its data words to
    /// `STATIC_DATA_BASE`. Both sizes are checked before anything is written.
    pub fn load(&mut self, program: &Program) -> Result<(), LoadError> {
        if self.state != State::Idle {
            return Err(LoadError::NotIdle);
        }
        check_sizes(program.bin.len(), program.static_data.len())?;

        for (base, words) in [(TEXT_BASE, &program.bin), (STATIC_DATA_BASE, &program.static_data)] {
            self.mem
                .write_words(base, words)
                .map_err(|e| LoadError::Bus { base, reason: e.to_string() })?;
        }
        self.cpu.reset(TEXT_BASE);
        debug!(
            "loaded {} text words at {TEXT_BASE:#010x}, {} data words at {STATIC_DATA_BASE:#010x}",
            program.bin.len(),
            program.static_data.len()
        );
        Ok(())
    }

    pub fn run(&mut self) -> Result<RunSummary, Trap> {
        self.run_with(|_, _| {})
    }

    /// Fetch-execute until the halt word, the end of the text segment, the
    /// step limit, or a trap in `halt_on`. `observe` sees every fetch,
    /// including the halt word, with its disassembly.
    pub fn run_with<F>(&mut self, mut observe: F) -> Result<RunSummary, Trap>
    where
        F: FnMut(&Fetch, &str),
    {
        self.state = State::Running;
        let cfg = self.cpu.cfg;
        let mut steps = 0u64;
        let mut reported = Vec::new();

        let exit = loop {
            if self.cpu.pc > STATIC_DATA_BASE {
                break Exit::PastText;
            }
            if cfg.max_steps.is_some_and(|max| steps >= max) {
                break Exit::StepLimit;
            }

            let f = match self.cpu.fetch(&mut self.mem, &self.dec) {
                Ok(f) => f,
                Err(trap) => return Err(self.fault(trap)),
            };
            let text = fmt_instruction(&self.isa, &f.instruction);
            trace!("{:#010x}: {:08x}  {text}", f.pc, f.word);
            observe(&f, &text);

            if f.is_halt() {
                break Exit::Sentinel;
            }
            steps += 1;

            if let Err(trap) = self.cpu.execute(&mut self.mem, &self.exec, &f) {
                if cfg.halt_on.intersects(trap.condition()) {
                    return Err(self.fault(trap));
                }
                warn!("{trap}");
                reported.push(trap);
            }
        };

        self.state = State::Halted(exit);
        info!("halted after {steps} steps: {exit:?}");
        Ok(RunSummary { steps, exit, reported })
    }

    fn fault(&mut self, trap: Trap) -> Trap {
        self.state = State::Halted(Exit::Fault);
        info!("halted on {trap}");
        trap
    }
}
