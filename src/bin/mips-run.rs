use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mips_sim::{build, Conditions, CpuConfig, Isa, Machine, Program};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble and run a MIPS subset program on the mips-sim interpreter"
)]
struct Opts {
    /// Assembly source, or a linked program saved as `.json`
    #[arg(value_name = "FILE")]
    input: PathBuf,
    /// CPU configuration as JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    max_steps: Option<u64>,
    #[arg(long)]
    halt_on_overflow: bool,
    #[arg(long)]
    halt_on_unsupported: bool,
    /// Discard writes to $zero
    #[arg(long)]
    hardwire_zero: bool,
    /// Print every fetched instruction
    #[arg(long)]
    trace: bool,
    /// Print non-zero registers after the run
    #[arg(long)]
    dump: bool,
}

fn read_program(isa: &Isa, path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if path.extension().is_some_and(|e| e == "json") {
        return serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()));
    }
    let (program, _) = build(isa, &text)?;
    Ok(program)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let mut cfg = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<CpuConfig>(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => CpuConfig::default(),
    };
    if opts.max_steps.is_some() {
        cfg.max_steps = opts.max_steps;
    }
    if opts.halt_on_overflow {
        cfg.halt_on |= Conditions::OVERFLOW;
    }
    if opts.halt_on_unsupported {
        cfg.halt_on |= Conditions::UNSUPPORTED;
    }
    cfg.hardwire_zero |= opts.hardwire_zero;

    let mut machine = Machine::new(cfg);
    let program = read_program(machine.isa(), &opts.input)?;
    machine.load(&program)?;

    let trace = opts.trace;
    let result = machine.run_with(|f, text| {
        if trace {
            println!("{:#010x}: {:08x}  {text}", f.pc, f.word);
        }
    });

    match result {
        Ok(summary) => {
            for trap in &summary.reported {
                eprintln!("TRAP: {trap}");
            }
            eprintln!("{:?} after {} steps", summary.exit, summary.steps);
        }
        Err(trap) => eprintln!("HALT: {trap}"),
    }

    if opts.dump {
        println!("pc    {:#010x}", machine.cpu.pc);
        for (r, v) in machine.cpu.gpr.iter().enumerate() {
            if *v != 0 {
                let name = machine.isa().register_name(r as u8).unwrap_or("$?");
                println!("{name:<5} {v:#010x} ({})", *v as i32);
            }
        }
    }

    Ok(())
}
