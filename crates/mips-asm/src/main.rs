use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

use mips_asm::{load_image, save_image, Image};
use mips_sim::asm::{assemble, link, relocate, SymbolTable};
use mips_sim::decoder::Decoder;
use mips_sim::disasm::{fmt_instruction, fmt_with_operand};
use mips_sim::memory::{STATIC_DATA_BASE, TEXT_BASE};
use mips_sim::{Isa, Mips32Decoder, Protogram, StaticData};

#[derive(Parser, Debug)]
#[command(author, version, about = "MIPS subset assembler CLI", long_about = None)]
struct Cli {
    /// Assembly source file, or a JSON image from `build`
    #[arg(value_name = "FILE")]
    input: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble and link to a JSON image loadable by mips-run
    Build {
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Print each text word and data element with its address
    Listing {
        /// Show the encoded word next to each instruction
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the symbol table
    Symbols {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// One listing row: address, encoded word, disassembly and the labels naming it.
struct Row {
    addr: u32,
    word: u32,
    text: String,
    labels: Vec<String>,
}

fn source_rows(isa: &Isa, proto: &Protogram, symbols: &SymbolTable) -> Result<Vec<Row>> {
    let mut resolved = proto.clone();
    relocate(&mut resolved, symbols)?;
    Ok(proto
        .text
        .iter()
        .zip(&resolved.text)
        .enumerate()
        .map(|(i, (src, fin))| Row {
            addr: TEXT_BASE + i as u32,
            word: fin.instruction.encode(),
            text: fmt_with_operand(isa, &src.instruction, src.symbol.as_deref()),
            labels: src.labels.clone(),
        })
        .collect())
}

fn image_rows(isa: &Isa, image: &Image) -> Vec<Row> {
    let dec = Mips32Decoder::new();
    image
        .program
        .bin
        .iter()
        .enumerate()
        .map(|(i, &word)| {
            let addr = TEXT_BASE + i as u32;
            Row {
                addr,
                word,
                text: fmt_instruction(isa, &dec.decode(word)),
                labels: image.labels.iter().filter(|l| l.addr == addr).map(|l| l.name.clone()).collect(),
            }
        })
        .collect()
}

/// Split the static-data words back into elements at each data label.
fn image_data(image: &Image) -> Vec<StaticData> {
    let words = &image.program.static_data;
    let mut starts: Vec<(usize, &str)> = image
        .labels
        .iter()
        .filter(|l| l.addr >= STATIC_DATA_BASE)
        .map(|l| ((l.addr - STATIC_DATA_BASE) as usize, l.name.as_str()))
        .filter(|(off, _)| *off <= words.len())
        .collect();
    starts.sort();
    starts
        .iter()
        .enumerate()
        .map(|(i, &(off, name))| {
            let end = starts.get(i + 1).map_or(words.len(), |&(next, _)| next);
            StaticData {
                label: name.to_string(),
                words: words[off..end.max(off)].to_vec(),
            }
        })
        .collect()
}

fn write_listing(w: &mut dyn Write, rows: &[Row], data: &[StaticData], show_bytes: bool) -> Result<()> {
    writeln!(w, ".text")?;
    for row in rows {
        for label in &row.labels {
            writeln!(w, "{label}:")?;
        }
        if show_bytes {
            writeln!(w, "  {:#010x}: {:08x}  {}", row.addr, row.word, row.text)?;
        } else {
            writeln!(w, "  {:#010x}: {}", row.addr, row.text)?;
        }
    }
    if !data.is_empty() {
        writeln!(w, ".data")?;
    }
    let mut addr = STATIC_DATA_BASE;
    for element in data {
        writeln!(w, "{}:", element.label)?;
        writeln!(w, "  {addr:#010x}: {} words {:?}", element.words.len(), element.words)?;
        addr += element.words.len() as u32;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let isa = Isa::new();

    if cli.input.extension().is_some_and(|e| e == "json") {
        let image = load_image(&cli.input)?;
        match cli.cmd {
            Command::Build { .. } => bail!("{} is already linked", cli.input.display()),
            Command::Listing { show_bytes, out } => {
                let rows = image_rows(&isa, &image);
                let data = image_data(&image);
                write_listing(&mut *open_out(out)?, &rows, &data, show_bytes)?;
            }
            Command::Symbols { format } => match format {
                OutputFormat::Text => {
                    for l in &image.labels {
                        println!("{:#010x} {}", l.addr, l.name);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&image.labels)?),
            },
        }
        return Ok(());
    }

    let source = std::fs::read_to_string(&cli.input)?;
    let proto = assemble(&isa, &source)?;
    let symbols = SymbolTable::build(&proto)?;

    match cli.cmd {
        Command::Build { out } => {
            let program = link(proto, &symbols)?;
            println!(
                "{}: {} text words, {} data words",
                out.display(),
                program.bin.len(),
                program.static_data.len()
            );
            save_image(&out, &Image::new(program, &symbols))?;
        }
        Command::Listing { show_bytes, out } => {
            let rows = source_rows(&isa, &proto, &symbols)?;
            write_listing(&mut *open_out(out)?, &rows, &proto.data, show_bytes)?;
        }
        Command::Symbols { format } => match format {
            OutputFormat::Text => {
                for (name, addr) in symbols.iter() {
                    println!("{addr:#010x} {name}");
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&symbols)?),
        },
    }
    Ok(())
}

fn open_out(out: Option<PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match out {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    })
}
