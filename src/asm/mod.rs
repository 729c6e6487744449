//! Two-pass assembler: parse to a [`Protogram`], collect labels into a
//! [`SymbolTable`], then link to a [`Program`].

pub mod link;
pub mod parser;
pub mod source;
pub mod symbols;

use tracing::debug;

use crate::error::{AsmError, Error, ParseError};
use crate::isa::mips32::Isa;
use crate::program::{Program, Protogram};

pub use link::{link, relocate};
pub use parser::StatementParser;
pub use source::{split_sections, Sections, SourceLine};
pub use symbols::SymbolTable;

fn at(line: &SourceLine) -> impl FnOnce(ParseError) -> AsmError + '_ {
    move |kind| AsmError {
        line: line.number,
        text: line.text.clone(),
        kind,
    }
}

/// Parse a whole source file. A label alone on its line names the next
/// instruction.
pub fn assemble(isa: &Isa, source: &str) -> Result<Protogram, AsmError> {
    let sections = split_sections(source);
    let parser = StatementParser::new(isa);
    let mut proto = Protogram::default();

    let mut pending: Vec<String> = Vec::new();
    let mut last_label_line = None;
    for line in &sections.text {
        if let (Some(label), "") = parser::split_label(&line.text) {
            pending.push(label.to_string());
            last_label_line = Some(line);
            continue;
        }
        let mut stmt = parser.parse_text(&line.text).map_err(at(line))?;
        stmt.line = line.number;
        if !pending.is_empty() {
            pending.append(&mut stmt.labels);
            stmt.labels = std::mem::take(&mut pending);
        }
        proto.text.push(stmt);
    }
    if let (Some(label), Some(line)) = (pending.pop(), last_label_line) {
        return Err(at(line)(ParseError::DanglingLabel { label }));
    }

    for line in &sections.data {
        proto.data.push(parser.parse_data(&line.text).map_err(at(line))?);
    }

    debug!(
        "assembled {} instructions, {} data elements",
        proto.text.len(),
        proto.data.len()
    );
    Ok(proto)
}

/// Assemble, build the symbol table and link.
pub fn build(isa: &Isa, source: &str) -> Result<(Program, SymbolTable), Error> {
    let proto = assemble(isa, source)?;
    let symbols = SymbolTable::build(&proto)?;
    let program = link(proto, &symbols)?;
    Ok((program, symbols))
}
