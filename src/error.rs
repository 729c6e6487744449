use thiserror::Error;

use crate::cpu::Trap;

/// Why a single source statement could not be turned into an instruction or
/// a static-data element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("`{mnemonic}` takes {expected} operand(s), found {tokens:?}")]
    ArgumentCount {
        mnemonic: String,
        expected: usize,
        tokens: Vec<String>,
    },
    #[error("unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { mnemonic: String },
    #[error("unknown register `{name}`")]
    UnknownRegister { name: String },
    #[error("malformed memory operand `{operand}`, expected offset(register)")]
    MalformedOperand { operand: String },
    #[error("malformed static data ({reason}): `{line}`")]
    MalformedStaticData { reason: &'static str, line: String },
    #[error("invalid numeric literal `{token}`")]
    InvalidLiteral { token: String },
    #[error("{what} {value} out of range")]
    OutOfRange { what: &'static str, value: i64 },
    #[error("label `{label}` is not followed by an instruction")]
    DanglingLabel { label: String },
}

/// A [`ParseError`] tied to the source line that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}\n    {text}")]
pub struct AsmError {
    /// 1-based line number in the source text.
    pub line: usize,
    pub text: String,
    #[source]
    pub kind: ParseError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("undefined label `{label}`")]
    UndefinedLabel { label: String },
    #[error("label `{label}` defined more than once")]
    DuplicateLabel { label: String },
    #[error("branch to `{label}` needs offset {offset}, which does not fit 16 bits")]
    BranchOutOfRange { label: String, offset: i64 },
    #[error("`{label}` as a memory offset needs {offset} bytes, which does not fit 16 bits")]
    OffsetOutOfRange { label: String, offset: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("program too large: {words} words, text segment holds {limit}")]
    ProgramTooLarge { words: usize, limit: usize },
    #[error("data too large: {words} words, static data segment holds {limit}")]
    DataTooLarge { words: usize, limit: usize },
    #[error("bus rejected segment at {base:#010x}: {reason}")]
    Bus { base: u32, reason: String },
    #[error("machine has already run; reset before loading")]
    NotIdle,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Asm(#[from] AsmError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Trap(#[from] Trap),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
