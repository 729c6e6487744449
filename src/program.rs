use serde::{Deserialize, Serialize};

use crate::decoder::Instruction;

/// One text-section statement after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStatement {
    /// Labels naming this instruction's address.
    pub labels: Vec<String>,
    pub instruction: Instruction,
    /// Label standing in for the immediate, branch offset or jump address;
    /// the numeric field holds 0 until the linker resolves it.
    pub symbol: Option<String>,
    /// 1-based source line, 0 when built by hand.
    pub line: usize,
}

impl TextStatement {
    pub fn new(instruction: Instruction) -> Self {
        Self {
            labels: Vec::new(),
            instruction,
            symbol: None,
            line: 0,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// A labelled run of words destined for the static-data segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticData {
    pub label: String,
    pub words: Vec<u32>,
}

/// Unlinked assembly output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Protogram {
    pub text: Vec<TextStatement>,
    pub data: Vec<StaticData>,
}

impl Protogram {
    pub fn is_resolved(&self) -> bool {
        self.text.iter().all(|s| s.symbol.is_none())
    }
}

/// Linked image: instruction words for the text segment and data words for
/// the static-data segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub bin: Vec<u32>,
    #[serde(rename = "staticData")]
    pub static_data: Vec<u32>,
}
