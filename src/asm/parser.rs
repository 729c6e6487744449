use crate::decoder::{IFields, Instruction, JFields, RFields};
use crate::error::ParseError;
use crate::instructions::Shape;
use crate::isa::mips32::Isa;
use crate::memory::{DYNAMIC_DATA_BASE, STATIC_DATA_BASE};
use crate::program::{StaticData, TextStatement};

/// Largest `.space` reservation: the whole static-data window.
const MAX_SPACE_WORDS: i64 = (DYNAMIC_DATA_BASE - STATIC_DATA_BASE) as i64;

/// Turns single source lines into text statements or static-data elements.
pub struct StatementParser<'a> {
    isa: &'a Isa,
}

/// Immediate operand before linking.
enum Operand {
    Value(i64),
    Symbol(String),
}

impl<'a> StatementParser<'a> {
    pub fn new(isa: &'a Isa) -> Self {
        Self { isa }
    }

    /// Parse `[label:] mnemonic operands...`.
    pub fn parse_text(&self, line: &str) -> Result<TextStatement, ParseError> {
        let (label, body) = split_label(line);
        if body.is_empty() {
            return Err(ParseError::DanglingLabel {
                label: label.unwrap_or_default().to_string(),
            });
        }
        let (instruction, symbol) = self.parse_instruction(body)?;
        Ok(TextStatement {
            labels: label.map(str::to_string).into_iter().collect(),
            instruction,
            symbol,
            line: 0,
        })
    }

    /// Parse a bare instruction. Returns the instruction with any symbolic
    /// operand zeroed, plus the symbol itself.
    pub fn parse_instruction(&self, body: &str) -> Result<(Instruction, Option<String>), ParseError> {
        let tokens: Vec<&str> = body
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        let Some((mnemonic, ops)) = tokens.split_first() else {
            return Err(ParseError::UnknownMnemonic { mnemonic: String::new() });
        };
        let desc = self.isa.lookup(mnemonic).ok_or_else(|| ParseError::UnknownMnemonic {
            mnemonic: mnemonic.to_string(),
        })?;

        let expected = desc.shape.operand_count();
        if ops.len() != expected {
            return Err(ParseError::ArgumentCount {
                mnemonic: desc.mnemonic.to_string(),
                expected,
                tokens: ops.iter().map(|t| t.to_string()).collect(),
            });
        }

        let register = |rd, rs, rt, shamt| {
            Instruction::Register(RFields { rs, rt, rd, shamt, func: desc.func })
        };
        let immediate = |rs, rt, imm: u16| {
            Instruction::Immediate(IFields { opcode: desc.opcode, rs, rt, imm })
        };

        let parsed = match desc.shape {
            Shape::Rrr => {
                let (rd, rs, rt) = (self.reg(ops[0])?, self.reg(ops[1])?, self.reg(ops[2])?);
                (register(rd, rs, rt, 0), None)
            }
            Shape::Shift => {
                let (rd, rs) = (self.reg(ops[0])?, self.reg(ops[1])?);
                let shamt = literal_in(ops[2], "shift amount", 0, 31)?;
                (register(rd, rs, 0, shamt as u8), None)
            }
            Shape::RegJump => (register(0, self.reg(ops[0])?, 0, 0), None),
            Shape::Rri => {
                let (rt, rs) = (self.reg(ops[0])?, self.reg(ops[1])?);
                let (imm, sym) = imm16(ops[2], "immediate", -0x8000, 0xFFFF)?;
                (immediate(rs, rt, imm), sym)
            }
            Shape::Upper => {
                let rt = self.reg(ops[0])?;
                let (imm, sym) = imm16(ops[1], "immediate", -0x8000, 0xFFFF)?;
                (immediate(0, rt, imm), sym)
            }
            Shape::Branch => {
                let (rs, rt) = (self.reg(ops[0])?, self.reg(ops[1])?);
                let (imm, sym) = imm16(ops[2], "branch offset", -0x8000, 0x7FFF)?;
                (immediate(rs, rt, imm), sym)
            }
            Shape::Memory => {
                let rt = self.reg(ops[0])?;
                let (offset, base) = split_memory(ops[1])?;
                let rs = self.reg(base)?;
                let (imm, sym) = if offset.is_empty() {
                    (0, None)
                } else {
                    imm16(offset, "memory offset", -0x8000, 0x7FFF)?
                };
                (immediate(rs, rt, imm), sym)
            }
            Shape::Jump => match operand(ops[0])? {
                Operand::Value(v) => {
                    let address = in_range(v, "jump target", 0, 0x03FF_FFFF)? as u32;
                    (Instruction::Jump(JFields { opcode: desc.opcode, address }), None)
                }
                Operand::Symbol(s) => (Instruction::Jump(JFields { opcode: desc.opcode, address: 0 }), Some(s)),
            },
            Shape::Nullary => (Instruction::Halt, None),
        };
        Ok(parsed)
    }

    /// Parse `label: .directive value`.
    pub fn parse_data(&self, line: &str) -> Result<StaticData, ParseError> {
        let malformed = |reason| ParseError::MalformedStaticData {
            reason,
            line: line.to_string(),
        };

        let (label, rest) = split_label(line);
        let label = label.ok_or_else(|| malformed("missing label"))?;
        let (directive, value) = match rest.split_once(char::is_whitespace) {
            Some((d, v)) => (d, v.trim()),
            None => (rest, ""),
        };
        if directive.is_empty() || value.is_empty() {
            return Err(malformed("expected label, directive and value"));
        }

        let words = match directive.to_ascii_lowercase().as_str() {
            ".word" => value
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| literal_in(t, ".word value", i32::MIN as i64, u32::MAX as i64).map(|v| v as u32))
                .collect::<Result<Vec<_>, _>>()?,
            ".space" => {
                let n = literal_in(value, ".space size", 0, MAX_SPACE_WORDS)?;
                vec![0; n as usize]
            }
            ".asciiz" => string_words(value).map_err(malformed)?,
            _ => return Err(malformed("unknown directive")),
        };

        Ok(StaticData {
            label: label.to_string(),
            words,
        })
    }

    fn reg(&self, name: &str) -> Result<u8, ParseError> {
        self.isa.register(name).ok_or_else(|| ParseError::UnknownRegister {
            name: name.to_string(),
        })
    }
}

/// Split off a leading `name:` if the text before the first colon is a
/// valid label.
pub fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.split_once(':') {
        Some((head, rest)) if is_label(head.trim()) => (Some(head.trim()), rest.trim()),
        _ => (None, line.trim()),
    }
}

pub fn is_label(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// A token is numeric when it starts with a digit, or with a sign followed
/// by a digit. Anything else names a label.
pub fn is_numeric(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-' | '+') => matches!(chars.next(), Some(c) if c.is_ascii_digit()),
        _ => false,
    }
}

/// Decimal or `0x` hexadecimal, optionally signed.
pub fn parse_literal(token: &str) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidLiteral {
        token: token.to_string(),
    };
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        i64::from_str_radix(hex, 16).map_err(|_| invalid())?
    } else {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.parse::<i64>().map_err(|_| invalid())?
    };
    Ok(if negative { -magnitude } else { magnitude })
}

fn in_range(value: i64, what: &'static str, min: i64, max: i64) -> Result<i64, ParseError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ParseError::OutOfRange { what, value })
    }
}

fn literal_in(token: &str, what: &'static str, min: i64, max: i64) -> Result<i64, ParseError> {
    if !is_numeric(token) {
        return Err(ParseError::InvalidLiteral {
            token: token.to_string(),
        });
    }
    in_range(parse_literal(token)?, what, min, max)
}

fn operand(token: &str) -> Result<Operand, ParseError> {
    if is_numeric(token) {
        parse_literal(token).map(Operand::Value)
    } else {
        Ok(Operand::Symbol(token.to_string()))
    }
}

fn imm16(token: &str, what: &'static str, min: i64, max: i64) -> Result<(u16, Option<String>), ParseError> {
    match operand(token)? {
        Operand::Value(v) => Ok((in_range(v, what, min, max)? as u16, None)),
        Operand::Symbol(s) => Ok((0, Some(s))),
    }
}

/// `offset(base)` with an optional offset.
fn split_memory(token: &str) -> Result<(&str, &str), ParseError> {
    token
        .split_once('(')
        .and_then(|(offset, rest)| rest.strip_suffix(')').map(|base| (offset, base)))
        .filter(|(_, base)| !base.is_empty())
        .ok_or_else(|| ParseError::MalformedOperand {
            operand: token.to_string(),
        })
}

/// One word per character of a double-quoted literal, then a zero word.
fn string_words(value: &str) -> Result<Vec<u32>, &'static str> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or("expected a double-quoted string")?;

    let mut words = Vec::with_capacity(inner.len() + 1);
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        let c = match c {
            '\\' => match chars.next() {
                Some('n') => '\n',
                Some('t') => '\t',
                Some('0') => '\0',
                Some('\\') => '\\',
                Some('"') => '"',
                _ => return Err("unknown escape sequence"),
            },
            '"' => return Err("unescaped quote inside string"),
            c => c,
        };
        words.push(c as u32);
    }
    words.push(0);
    Ok(words)
}
