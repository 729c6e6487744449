use std::collections::HashMap;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

// Word-addressed memory map.
pub const TEXT_BASE: u32 = 0x0040_0000;
pub const STATIC_DATA_BASE: u32 = 0x1000_0000;
pub const DYNAMIC_DATA_BASE: u32 = 0x1000_8000;
pub const MEMORY_WORDS: u32 = 0x7FFF_FFFD;

pub trait Bus {
    fn read_word(&mut self, addr: u32) -> Result<u32>;
    fn write_word(&mut self, addr: u32, val: u32) -> Result<()>;

    fn write_words(&mut self, base: u32, words: &[u32]) -> Result<()> {
        for (i, w) in words.iter().enumerate() {
            self.write_word(base.wrapping_add(i as u32), *w)?;
        }
        Ok(())
    }
}

const PAGE_BITS: u32 = 12;
const PAGE_WORDS: usize = 1 << PAGE_BITS;

/// Flat word array of `size` words, backed by pages allocated on first write.
/// Untouched words read as zero.
#[derive(Clone, Serialize, Deserialize)]
pub struct SparseMemory {
    pages: HashMap<u32, Vec<u32>>,
    pub size: u32,
}

impl SparseMemory {
    pub fn new(size: u32) -> Self {
        Self {
            pages: HashMap::new(),
            size,
        }
    }

    pub fn pages_in_use(&self) -> usize {
        self.pages.len()
    }

    fn check(&self, addr: u32) -> Result<()> {
        ensure!(
            addr < self.size,
            "word address {addr:#010x} outside memory of {:#x} words",
            self.size
        );
        Ok(())
    }
}

impl Default for SparseMemory {
    fn default() -> Self {
        Self::new(MEMORY_WORDS)
    }
}

impl std::fmt::Debug for SparseMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseMemory")
            .field("size", &self.size)
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl Bus for SparseMemory {
    fn read_word(&mut self, addr: u32) -> Result<u32> {
        self.check(addr)?;
        let off = addr as usize & (PAGE_WORDS - 1);
        Ok(self
            .pages
            .get(&(addr >> PAGE_BITS))
            .map_or(0, |page| page[off]))
    }

    fn write_word(&mut self, addr: u32, val: u32) -> Result<()> {
        self.check(addr)?;
        let off = addr as usize & (PAGE_WORDS - 1);
        let page = self
            .pages
            .entry(addr >> PAGE_BITS)
            .or_insert_with(|| vec![0; PAGE_WORDS]);
        page[off] = val;
        Ok(())
    }
}
