use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::LinkError;
use crate::memory::{STATIC_DATA_BASE, TEXT_BASE};
use crate::program::Protogram;

/// Label → word address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    labels: BTreeMap<String, u32>,
}

impl SymbolTable {
    /// Text labels address their instruction at `TEXT_BASE + index`; data
    /// labels address their first word after all preceding data elements.
    pub fn build(proto: &Protogram) -> Result<Self, LinkError> {
        let mut table = Self::default();
        for (index, stmt) in proto.text.iter().enumerate() {
            let addr = TEXT_BASE.wrapping_add(index as u32);
            for label in &stmt.labels {
                table.define(label, addr)?;
            }
        }

        let mut addr = STATIC_DATA_BASE;
        for element in &proto.data {
            table.define(&element.label, addr)?;
            addr = addr.wrapping_add(element.words.len() as u32);
        }
        Ok(table)
    }

    pub fn define(&mut self, label: &str, addr: u32) -> Result<(), LinkError> {
        match self.labels.entry(label.to_string()) {
            Entry::Occupied(_) => Err(LinkError::DuplicateLabel {
                label: label.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(addr);
                Ok(())
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<u32> {
        self.labels.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
