use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use mips_sim::{Program, SymbolTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelKV {
    pub addr: u32,
    pub name: String,
}

/// A linked program plus the labels that produced it, as written to disk.
/// `mips-run` reads the same file; it only looks at `bin` and `staticData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(flatten)]
    pub program: Program,
    #[serde(default)]
    pub labels: Vec<LabelKV>,
}

impl Image {
    pub fn new(program: Program, symbols: &SymbolTable) -> Self {
        let mut labels: Vec<LabelKV> = symbols
            .iter()
            .map(|(name, addr)| LabelKV { addr, name: name.to_string() })
            .collect();
        labels.sort_by_key(|l| l.addr);
        Self { program, labels }
    }
}

pub fn save_image(path: &Path, image: &Image) -> Result<()> {
    let json = serde_json::to_string_pretty(image)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

pub fn load_image(path: &Path) -> Result<Image> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mips_sim::{build, Isa};

    #[test]
    fn image_survives_disk() {
        let (program, symbols) = build(&Isa::new(), "main: halt\n.data\nv: .word 3").unwrap();
        let image = Image::new(program, &symbols);
        assert_eq!(image.labels[0], LabelKV { addr: 0x0040_0000, name: "main".into() });

        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_image.json");
        save_image(&path, &image).unwrap();
        let back = load_image(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, image);
    }

    #[test]
    fn bare_program_json_loads() {
        let image: Image = serde_json::from_str(r#"{"bin":[1],"staticData":[]}"#).unwrap();
        assert_eq!(image.program.bin, vec![1]);
        assert!(image.labels.is_empty());
    }
}
