//! Block-type library: per-type port counts, default geometry,
//! default parameters and styling, loaded from a JSON document.
//!
//! The library is advisory. A type the library does not know resolves
//! to a safe fallback (one input, one output, default rectangle), and
//! a malformed definition is skipped with a warning; loading never
//! fails on bad entries, only on unreadable or unparseable documents.

use crate::block::{Block, Parameter};
use kurbo::Point;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default block width when a type definition gives none.
pub const DEFAULT_WIDTH: f64 = 100.0;
/// Default block height when a type definition gives none.
pub const DEFAULT_HEIGHT: f64 = 60.0;

/// Errors from loading a block library document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read block library: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse block library: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Visual styling hints for a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    pub fill: String,
    pub stroke: String,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            fill: "#ffffff".into(),
            stroke: "#333333".into(),
        }
    }
}

/// One block-type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDef {
    /// Type name, e.g. "gain".
    pub name: String,
    #[serde(default = "one")]
    pub inputs: usize,
    #[serde(default = "one")]
    pub outputs: usize,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub style: BlockStyle,
}

fn one() -> usize {
    1
}

fn default_width() -> f64 {
    DEFAULT_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_HEIGHT
}

impl BlockDef {
    /// The safe definition used for types the library does not know.
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: 1,
            outputs: 1,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            parameters: Vec::new(),
            style: BlockStyle::default(),
        }
    }
}

/// On-disk shape of a library document.
#[derive(Debug, Deserialize)]
struct LibraryDoc {
    #[serde(default)]
    blocks: Vec<serde_json::Value>,
}

/// The set of known block types.
#[derive(Debug, Clone, Default)]
pub struct BlockLibrary {
    defs: HashMap<String, BlockDef>,
}

impl BlockLibrary {
    /// Parse a library from JSON text. Malformed entries are skipped
    /// with a warning; only an unparseable document is an error.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let doc: LibraryDoc = serde_json::from_str(text)?;
        let mut defs = HashMap::new();
        for entry in doc.blocks {
            match serde_json::from_value::<BlockDef>(entry) {
                Ok(def) => {
                    defs.insert(def.name.clone(), def);
                }
                Err(err) => warn!("skipping malformed block definition: {err}"),
            }
        }
        Ok(Self { defs })
    }

    /// Load a library from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// A small built-in library, used when no document is supplied.
    pub fn builtin() -> Self {
        let mut lib = Self::default();
        for (name, inputs, outputs) in [
            ("constant", 0, 1),
            ("gain", 1, 1),
            ("sum", 2, 1),
            ("integrator", 1, 1),
            ("scope", 1, 0),
        ] {
            lib.defs.insert(
                name.to_string(),
                BlockDef {
                    name: name.to_string(),
                    inputs,
                    outputs,
                    ..BlockDef::fallback(name)
                },
            );
        }
        lib
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the library knows no types.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Exact lookup, without the fallback.
    pub fn get(&self, block_type: &str) -> Option<&BlockDef> {
        self.defs.get(block_type)
    }

    /// Resolve a type, falling back to the one-in/one-out default for
    /// unknown names.
    pub fn resolve(&self, block_type: &str) -> BlockDef {
        match self.defs.get(block_type) {
            Some(def) => def.clone(),
            None => {
                warn!("unknown block type '{block_type}', using fallback definition");
                BlockDef::fallback(block_type)
            }
        }
    }

    /// Build a block of the given type at a position, copying the
    /// type's default parameters.
    pub fn instantiate(&self, block_type: &str, id: &str, position: Point) -> Block {
        let def = self.resolve(block_type);
        Block::new(id, block_type, position, def.width, def.height)
            .with_parameters(def.parameters)
    }
}
