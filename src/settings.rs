//! # Settings Module
//!
//! ## Purpose
//! User-facing configuration of a pH adjustment pass. Settings are part of the JSON task file
//! (see [`crate::Utils::load_from_file`]) and every field has a default, so a task file may omit
//! the section entirely.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "default_reference_ph": 7.0,
//!   "reference_ph": { "c": 7.2, "e": 7.0 },
//!   "target_ph": { "c": 7.2, "e": 5.5, "p": 5.5 },
//!   "proton_spellings": ["hydrogen"],
//!   "log_level": "info"
//! }
//! ```
//! Compartments missing from `reference_ph` take `default_reference_ph`; compartments missing
//! from `target_ph` keep their reference pH.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustSettings {
    /// pH at which the formulas and charges of the model are currently written
    pub default_reference_ph: f64,
    pub reference_ph: HashMap<String, f64>,
    pub target_ph: HashMap<String, f64>,
    /// spellings recognised as the free proton on top of the built-in ones
    pub proton_spellings: Vec<String>,
    pub log_level: String,
}

impl Default for AdjustSettings {
    fn default() -> Self {
        Self {
            default_reference_ph: 7.0,
            reference_ph: HashMap::new(),
            target_ph: HashMap::new(),
            proton_spellings: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl AdjustSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target_ph(&mut self, compartment: &str, ph: f64) {
        self.target_ph.insert(compartment.to_string(), ph);
    }

    pub fn set_reference_ph(&mut self, compartment: &str, ph: f64) {
        self.reference_ph.insert(compartment.to_string(), ph);
    }

    /// log level, falling back to `Info` for unknown names
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}
