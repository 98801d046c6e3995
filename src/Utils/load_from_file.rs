//! Reading pH adjustment tasks from JSON files.
//!
//! A task file holds the model in the usual JSON layout of constraint-based modelling tools
//! (metabolites with id/formula/charge, reactions with a metabolite -> coefficient map), the pKa
//! library keyed by base metabolite id, the settings and the reactions whose direction is
//! overridden:
//! ```json
//! {
//!   "model": {
//!     "id": "toy",
//!     "compartments": { "c": "cytosol", "e": "extracellular" },
//!     "metabolites": [ { "id": "atp[c]", "formula": "C10H12N5O13P3", "charge": -4 } ],
//!     "reactions": [ { "id": "ATPase", "metabolites": { "atp[c]": -1.0 } } ]
//!   },
//!   "pka": { "atp": [12.3, 6.5, 4.0] },
//!   "settings": { "target_ph": { "c": 5.0 } },
//!   "direction_override": []
//! }
//! ```
//! `compartments` may be a list of codes or a code -> name object (codes are then taken in
//! alphabetical order) and may be omitted.
use crate::MetabolicModel::model::MetabolicModel;
use crate::Protonation::pka::PKaLibrary;
use crate::Rebalancing::auto_adjust::PhTask;
use crate::errors::PhAdjustError;
use crate::settings::AdjustSettings;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonCompartments {
    List(Vec<String>),
    Named(BTreeMap<String, String>),
}

impl JsonCompartments {
    pub fn codes(&self) -> Vec<String> {
        match self {
            JsonCompartments::List(codes) => codes.clone(),
            JsonCompartments::Named(map) => map.keys().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonMetabolite {
    pub id: String,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub charge: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReaction {
    pub id: String,
    pub metabolites: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub compartments: Option<JsonCompartments>,
    pub metabolites: Vec<JsonMetabolite>,
    #[serde(default)]
    pub reactions: Vec<JsonReaction>,
}

impl JsonModel {
    pub fn into_model(self) -> Result<MetabolicModel, PhAdjustError> {
        let mut model = MetabolicModel::new_empty(String::new());
        model.id = self.id;
        model.compartments = self.compartments.map(|c| c.codes());
        for met in &self.metabolites {
            let formula = met.formula.as_deref().filter(|f| !f.trim().is_empty());
            model.add_metabolite(&met.id, formula, met.charge)?;
        }
        for rxn in &self.reactions {
            let entries: Vec<(&str, f64)> = rxn
                .metabolites
                .iter()
                .map(|(id, coefficient)| (id.as_str(), *coefficient))
                .collect();
            model.add_reaction(&rxn.id, &entries)?;
        }
        Ok(model)
    }
}

/// Layout of a task file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFile {
    pub model: JsonModel,
    #[serde(default)]
    pub pka: PKaLibrary,
    #[serde(default)]
    pub settings: AdjustSettings,
    #[serde(default)]
    pub direction_override: Vec<String>,
}

impl TaskFile {
    pub fn into_task(self) -> Result<PhTask, PhAdjustError> {
        let model = self.model.into_model()?;
        if self.pka.is_empty() {
            warn!("task has an empty pKa library, no metabolite will change protonation state");
        }
        Ok(PhTask {
            model,
            pka_library: self.pka,
            settings: self.settings,
            direction_override: self.direction_override,
        })
    }
}

pub fn load_task_from_str(json: &str) -> Result<PhTask, PhAdjustError> {
    let file: TaskFile = serde_json::from_str(json).map_err(|e| {
        error!(
            "Error parsing task at line {}, column {}: {}",
            e.line(),
            e.column(),
            e
        );
        PhAdjustError::Json(e)
    })?;
    let task = file.into_task()?;
    info!(
        "task parsed: {} metabolites, {} reactions, {} pKa entries",
        task.model.n_mets(),
        task.model.n_rxns(),
        task.pka_library.len()
    );
    Ok(task)
}

pub fn load_task_from_file(file_name: &str) -> Result<PhTask, PhAdjustError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(PhAdjustError::InvalidTask(format!(
            "File '{}' does not exist",
            file_name
        )));
    }
    let content = fs::read_to_string(path)?;
    info!("loading task from file '{}'", file_name);
    load_task_from_str(&content)
}
