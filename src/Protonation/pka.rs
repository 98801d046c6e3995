//! # pKa data and the protonation state selector
//!
//! ## Main Data Structures and Logic
//! - `PKaLibrary`: read-only lookup of pKa values keyed by base metabolite id (the id without
//!   its compartment suffix). It is built once by the caller, e.g. from a JSON file exported from
//!   a pKa database, and passed explicitly to whoever needs it; nothing in the crate keeps it in
//!   global state.
//! - `PKaTable`: pKa rows aligned with the metabolites of one model, each sorted from the most
//!   acidic (highest) to the lowest value, undefined entries last.
//! - `protonation_ordinal()`: number of protons removed from the fully protonated state at a
//!   given pH.
use crate::MetabolicModel::compartments::{SuffixConvention, SuffixParser};
use crate::MetabolicModel::model::MetabolicModel;
use crate::errors::PhAdjustError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// pKa values of one metabolite, `None` marks an undefined entry
pub type PKaRow = Vec<Option<f64>>;

fn sort_row(row: impl IntoIterator<Item = f64>) -> PKaRow {
    let mut defined: Vec<f64> = row.into_iter().collect();
    let undefined = defined.iter().filter(|v| v.is_nan()).count();
    defined.retain(|v| !v.is_nan());
    defined.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    let mut sorted: PKaRow = defined.into_iter().map(Some).collect();
    sorted.extend(std::iter::repeat_n(None, undefined));
    sorted
}

/// Protons removed relative to the fully protonated state.
///
/// `pkas` must be sorted in descending order with undefined entries last (as [`PKaTable`] rows
/// are). Scanning from the highest pKa, every defined entry below `ph` counts one deprotonation;
/// scanning stops at the first undefined entry.
pub fn protonation_ordinal(pkas: &[Option<f64>], ph: f64) -> usize {
    pkas.iter()
        .map_while(|pka| *pka)
        .filter(|pka| ph > *pka)
        .count()
}

/// pKa rows aligned with the metabolites of a model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PKaTable {
    rows: Vec<PKaRow>,
}

impl PKaTable {
    /// table of `n` metabolites without any ionizable group
    pub fn empty(n: usize) -> Self {
        Self {
            rows: vec![Vec::new(); n],
        }
    }

    /// rows in any order, `NaN` marks an undefined value
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self {
            rows: rows.into_iter().map(sort_row).collect(),
        }
    }

    /// one row per metabolite, one column per ionizable group, `NaN` where undefined
    pub fn from_dmatrix(matrix: &DMatrix<f64>) -> Self {
        Self {
            rows: matrix
                .row_iter()
                .map(|r| sort_row(r.iter().copied()))
                .collect(),
        }
    }

    /// Looks every metabolite of the model up in the library by its base id. Metabolites absent
    /// from the library get an empty row, i.e. no change of protonation.
    pub fn from_library(
        library: &PKaLibrary,
        model: &MetabolicModel,
        convention: SuffixConvention,
    ) -> Result<Self, PhAdjustError> {
        let parser = SuffixParser::new(convention)?;
        let rows = model
            .met_ids
            .iter()
            .map(|id| {
                let base = parser.split(id).map(|(base, _)| base).unwrap_or(id.as_str());
                library
                    .get(base)
                    .map(|values| sort_row(values.iter().map(|v| v.unwrap_or(f64::NAN))))
                    .unwrap_or_default()
            })
            .collect();
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, met: usize) -> &[Option<f64>] {
        self.rows.get(met).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// ordinal of metabolite `met` at `ph`
    pub fn ordinal(&self, met: usize, ph: f64) -> usize {
        protonation_ordinal(self.row(met), ph)
    }
}

/// Read-only pKa lookup keyed by base metabolite id.
///
/// JSON form: `{"atp": [12.3, 6.5, 4.0], "glu__L": [9.6, 4.3, 2.1], "nh4": [null]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PKaLibrary {
    entries: HashMap<String, Vec<Option<f64>>>,
}

impl PKaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, PhAdjustError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_entry(mut self, base_id: &str, pkas: &[f64]) -> Self {
        self.insert(base_id, pkas);
        self
    }

    pub fn insert(&mut self, base_id: &str, pkas: &[f64]) {
        let values = pkas
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        self.entries.insert(base_id.to_string(), values);
    }

    pub fn get(&self, base_id: &str) -> Option<&[Option<f64>]> {
        self.entries.get(base_id).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
