//! # Formula and charge adjustment
//!
//! ## Aim
//! Rewrites the formula and charge of every metabolite for the protonation state it takes at the
//! target pH of its compartment.
//!
//! ## Main Data Structures and Logic
//! - `proton_deltas()`: per metabolite, target ordinal minus reference ordinal.
//! - `adjust_metabolite()`: applies one delta to the hydrogen count and the charge and writes
//!   the formula back from the element vector.
//! - `FormulaEdit`: the outcome for one metabolite. Edits are computed for the whole model first
//!   and applied by `apply_formula_edits()` only when every one of them is valid, so a
//!   `NegativeAtomCount` error leaves the model untouched.
//!
//! ## Fallback
//! A formula that could not be expressed in the element vocabulary parses to an all-zero vector.
//! Such a formula, and any whose adjusted vector has no positive count left, is kept verbatim and
//! the edit is marked `fallback`; the charge is adjusted as usual. The element row of a fallback
//! edit stays the parsed original, so the imbalance check sees what the model still says.
use crate::MetabolicModel::compartments::CompartmentMap;
use crate::MetabolicModel::elements::{ElementMatrix, ElementVector};
use crate::MetabolicModel::model::MetabolicModel;
use crate::Protonation::ph::PhAssignment;
use crate::Protonation::pka::PKaTable;
use crate::errors::PhAdjustError;
use log::{debug, warn};

/// New state of one metabolite
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaEdit {
    pub met: usize,
    pub delta: i64,
    pub elements: ElementVector,
    pub formula: String,
    pub charge: Option<i32>,
    /// the original formula was kept because no formula could be written from the vector
    pub fallback: bool,
}

/// target ordinal minus reference ordinal for every metabolite
pub fn proton_deltas(pka: &PKaTable, ph: &PhAssignment, compartments: &CompartmentMap) -> Vec<i64> {
    compartments
        .met_compartment
        .iter()
        .enumerate()
        .map(|(met, &comp)| {
            let reference = pka.ordinal(met, ph.reference[comp]) as i64;
            let target = pka.ordinal(met, ph.target[comp]) as i64;
            target - reference
        })
        .collect()
}

/// Adjusts one metabolite; `None` when there is nothing to change.
pub fn adjust_metabolite(
    met: usize,
    met_id: &str,
    elements: &ElementVector,
    formula: Option<&str>,
    charge: Option<i32>,
    delta: i64,
) -> Result<Option<FormulaEdit>, PhAdjustError> {
    if delta == 0 {
        return Ok(None);
    }
    let Some(formula) = formula.filter(|f| !f.trim().is_empty()) else {
        debug!("metabolite '{}' has no formula, proton delta {} ignored", met_id, delta);
        return Ok(None);
    };
    let charge = charge.map(|c| c + delta as i32);
    if elements.is_blank() {
        warn!(
            "formula '{}' of '{}' cannot be rebuilt from the element vocabulary, kept unchanged",
            formula, met_id
        );
        return Ok(Some(FormulaEdit {
            met,
            delta,
            elements: *elements,
            formula: formula.to_string(),
            charge,
            fallback: true,
        }));
    }
    let adjusted = elements.with_hydrogen_delta(delta);
    if adjusted.hydrogens() < 0 {
        return Err(PhAdjustError::NegativeAtomCount {
            metabolite: met_id.to_string(),
            hydrogens: elements.hydrogens(),
            delta,
        });
    }
    if adjusted.is_blank() {
        warn!(
            "adjusted formula of '{}' would be empty, '{}' kept unchanged",
            met_id, formula
        );
        // the element row must keep describing the formula that stays in the model
        return Ok(Some(FormulaEdit {
            met,
            delta,
            elements: *elements,
            formula: formula.to_string(),
            charge,
            fallback: true,
        }));
    }
    Ok(Some(FormulaEdit {
        met,
        delta,
        elements: adjusted,
        formula: adjusted.to_formula(),
        charge,
        fallback: false,
    }))
}

/// Computes the edits of the whole model, failing on the first invalid one.
pub fn compute_formula_edits(
    model: &MetabolicModel,
    elements: &ElementMatrix,
    deltas: &[i64],
) -> Result<Vec<FormulaEdit>, PhAdjustError> {
    if deltas.len() != model.n_mets() {
        return Err(PhAdjustError::dimension("proton deltas", model.n_mets(), deltas.len()));
    }
    if elements.len() != model.n_mets() {
        return Err(PhAdjustError::dimension("element matrix rows", model.n_mets(), elements.len()));
    }
    let mut edits = Vec::new();
    for (met, &delta) in deltas.iter().enumerate() {
        if let Some(edit) = adjust_metabolite(
            met,
            &model.met_ids[met],
            &elements.rows[met],
            model.met_formulas[met].as_deref(),
            model.met_charges[met],
            delta,
        )? {
            edits.push(edit);
        }
    }
    Ok(edits)
}

/// Writes the edits into the model and into the element matrix that mirrors it.
pub fn apply_formula_edits(
    model: &mut MetabolicModel,
    elements: &mut ElementMatrix,
    edits: &[FormulaEdit],
) {
    for edit in edits {
        model.met_formulas[edit.met] = Some(edit.formula.clone());
        model.met_charges[edit.met] = edit.charge;
        elements.rows[edit.met] = edit.elements;
    }
}
