//! Mass and charge imbalance of reactions.
//!
//! The imbalance of reaction `j` on element `k` is `Σ_i S[i, j] · E[i, k]`: positive values mean
//! the products carry more atoms than the substrates. The pass only consumes the contract
//! ([`ImbalanceChecker`]); [`StoichiometricChecker`] is the implementation used by default.
use crate::MetabolicModel::elements::{ElementMatrix, HYDROGEN, N_ELEMENTS};
use crate::MetabolicModel::model::MetabolicModel;
use crate::errors::PhAdjustError;
use nalgebra::{DMatrix, DVector};

/// imbalances below this magnitude count as balanced
pub const BALANCE_TOLERANCE: f64 = 1e-9;

/// Per-reaction imbalance: one row per reaction, one column per vocabulary element, plus the
/// charge imbalance.
#[derive(Debug, Clone, PartialEq)]
pub struct ImbalanceReport {
    pub elements: DMatrix<f64>,
    pub charge: DVector<f64>,
}

impl ImbalanceReport {
    pub fn n_rxns(&self) -> usize {
        self.elements.nrows()
    }

    pub fn hydrogen(&self, rxn: usize) -> f64 {
        self.elements[(rxn, HYDROGEN)]
    }

    /// true if the reaction is unbalanced on anything other than hydrogen
    pub fn is_complex(&self, rxn: usize) -> bool {
        (0..N_ELEMENTS)
            .filter(|&k| k != HYDROGEN)
            .any(|k| self.elements[(rxn, k)].abs() > BALANCE_TOLERANCE)
    }

    pub fn is_balanced(&self, rxn: usize) -> bool {
        self.hydrogen(rxn).abs() <= BALANCE_TOLERANCE && !self.is_complex(rxn)
    }

    pub fn check_len(&self, n_rxns: usize) -> Result<(), PhAdjustError> {
        if self.elements.nrows() != n_rxns || self.charge.len() != n_rxns {
            return Err(PhAdjustError::dimension(
                "imbalance matrix rows",
                n_rxns,
                self.elements.nrows(),
            ));
        }
        if self.elements.ncols() != N_ELEMENTS {
            return Err(PhAdjustError::dimension(
                "imbalance matrix columns",
                N_ELEMENTS,
                self.elements.ncols(),
            ));
        }
        Ok(())
    }
}

/// Mass/charge balance checker the rebalancing step consumes.
pub trait ImbalanceChecker {
    fn check(
        &self,
        model: &MetabolicModel,
        elements: &ElementMatrix,
    ) -> Result<ImbalanceReport, PhAdjustError>;
}

/// Computes imbalances straight from the stoichiometric matrix and the element matrix.
/// Missing charges count as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoichiometricChecker;

impl ImbalanceChecker for StoichiometricChecker {
    fn check(
        &self,
        model: &MetabolicModel,
        elements: &ElementMatrix,
    ) -> Result<ImbalanceReport, PhAdjustError> {
        if elements.len() != model.n_mets() {
            return Err(PhAdjustError::dimension(
                "element matrix rows",
                model.n_mets(),
                elements.len(),
            ));
        }
        let n_rxns = model.n_rxns();
        let mut imbalance = DMatrix::zeros(n_rxns, N_ELEMENTS);
        let mut charge = DVector::zeros(n_rxns);
        for rxn in 0..n_rxns {
            for (&met, &coefficient) in model.s.column(rxn) {
                let counts = elements.rows[met].counts();
                for k in 0..N_ELEMENTS {
                    imbalance[(rxn, k)] += coefficient * counts[k] as f64;
                }
                charge[rxn] += coefficient * model.met_charges[met].unwrap_or(0) as f64;
            }
        }
        Ok(ImbalanceReport {
            elements: imbalance,
            charge,
        })
    }
}
