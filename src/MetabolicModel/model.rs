//! Stoichiometric model: metabolites, reactions and the sparse stoichiometric matrix.
//!
//! Metabolite data is kept in parallel arrays (id, formula, charge) aligned with the rows of the
//! stoichiometric matrix; reaction ids are aligned with its columns. Negative coefficients are
//! substrates, positive ones are products.
use crate::errors::PhAdjustError;
use nalgebra::DMatrix;
use std::collections::{BTreeMap, HashMap};

/// Sparse (metabolites × reactions) matrix stored column by column.
///
/// Genome-scale models have thousands of metabolites and reactions with a handful of nonzero
/// entries per reaction, so each column is a small ordered map from metabolite row to
/// coefficient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoichMatrix {
    n_rows: usize,
    columns: Vec<BTreeMap<usize, f64>>,
}

impl StoichMatrix {
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: Vec::new(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.n_rows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.columns
            .get(col)
            .and_then(|c| c.get(&row))
            .copied()
            .unwrap_or(0.0)
    }

    /// sets an entry, creating it if absent; zero removes it
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), PhAdjustError> {
        if row >= self.n_rows {
            return Err(PhAdjustError::dimension("stoichiometric row index", self.n_rows, row));
        }
        let n_cols = self.columns.len();
        let column = self
            .columns
            .get_mut(col)
            .ok_or_else(|| PhAdjustError::dimension("stoichiometric column index", n_cols, col))?;
        if value == 0.0 {
            column.remove(&row);
        } else {
            column.insert(row, value);
        }
        Ok(())
    }

    pub fn column(&self, col: usize) -> &BTreeMap<usize, f64> {
        &self.columns[col]
    }

    pub fn push_column(&mut self, column: BTreeMap<usize, f64>) -> usize {
        self.columns.push(column);
        self.columns.len() - 1
    }

    /// appends an empty metabolite row, returns its index
    pub fn push_zero_row(&mut self) -> usize {
        self.n_rows += 1;
        self.n_rows - 1
    }

    pub fn nnz(&self) -> usize {
        self.columns.iter().map(|c| c.len()).sum()
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.n_rows, self.columns.len());
        for (j, column) in self.columns.iter().enumerate() {
            for (&i, &v) in column {
                dense[(i, j)] = v;
            }
        }
        dense
    }
}

/// Represents a Genome Scale Metabolic Model
#[derive(Debug, Clone, Default)]
pub struct MetabolicModel {
    pub id: Option<String>,
    /// unique metabolite identifiers, compartment-tagged (`atp[c]` or `atp_c`)
    pub met_ids: Vec<String>,
    pub met_formulas: Vec<Option<String>>,
    pub met_charges: Vec<Option<i32>>,
    /// declared compartment vocabulary (short codes), if the model carries one
    pub compartments: Option<Vec<String>>,
    pub rxn_ids: Vec<String>,
    pub s: StoichMatrix,
    met_lookup: HashMap<String, usize>,
}

impl MetabolicModel {
    pub fn new_empty(id: String) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn n_mets(&self) -> usize {
        self.met_ids.len()
    }

    pub fn n_rxns(&self) -> usize {
        self.rxn_ids.len()
    }

    pub fn met_index(&self, id: &str) -> Option<usize> {
        self.met_lookup.get(id).copied()
    }

    pub fn rxn_index(&self, id: &str) -> Option<usize> {
        self.rxn_ids.iter().position(|r| r == id)
    }

    /// Appends a metabolite with an empty stoichiometric row and returns its index.
    pub fn add_metabolite(
        &mut self,
        id: &str,
        formula: Option<&str>,
        charge: Option<i32>,
    ) -> Result<usize, PhAdjustError> {
        if self.met_lookup.contains_key(id) {
            return Err(PhAdjustError::InvalidTask(format!(
                "duplicate metabolite id '{}'",
                id
            )));
        }
        let index = self.s.push_zero_row();
        self.met_ids.push(id.to_string());
        self.met_formulas.push(formula.map(|f| f.to_string()));
        self.met_charges.push(charge);
        self.met_lookup.insert(id.to_string(), index);
        Ok(index)
    }

    /// Appends a reaction given as (metabolite id, coefficient) pairs.
    pub fn add_reaction(
        &mut self,
        id: &str,
        metabolites: &[(&str, f64)],
    ) -> Result<usize, PhAdjustError> {
        let mut column = BTreeMap::new();
        for (met, coefficient) in metabolites {
            let row = self.met_index(met).ok_or_else(|| {
                PhAdjustError::InvalidTask(format!(
                    "reaction '{}' refers to unknown metabolite '{}'",
                    id, met
                ))
            })?;
            *column.entry(row).or_insert(0.0) += coefficient;
        }
        // a metabolite listed on both sides may cancel out
        column.retain(|_, v| *v != 0.0);
        self.rxn_ids.push(id.to_string());
        Ok(self.s.push_column(column))
    }

    /// Checks that every per-metabolite and per-reaction array is aligned with the matrix.
    pub fn check_consistency(&self) -> Result<(), PhAdjustError> {
        let n = self.met_ids.len();
        if self.met_formulas.len() != n {
            return Err(PhAdjustError::dimension("metabolite formulas", n, self.met_formulas.len()));
        }
        if self.met_charges.len() != n {
            return Err(PhAdjustError::dimension("metabolite charges", n, self.met_charges.len()));
        }
        if self.s.nrows() != n {
            return Err(PhAdjustError::dimension("stoichiometric matrix rows", n, self.s.nrows()));
        }
        if self.s.ncols() != self.rxn_ids.len() {
            return Err(PhAdjustError::dimension(
                "stoichiometric matrix columns",
                self.rxn_ids.len(),
                self.s.ncols(),
            ));
        }
        Ok(())
    }

    /// human readable equation, e.g. `atp[c] + h2o[c] -> adp[c] + pi[c] + h[c]`
    pub fn reaction_equation(&self, rxn: usize) -> String {
        let side = |sign: f64| -> String {
            self.s
                .column(rxn)
                .iter()
                .filter(|(_, v)| **v * sign > 0.0)
                .map(|(&i, &v)| {
                    let v = v.abs();
                    if v == 1.0 {
                        self.met_ids[i].clone()
                    } else {
                        format!("{} {}", v, self.met_ids[i])
                    }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        format!("{} -> {}", side(-1.0), side(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> MetabolicModel {
        let mut model = MetabolicModel::new_empty("test".to_string());
        model.add_metabolite("atp[c]", Some("C10H12N5O13P3"), Some(-4)).unwrap();
        model.add_metabolite("h2o[c]", Some("H2O"), Some(0)).unwrap();
        model.add_metabolite("adp[c]", Some("C10H12N5O10P2"), Some(-3)).unwrap();
        model.add_metabolite("pi[c]", Some("HO4P"), Some(-2)).unwrap();
        model
            .add_reaction(
                "ATPase",
                &[("atp[c]", -1.0), ("h2o[c]", -1.0), ("adp[c]", 1.0), ("pi[c]", 1.0)],
            )
            .unwrap();
        model
    }

    #[test]
    fn test_model_building() {
        let model = small_model();
        assert_eq!(model.n_mets(), 4);
        assert_eq!(model.n_rxns(), 1);
        assert_eq!(model.s.get(0, 0), -1.0);
        assert_eq!(model.s.get(3, 0), 1.0);
        assert_eq!(model.s.nnz(), 4);
        assert!(model.check_consistency().is_ok());
        assert_eq!(
            model.reaction_equation(0),
            "atp[c] + h2o[c] -> adp[c] + pi[c]"
        );
    }

    #[test]
    fn test_duplicate_and_unknown_metabolites() {
        let mut model = small_model();
        assert!(model.add_metabolite("atp[c]", None, None).is_err());
        assert!(model.add_reaction("bad", &[("nad[c]", -1.0)]).is_err());
        assert_eq!(model.n_rxns(), 1);
    }

    #[test]
    fn test_cancelling_coefficients_leave_no_entry() {
        let mut model = small_model();
        let rxn = model
            .add_reaction("futile", &[("atp[c]", -1.0), ("adp[c]", 1.0), ("atp[c]", 1.0)])
            .unwrap();
        assert_eq!(model.s.column(rxn).len(), 1);
        assert!(!model.s.column(rxn).contains_key(&0));
        assert_eq!(model.s.get(2, rxn), 1.0);
        assert_eq!(model.s.nnz(), 5);
    }

    #[test]
    fn test_new_metabolite_gets_zero_row() {
        let mut model = small_model();
        let h = model.add_metabolite("h[c]", Some("H"), Some(1)).unwrap();
        assert_eq!(h, 4);
        assert_eq!(model.s.nrows(), 5);
        assert_eq!(model.s.get(h, 0), 0.0);
        model.s.set(h, 0, 1.0).unwrap();
        assert!(model.s.set(9, 0, 1.0).is_err());
        assert_eq!(model.s.get(h, 0), 1.0);
        let dense = model.s.to_dense();
        assert_eq!(dense.shape(), (5, 1));
        assert_eq!(dense[(4, 0)], 1.0);
    }

    #[test]
    fn test_consistency_violation() {
        let mut model = small_model();
        model.met_charges.pop();
        assert!(matches!(
            model.check_consistency(),
            Err(PhAdjustError::DimensionMismatch { .. })
        ));
    }
}
