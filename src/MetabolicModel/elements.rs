//! Closed element vocabulary and fixed-order element count vectors.
//!
//! Every formula edit in the crate goes through [`ElementVector`]: formulas are parsed into a
//! vector, the vector is edited, and the vector is written back to a formula string.
use nalgebra::DMatrix;
use std::fmt;

// Define a struct to hold element data
#[derive(Debug, Clone, Copy)]
pub struct Element {
    pub name: &'static str,
    /// pseudo-elements (X, R, Y, FULLR) mark generic groups and residues in curated models
    pub pseudo: bool,
}

pub const N_ELEMENTS: usize = 25;
/// position of hydrogen in the vocabulary
pub const HYDROGEN: usize = 0;

// Order matters: it is the serialization order of formulas.
pub const ELEMENTS: [Element; N_ELEMENTS] = [
    Element { name: "H", pseudo: false },
    Element { name: "C", pseudo: false },
    Element { name: "O", pseudo: false },
    Element { name: "P", pseudo: false },
    Element { name: "S", pseudo: false },
    Element { name: "N", pseudo: false },
    Element { name: "Mg", pseudo: false },
    Element { name: "X", pseudo: true },
    Element { name: "Fe", pseudo: false },
    Element { name: "Zn", pseudo: false },
    Element { name: "Co", pseudo: false },
    Element { name: "R", pseudo: true },
    Element { name: "K", pseudo: false },
    Element { name: "Cl", pseudo: false },
    Element { name: "Cd", pseudo: false },
    Element { name: "Na", pseudo: false },
    Element { name: "Ni", pseudo: false },
    Element { name: "Mn", pseudo: false },
    Element { name: "Cu", pseudo: false },
    Element { name: "Ca", pseudo: false },
    Element { name: "Y", pseudo: true },
    Element { name: "I", pseudo: false },
    Element { name: "F", pseudo: false },
    Element { name: "Ag", pseudo: false },
    Element { name: "FULLR", pseudo: true },
];

/// index of an element symbol in the vocabulary (case sensitive, as in formulas)
pub fn element_index(symbol: &str) -> Option<usize> {
    ELEMENTS.iter().position(|e| e.name == symbol)
}

pub fn element_symbols() -> Vec<&'static str> {
    ELEMENTS.iter().map(|e| e.name).collect()
}

/// Atom counts of one metabolite, one slot per vocabulary element.
///
/// Counts are signed so that an adjustment can be checked before it is accepted; a valid
/// vector never holds negative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ElementVector([i64; N_ELEMENTS]);

impl ElementVector {
    pub fn zeros() -> Self {
        ElementVector([0; N_ELEMENTS])
    }

    pub fn from_counts(counts: [i64; N_ELEMENTS]) -> Self {
        ElementVector(counts)
    }

    /// vector for the free proton: one hydrogen, nothing else
    pub fn proton() -> Self {
        let mut v = Self::zeros();
        v.0[HYDROGEN] = 1;
        v
    }

    pub fn counts(&self) -> &[i64; N_ELEMENTS] {
        &self.0
    }

    pub fn get(&self, symbol: &str) -> Option<i64> {
        element_index(symbol).map(|i| self.0[i])
    }

    pub fn add(&mut self, index: usize, count: i64) {
        self.0[index] += count;
    }

    pub fn hydrogens(&self) -> i64 {
        self.0[HYDROGEN]
    }

    /// copy with the hydrogen count shifted by `delta`
    pub fn with_hydrogen_delta(&self, delta: i64) -> Self {
        let mut v = *self;
        v.0[HYDROGEN] += delta;
        v
    }

    /// true when no element has a positive count, i.e. no formula can be written from it
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&c| c <= 0)
    }

    /// true if any element other than hydrogen is nonzero
    pub fn has_non_hydrogen(&self) -> bool {
        self.0
            .iter()
            .enumerate()
            .any(|(i, &c)| i != HYDROGEN && c != 0)
    }

    /// Writes the vector back to a formula: symbols in vocabulary order, each followed by its
    /// count; zero and negative counts are skipped.
    ///
    /// A count of 1 is written as the bare symbol (`HO4P`, not `H1O4P1`), the way formulas appear
    /// in metabolic models. Parsing the result gives back the same vector.
    pub fn to_formula(&self) -> String {
        let mut formula = String::new();
        for (element, &count) in ELEMENTS.iter().zip(self.0.iter()) {
            if count <= 0 {
                continue;
            }
            formula.push_str(element.name);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        }
        formula
    }
}

impl fmt::Display for ElementVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_formula())
    }
}

/// Element vectors of all metabolites, aligned with the metabolite axis of the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementMatrix {
    pub rows: Vec<ElementVector>,
}

impl ElementMatrix {
    pub fn new(rows: Vec<ElementVector>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: ElementVector) {
        self.rows.push(row);
    }

    /// dense (metabolites × elements) matrix of atom counts
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.rows.len(), N_ELEMENTS, |i, j| self.rows[i].0[j] as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_order() {
        assert_eq!(ELEMENTS.len(), N_ELEMENTS);
        assert_eq!(element_index("H"), Some(HYDROGEN));
        assert_eq!(element_index("Mg"), Some(6));
        assert_eq!(element_index("FULLR"), Some(24));
        assert_eq!(element_index("Se"), None);
        assert_eq!(element_symbols()[13], "Cl");
    }

    #[test]
    fn test_to_formula() {
        let mut v = ElementVector::zeros();
        v.add(element_index("C").unwrap(), 10);
        v.add(HYDROGEN, 12);
        v.add(element_index("N").unwrap(), 5);
        v.add(element_index("O").unwrap(), 13);
        v.add(element_index("P").unwrap(), 3);
        assert_eq!(v.to_formula(), "H12C10O13P3N5");
        assert_eq!(ElementVector::proton().to_formula(), "H");
    }

    #[test]
    fn test_unit_counts_are_written_bare() {
        use crate::MetabolicModel::formula_parser::{FormulaParser, VocabularyParser};
        let v = VocabularyParser::new().parse("HO4P").unwrap();
        assert_eq!(v.to_formula(), "HO4P");
        assert_eq!(VocabularyParser::new().parse(&v.to_formula()).unwrap(), v);
    }

    #[test]
    fn test_negative_and_zero_counts_are_skipped() {
        let mut v = ElementVector::zeros();
        v.add(HYDROGEN, -1);
        v.add(element_index("O").unwrap(), 1);
        assert_eq!(v.to_formula(), "O");
        assert!(!v.is_blank());
        let blank = ElementVector::zeros().with_hydrogen_delta(-2);
        assert!(blank.is_blank());
        assert_eq!(blank.to_formula(), "");
    }

    #[test]
    fn test_non_hydrogen_flag() {
        let v = ElementVector::proton();
        assert!(!v.has_non_hydrogen());
        let mut w = ElementVector::zeros();
        w.add(element_index("S").unwrap(), -1);
        assert!(w.has_non_hydrogen());
    }

    #[test]
    fn test_element_dmatrix() {
        let m = ElementMatrix::new(vec![ElementVector::proton(), ElementVector::zeros()]);
        let d = m.to_dmatrix();
        assert_eq!(d.nrows(), 2);
        assert_eq!(d.ncols(), N_ELEMENTS);
        assert_eq!(d[(0, HYDROGEN)], 1.0);
        assert_eq!(d.row(1).sum(), 0.0);
    }
}
