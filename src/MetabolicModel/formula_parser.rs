//! # Formula parser
//!
//! ## Aim
//! Turns chemical formula strings like `C10H12N5O13P3` or `Fe(CN)6` into [`ElementVector`]s over
//! the closed element vocabulary of the crate.
//!
//! ## Main Data Structures and Logic
//! - `FormulaParser` trait: the contract the rest of the pipeline depends on (formula in, element
//!   vector out). Anything able to honour it (e.g. a parser backed by a chemistry library) can be
//!   plugged into the pass.
//! - `VocabularyParser`: default implementation. Element symbols are one uppercase letter
//!   followed by lowercase letters, with the pseudo-element `FULLR` matched first. Brackets may be
//!   nested and carry a multiplier after the closing bracket.
//! - `build_element_matrix()`: parses every formula of a model. A formula that cannot be parsed,
//!   or that uses an element outside the vocabulary, becomes an all-zero row. This is not an
//!   error: the adjuster later keeps such formulas as they are.
use crate::MetabolicModel::elements::{ELEMENTS, ElementMatrix, ElementVector, N_ELEMENTS, element_index};
use crate::MetabolicModel::model::MetabolicModel;
use log::warn;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    #[error("Unknown element '{element}' in formula '{formula}'")]
    UnknownElement { element: String, formula: String },
    #[error("Malformed formula '{formula}' at position {position}")]
    Malformed { formula: String, position: usize },
}

/// formula string -> element vector contract
pub trait FormulaParser {
    fn parse(&self, formula: &str) -> Result<ElementVector, FormulaError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VocabularyParser;

impl VocabularyParser {
    pub fn new() -> Self {
        VocabularyParser
    }
}

// reads digits starting at `pos`, returns (number, position after the digits)
fn read_count(chars: &[char], mut pos: usize) -> (Option<i64>, usize) {
    let start = pos;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    if start == pos {
        return (None, pos);
    }
    let digits: String = chars[start..pos].iter().collect();
    (digits.parse().ok(), pos)
}

impl FormulaParser for VocabularyParser {
    fn parse(&self, formula: &str) -> Result<ElementVector, FormulaError> {
        let chars: Vec<char> = formula.chars().filter(|c| !c.is_whitespace()).collect();
        let malformed = |position: usize| FormulaError::Malformed {
            formula: formula.to_string(),
            position,
        };
        // one accumulator per open bracket level
        let mut stack: Vec<[i64; N_ELEMENTS]> = vec![[0; N_ELEMENTS]];
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '(' || c == '[' {
                stack.push([0; N_ELEMENTS]);
                i += 1;
            } else if c == ')' || c == ']' {
                if stack.len() < 2 {
                    return Err(malformed(i));
                }
                let inner = stack.pop().ok_or_else(|| malformed(i))?;
                let (multiplier, next) = read_count(&chars, i + 1);
                let multiplier = multiplier.unwrap_or(1);
                let outer = stack.last_mut().ok_or_else(|| malformed(i))?;
                for (o, n) in outer.iter_mut().zip(inner.iter()) {
                    *o += n * multiplier;
                }
                i = next;
            } else if c.is_ascii_uppercase() {
                let rest: String = chars[i..].iter().collect();
                let symbol = if rest.starts_with("FULLR") {
                    "FULLR".to_string()
                } else {
                    let mut end = i + 1;
                    while end < chars.len() && chars[end].is_ascii_lowercase() {
                        end += 1;
                    }
                    chars[i..end].iter().collect()
                };
                let index = element_index(&symbol).ok_or_else(|| FormulaError::UnknownElement {
                    element: symbol.clone(),
                    formula: formula.to_string(),
                })?;
                let (count, next) = read_count(&chars, i + symbol.chars().count());
                let current = stack.last_mut().ok_or_else(|| malformed(i))?;
                current[index] += count.unwrap_or(1);
                i = next;
            } else {
                return Err(malformed(i));
            }
        }
        if stack.len() != 1 {
            return Err(malformed(chars.len()));
        }
        Ok(ElementVector::from_counts(stack[0]))
    }
}

/// Parses the formulas of all metabolites of the model.
///
/// Returns the element matrix together with the indices of metabolites whose formula is present
/// but could not be expressed in the vocabulary (their rows are all zero). Metabolites without a
/// formula get a zero row too but are not listed.
pub fn build_element_matrix<P: FormulaParser + ?Sized>(
    parser: &P,
    model: &MetabolicModel,
) -> (ElementMatrix, Vec<usize>) {
    let mut matrix = ElementMatrix::default();
    let mut unparsed = Vec::new();
    for (i, formula) in model.met_formulas.iter().enumerate() {
        let row = match formula {
            Some(formula) if !formula.trim().is_empty() => match parser.parse(formula) {
                Ok(v) => v,
                Err(e) => {
                    warn!("metabolite '{}': {}", model.met_ids[i], e);
                    unparsed.push(i);
                    ElementVector::zeros()
                }
            },
            _ => ElementVector::zeros(),
        };
        matrix.push(row);
    }
    (matrix, unparsed)
}

/// symbols of the vocabulary with a positive count, handy for diagnostics
pub fn present_elements(v: &ElementVector) -> Vec<&'static str> {
    ELEMENTS
        .iter()
        .zip(v.counts().iter())
        .filter(|(_, c)| **c > 0)
        .map(|(e, _)| e.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(v: &ElementVector, symbol: &str) -> i64 {
        v.get(symbol).unwrap()
    }

    #[test]
    fn test_parse_formula() {
        let parser = VocabularyParser::new();
        let atp = parser.parse("C10H12N5O13P3").unwrap();
        assert_eq!(count(&atp, "C"), 10);
        assert_eq!(count(&atp, "H"), 12);
        assert_eq!(count(&atp, "N"), 5);
        assert_eq!(count(&atp, "O"), 13);
        assert_eq!(count(&atp, "P"), 3);

        let water = parser.parse("H2O").unwrap();
        assert_eq!(count(&water, "H"), 2);
        assert_eq!(count(&water, "O"), 1);

        let salt = parser.parse("NaCl").unwrap();
        assert_eq!(present_elements(&salt), vec!["Cl", "Na"]);
    }

    #[test]
    fn test_brackets() {
        let parser = VocabularyParser::new();
        let v = parser.parse("Na(NO3)2").unwrap();
        assert_eq!(count(&v, "Na"), 1);
        assert_eq!(count(&v, "N"), 2);
        assert_eq!(count(&v, "O"), 6);

        let v = parser.parse("K4(Fe(CN)6)").unwrap();
        assert_eq!(count(&v, "K"), 4);
        assert_eq!(count(&v, "Fe"), 1);
        assert_eq!(count(&v, "C"), 6);
        assert_eq!(count(&v, "N"), 6);
    }

    #[test]
    fn test_pseudo_elements() {
        let parser = VocabularyParser::new();
        let v = parser.parse("C5H7O4FULLR2").unwrap();
        assert_eq!(count(&v, "FULLR"), 2);
        assert_eq!(count(&v, "R"), 0);
        let v = parser.parse("C2H3OR").unwrap();
        assert_eq!(count(&v, "R"), 1);
        let v = parser.parse("CoX").unwrap();
        assert_eq!(count(&v, "Co"), 1);
        assert_eq!(count(&v, "X"), 1);
    }

    #[test]
    fn test_unknown_element() {
        let parser = VocabularyParser::new();
        let err = parser.parse("C3H5SeO2").unwrap_err();
        assert_eq!(
            err,
            FormulaError::UnknownElement {
                element: "Se".to_string(),
                formula: "C3H5SeO2".to_string()
            }
        );
    }

    #[test]
    fn test_malformed() {
        let parser = VocabularyParser::new();
        assert!(matches!(
            parser.parse("C6H12O6)"),
            Err(FormulaError::Malformed { .. })
        ));
        assert!(matches!(
            parser.parse("(C6H12O6"),
            Err(FormulaError::Malformed { .. })
        ));
        assert!(matches!(
            parser.parse("c6h12"),
            Err(FormulaError::Malformed { .. })
        ));
    }

    #[test]
    fn test_formula_round_trip_preserves_mass() {
        let parser = VocabularyParser::new();
        for formula in ["C10H12N5O13P3", "C21H26N7O17P3", "FeS2", "MgCl2", "C63H88CoN14O14P"] {
            let v = parser.parse(formula).unwrap();
            let back = parser.parse(&v.to_formula()).unwrap();
            assert_eq!(v, back, "round trip of {}", formula);
        }
    }

    #[test]
    fn test_build_element_matrix() {
        let mut model = MetabolicModel::new_empty("m".to_string());
        model.add_metabolite("glc[c]", Some("C6H12O6"), Some(0)).unwrap();
        model.add_metabolite("sel[c]", Some("C3H7NO2Se"), Some(0)).unwrap();
        model.add_metabolite("prot[c]", None, None).unwrap();
        let (matrix, unparsed) = build_element_matrix(&VocabularyParser::new(), &model);
        assert_eq!(matrix.len(), 3);
        assert_eq!(unparsed, vec![1]);
        assert!(matrix.rows[1].is_blank());
        assert!(matrix.rows[2].is_blank());
        assert_eq!(matrix.rows[0].get("C"), Some(6));
    }
}
