/// Sparse stoichiometric model: metabolite ids, formulas and charges aligned with the rows of the
/// stoichiometric matrix, reaction ids aligned with its columns.
pub mod model;
/// Fixed element vocabulary and integer element-count vectors. Formulas are written back from
/// vectors in vocabulary order, counts of one are omitted (`H11C10O13P3N5`).
pub mod elements;
/// Chemical formula parsing into element vectors. Parsing is a pluggable primitive
/// (`FormulaParser`); the default `VocabularyParser` handles nested groups like `Na(NO3)2`.
/// # Examples
/// ```
/// use PhBalance::MetabolicModel::formula_parser::{FormulaParser, VocabularyParser};
/// let v = VocabularyParser::new().parse("C10H12N5O13P3").unwrap();
/// assert_eq!(v.hydrogens(), 12);
/// assert_eq!(v.to_formula(), "H12C10O13P3N5");
/// ```
pub mod formula_parser;
/// Compartment suffixes of metabolite ids (`atp[c]`, `glc__D_e`) and the compartment vocabulary
/// of a model.
pub mod compartments;
