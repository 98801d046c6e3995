/// pKa lookup by base metabolite id, pKa rows aligned with a model, and the protonation ordinal
/// of a metabolite at a given pH.
/// # Examples
/// ```
/// use PhBalance::Protonation::pka::PKaTable;
/// let table = PKaTable::from_rows(vec![vec![4.0, 12.3, 6.5]]);
/// assert_eq!(table.ordinal(0, 7.0), 2);
/// assert_eq!(table.ordinal(0, 5.0), 1);
/// ```
pub mod pka;
/// Reference and target pH per compartment.
pub mod ph;
/// Translates the proton delta of every metabolite into a new formula and charge.
pub mod adjuster;
