//! # Proton pool locator
//!
//! Every compartment needs one metabolite standing for the free proton: it is the sink that
//! absorbs the hydrogen imbalance of reactions in that compartment. Models spell it in many
//! ways (`h[c]`, `H+_c`, `h(+)[m]`, `proton[e]`), so the base name of every metabolite is
//! normalized (lowercase, brackets, parentheses and whitespace dropped) and compared with the
//! `PROTON_SPELLINGS` table.
//!
//! Locating is split in two steps so that ambiguity is detected before anything is written:
//! `locate_proton_candidates()` only reads the model, `complete_proton_pool()` appends a proton
//! metabolite (formula `H`, charge +1, empty stoichiometric row) for every compartment that has
//! none.
use crate::MetabolicModel::compartments::{CompartmentMap, SuffixParser};
use crate::MetabolicModel::elements::{ElementMatrix, ElementVector};
use crate::MetabolicModel::model::MetabolicModel;
use crate::errors::PhAdjustError;
use log::{info, warn};

/// normalized spellings of the free proton
pub const PROTON_SPELLINGS: [&str; 5] = ["h", "h+", "hplus", "proton", "hydron"];

/// base name used for synthesized proton metabolites
pub const PROTON_BASE_ID: &str = "h";

pub fn normalize_proton_name(base: &str) -> String {
    base.chars()
        .filter(|c| !matches!(c, '(' | ')' | '[' | ']') && !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

pub fn is_proton_name(base: &str, extra_spellings: &[String]) -> bool {
    let name = normalize_proton_name(base);
    PROTON_SPELLINGS.contains(&name.as_str())
        || extra_spellings
            .iter()
            .any(|s| normalize_proton_name(s) == name)
}

/// proton metabolite index of every compartment
#[derive(Debug, Clone, PartialEq)]
pub struct ProtonPool {
    pub by_compartment: Vec<usize>,
}

impl ProtonPool {
    pub fn len(&self) -> usize {
        self.by_compartment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_compartment.is_empty()
    }

    pub fn proton_of(&self, compartment: usize) -> Option<usize> {
        self.by_compartment.get(compartment).copied()
    }
}

/// Finds the existing proton metabolite of every compartment, `None` where there is none.
pub fn locate_proton_candidates(
    model: &MetabolicModel,
    compartments: &CompartmentMap,
    extra_spellings: &[String],
) -> Result<Vec<Option<usize>>, PhAdjustError> {
    let parser = SuffixParser::new(compartments.convention)?;
    let mut found: Vec<Option<usize>> = vec![None; compartments.len()];
    for (met, id) in model.met_ids.iter().enumerate() {
        let Some((base, _)) = parser.split(id) else {
            continue;
        };
        if !is_proton_name(base, extra_spellings) {
            continue;
        }
        let comp = compartments.met_compartment[met];
        if let Some(previous) = found[comp] {
            return Err(PhAdjustError::AmbiguousProton(format!(
                "'{}' and '{}' both look like the proton of compartment '{}'",
                model.met_ids[previous], id, compartments.vocabulary[comp]
            )));
        }
        found[comp] = Some(met);
    }
    Ok(found)
}

/// Fills the gaps left by [`locate_proton_candidates`] with new proton metabolites.
///
/// Returns the complete pool and the ids of the synthesized metabolites. The compartment map and
/// the element matrix are extended together with the model.
pub fn complete_proton_pool(
    model: &mut MetabolicModel,
    compartments: &mut CompartmentMap,
    elements: &mut ElementMatrix,
    found: Vec<Option<usize>>,
) -> Result<(ProtonPool, Vec<String>), PhAdjustError> {
    if found.len() != compartments.len() {
        return Err(PhAdjustError::dimension(
            "proton candidates",
            compartments.len(),
            found.len(),
        ));
    }
    let mut by_compartment = Vec::with_capacity(found.len());
    let mut synthesized = Vec::new();
    for (comp, candidate) in found.into_iter().enumerate() {
        let met = match candidate {
            Some(met) => met,
            None => {
                let id = compartments
                    .convention
                    .tag(PROTON_BASE_ID, &compartments.vocabulary[comp]);
                let met = model.add_metabolite(&id, Some("H"), Some(1))?;
                compartments.push_metabolite(comp);
                elements.push(ElementVector::proton());
                warn!("no proton in compartment '{}', added '{}'", compartments.vocabulary[comp], id);
                synthesized.push(id);
                met
            }
        };
        by_compartment.push(met);
    }
    info!("proton pool: {} compartments, {} synthesized", by_compartment.len(), synthesized.len());
    Ok((ProtonPool { by_compartment }, synthesized))
}
