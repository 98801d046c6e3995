//! Rewrites the proton coefficient of a classified reaction so that its hydrogen balance closes.
use crate::MetabolicModel::model::MetabolicModel;
use crate::Rebalancing::imbalance::BALANCE_TOLERANCE;
use crate::Rebalancing::proton_pool::ProtonPool;
use crate::Rebalancing::topology::Classification;
use crate::errors::PhAdjustError;
use log::debug;

/// new coefficient of metabolite `met` in reaction `rxn`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoichEdit {
    pub rxn: usize,
    pub met: usize,
    pub value: f64,
}

/// Plans the edit of one reaction. `None` for skipped reactions and reactions whose hydrogen
/// imbalance is already zero.
pub fn plan_balance(
    model: &MetabolicModel,
    rxn: usize,
    classification: &Classification,
    hydrogen_imbalance: f64,
    pool: &ProtonPool,
) -> Result<Option<StoichEdit>, PhAdjustError> {
    let Some(target) = classification.target else {
        return Ok(None);
    };
    if hydrogen_imbalance.abs() <= BALANCE_TOLERANCE {
        return Ok(None);
    }
    let met = pool
        .proton_of(target)
        .ok_or_else(|| PhAdjustError::dimension("proton pool", target + 1, pool.len()))?;
    let current = model.s.get(met, rxn);
    let value = current - hydrogen_imbalance;
    debug!(
        "{} ({}): {} coefficient {} -> {}",
        model.rxn_ids[rxn], classification.topology, model.met_ids[met], current, value
    );
    Ok(Some(StoichEdit { rxn, met, value }))
}

pub fn apply_stoich_edits(
    model: &mut MetabolicModel,
    edits: &[StoichEdit],
) -> Result<(), PhAdjustError> {
    for edit in edits {
        model.s.set(edit.met, edit.rxn, edit.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rebalancing::topology::ReactionTopology;
    use approx::assert_relative_eq;

    fn model() -> MetabolicModel {
        let mut model = MetabolicModel::new_empty("m".to_string());
        model.add_metabolite("atp[c]", Some("C10H12N5O13P3"), Some(-4)).unwrap();
        model.add_metabolite("h2o[c]", Some("H2O"), Some(0)).unwrap();
        model.add_metabolite("adp[c]", Some("C10H12N5O10P2"), Some(-3)).unwrap();
        model.add_metabolite("pi[c]", Some("HO4P"), Some(-2)).unwrap();
        model.add_metabolite("h[c]", Some("H"), Some(1)).unwrap();
        model
            .add_reaction(
                "ATPase",
                &[("atp[c]", -1.0), ("h2o[c]", -1.0), ("adp[c]", 1.0), ("pi[c]", 1.0)],
            )
            .unwrap();
        model
    }

    fn classified(target: Option<usize>) -> Classification {
        Classification {
            topology: ReactionTopology::SameCompartment,
            target,
        }
    }

    #[test]
    fn test_creates_proton_entry() {
        let mut model = model();
        let pool = ProtonPool {
            by_compartment: vec![4],
        };
        let edit = plan_balance(&model, 0, &classified(Some(0)), -1.0, &pool)
            .unwrap()
            .unwrap();
        assert_eq!(edit.met, 4);
        assert_relative_eq!(edit.value, 1.0);
        apply_stoich_edits(&mut model, &[edit]).unwrap();
        assert_relative_eq!(model.s.get(4, 0), 1.0);
    }

    #[test]
    fn test_existing_entry_is_shifted() {
        let mut model = model();
        model.s.set(4, 0, 2.0).unwrap();
        let pool = ProtonPool {
            by_compartment: vec![4],
        };
        let edit = plan_balance(&model, 0, &classified(Some(0)), 0.5, &pool)
            .unwrap()
            .unwrap();
        assert_relative_eq!(edit.value, 1.5);
    }

    #[test]
    fn test_skip_and_no_op() {
        let model = model();
        let pool = ProtonPool {
            by_compartment: vec![4],
        };
        assert!(plan_balance(&model, 0, &classified(None), -1.0, &pool).unwrap().is_none());
        assert!(plan_balance(&model, 0, &classified(Some(0)), 0.0, &pool).unwrap().is_none());
        assert!(plan_balance(&model, 0, &classified(Some(3)), 1.0, &pool).is_err());
    }
}
