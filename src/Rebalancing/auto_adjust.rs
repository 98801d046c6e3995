//! # Automatic pH adjustment
//!
//! ## Aim
//! One pass that brings a metabolic model from the pH its formulas are written for to a target
//! pH per compartment, and then restores the hydrogen balance of every reaction broken by the
//! change.
//!
//! ## Main Data Structures and Logic
//! - `PhAdjuster`: the coordinator. Holds the formula parser and the imbalance checker behind
//!   trait objects so either can be replaced.
//! - `AdjustInputs`: pKa table, pH vectors and direction overrides aligned with the model.
//! - `PhAdjuster::run()`:
//!   1. validates the model, resolves compartments and checks every input dimension;
//!   2. computes formula/charge edits and locates proton candidates without touching the model;
//!   3. applies the edits and completes the proton pool (the only appends to the model);
//!   4. asks the checker for the imbalance of every reaction, classifies each reaction and plans
//!      its stoichiometric edit;
//!   5. applies the stoichiometric edits and returns an `AdjustmentReport`.
//!
//!   Any structural error is raised in steps 1-2, before the model is written. An error of the
//!   checker in step 4 restores the model from a snapshot taken before step 3.
//! - `PhTask`: a model plus the pKa library and settings it should be adjusted with, as read from a
//!   task file.
use crate::MetabolicModel::compartments::{CompartmentMap, resolve_compartments};
use crate::MetabolicModel::formula_parser::{FormulaParser, VocabularyParser, build_element_matrix};
use crate::MetabolicModel::elements::ElementMatrix;
use crate::MetabolicModel::model::MetabolicModel;
use crate::Protonation::adjuster::{
    FormulaEdit, apply_formula_edits, compute_formula_edits, proton_deltas,
};
use crate::Protonation::ph::PhAssignment;
use crate::Protonation::pka::{PKaLibrary, PKaTable};
use crate::Rebalancing::balancer::{StoichEdit, apply_stoich_edits, plan_balance};
use crate::Rebalancing::imbalance::{ImbalanceChecker, StoichiometricChecker};
use crate::Rebalancing::proton_pool::{complete_proton_pool, locate_proton_candidates};
use crate::Rebalancing::topology::{
    Classification, ReactionContext, ReactionTopology, classify_reaction,
};
use crate::errors::PhAdjustError;
use crate::settings::AdjustSettings;
use log::{info, warn};
use prettytable::{Table, row};

/// Per-pass inputs aligned with the model.
#[derive(Debug, Clone)]
pub struct AdjustInputs {
    /// one row per metabolite
    pub pka: PKaTable,
    /// one value per compartment of the resolved vocabulary
    pub ph: PhAssignment,
    /// one flag per reaction; `None` means no reaction is overridden
    pub direction_override: Option<Vec<bool>>,
}

/// Formula/charge change of one metabolite.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaboliteChange {
    pub id: String,
    pub delta: i64,
    pub old_formula: Option<String>,
    pub new_formula: String,
    pub old_charge: Option<i32>,
    pub new_charge: Option<i32>,
    pub fallback: bool,
}

/// Everything a pass did besides mutating the model.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentReport {
    /// unanalyzable reactions, left untouched; exchange reactions are not listed
    pub unresolved_reactions: Vec<String>,
    pub changed_metabolites: Vec<MetaboliteChange>,
    /// metabolites whose formula could not be parsed into the element vocabulary
    pub unparsed_formulas: Vec<String>,
    pub synthesized_protons: Vec<String>,
    /// set when the model declared no compartments and the resolved ones were written into it
    pub adopted_compartments: Option<Vec<String>>,
    /// one per reaction, in reaction order
    pub classifications: Vec<Classification>,
    /// reactions whose proton coefficient was rewritten
    pub balanced_reactions: Vec<String>,
}

impl AdjustmentReport {
    /// ids of metabolites whose original formula was kept
    pub fn fallback_formulas(&self) -> Vec<&str> {
        self.changed_metabolites
            .iter()
            .filter(|c| c.fallback)
            .map(|c| c.id.as_str())
            .collect()
    }

    pub fn topology_counts(&self) -> Vec<(ReactionTopology, usize)> {
        ReactionTopology::ALL
            .iter()
            .map(|t| {
                (
                    *t,
                    self.classifications
                        .iter()
                        .filter(|c| c.topology == *t)
                        .count(),
                )
            })
            .collect()
    }

    pub fn pretty_print(&self) {
        println!("\n=== pH ADJUSTMENT REPORT ===");
        if let Some(adopted) = &self.adopted_compartments {
            println!("Compartments adopted from metabolite ids: {}", adopted.join(", "));
        }

        let mut table = Table::new();
        table.add_row(row!["Metabolite", "Δ H", "Formula", "Charge", "Note"]);
        for c in &self.changed_metabolites {
            let charge = match (c.old_charge, c.new_charge) {
                (Some(old), Some(new)) => format!("{} -> {}", old, new),
                _ => "-".to_string(),
            };
            let note = if c.fallback { "formula kept" } else { "" };
            table.add_row(row![
                c.id,
                c.delta,
                format!("{} -> {}", c.old_formula.as_deref().unwrap_or("-"), c.new_formula),
                charge,
                note
            ]);
        }
        println!("\nMetabolites:");
        table.printstd();

        let mut table = Table::new();
        table.add_row(row!["Topology", "Reactions"]);
        for (topology, count) in self.topology_counts() {
            table.add_row(row![topology, count]);
        }
        println!("\nReactions:");
        table.printstd();
        println!("Balanced: {}", self.balanced_reactions.len());

        if !self.synthesized_protons.is_empty() {
            println!("\nSynthesized protons: {}", self.synthesized_protons.join(", "));
        }
        if !self.unparsed_formulas.is_empty() {
            println!("\nUnparsed formulas: {}", self.unparsed_formulas.join(", "));
        }
        if !self.unresolved_reactions.is_empty() {
            println!("\nUnresolved reactions:");
            for id in &self.unresolved_reactions {
                println!("  {}", id);
            }
        }
    }
}

pub struct PhAdjuster {
    parser: Box<dyn FormulaParser>,
    checker: Box<dyn ImbalanceChecker>,
    proton_spellings: Vec<String>,
}

impl Default for PhAdjuster {
    fn default() -> Self {
        Self::new()
    }
}

impl PhAdjuster {
    pub fn new() -> Self {
        Self {
            parser: Box::new(VocabularyParser::new()),
            checker: Box::new(StoichiometricChecker),
            proton_spellings: Vec::new(),
        }
    }

    pub fn with_parser(mut self, parser: Box<dyn FormulaParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_checker(mut self, checker: Box<dyn ImbalanceChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// additional spellings recognized as the free proton
    pub fn with_proton_spellings(mut self, spellings: Vec<String>) -> Self {
        self.proton_spellings = spellings;
        self
    }

    fn validate(
        model: &MetabolicModel,
        compartments: &CompartmentMap,
        inputs: &AdjustInputs,
    ) -> Result<(), PhAdjustError> {
        if inputs.pka.len() != model.n_mets() {
            return Err(PhAdjustError::dimension(
                "pKa table rows",
                model.n_mets(),
                inputs.pka.len(),
            ));
        }
        inputs.ph.check_len(compartments.len())?;
        if let Some(flags) = &inputs.direction_override {
            if flags.len() != model.n_rxns() {
                return Err(PhAdjustError::dimension(
                    "direction override vector",
                    model.n_rxns(),
                    flags.len(),
                ));
            }
        }
        Ok(())
    }

    /// Adjusts `model` in place. On error the model is left as it was.
    pub fn run(
        &self,
        model: &mut MetabolicModel,
        inputs: &AdjustInputs,
    ) -> Result<AdjustmentReport, PhAdjustError> {
        model.check_consistency()?;
        let compartments = resolve_compartments(&model.met_ids, model.compartments.as_deref())?;
        self.run_resolved(model, compartments, inputs)
    }

    /// `run` for a model already checked for consistency, with its compartments resolved.
    fn run_resolved(
        &self,
        model: &mut MetabolicModel,
        mut compartments: CompartmentMap,
        inputs: &AdjustInputs,
    ) -> Result<AdjustmentReport, PhAdjustError> {
        Self::validate(model, &compartments, inputs)?;
        info!(
            "pH adjustment of '{}': {} metabolites, {} reactions, {} compartments",
            model.id.as_deref().unwrap_or("model"),
            model.n_mets(),
            model.n_rxns(),
            compartments.len()
        );

        let (elements, unparsed) = build_element_matrix(self.parser.as_ref(), model);
        let deltas = proton_deltas(&inputs.pka, &inputs.ph, &compartments);
        let edits = compute_formula_edits(model, &elements, &deltas)?;
        let found = locate_proton_candidates(model, &compartments, &self.proton_spellings)?;

        // nothing above wrote to the model; the checker may still fail after the writes start
        let snapshot = model.clone();
        match self.rewrite(model, &mut compartments, elements, &edits, found, inputs) {
            Ok(mut report) => {
                report.unparsed_formulas =
                    unparsed.iter().map(|&m| model.met_ids[m].clone()).collect();
                Ok(report)
            }
            Err(e) => {
                warn!("pH adjustment failed, model restored: {}", e);
                *model = snapshot;
                Err(e)
            }
        }
    }

    fn rewrite(
        &self,
        model: &mut MetabolicModel,
        compartments: &mut CompartmentMap,
        mut elements: ElementMatrix,
        edits: &[FormulaEdit],
        found: Vec<Option<usize>>,
        inputs: &AdjustInputs,
    ) -> Result<AdjustmentReport, PhAdjustError> {
        let adopted_compartments = if compartments.adopted {
            model.compartments = Some(compartments.vocabulary.clone());
            Some(compartments.vocabulary.clone())
        } else {
            None
        };
        let changed_metabolites: Vec<MetaboliteChange> = edits
            .iter()
            .map(|edit| MetaboliteChange {
                id: model.met_ids[edit.met].clone(),
                delta: edit.delta,
                old_formula: model.met_formulas[edit.met].clone(),
                new_formula: edit.formula.clone(),
                old_charge: model.met_charges[edit.met],
                new_charge: edit.charge,
                fallback: edit.fallback,
            })
            .collect();
        apply_formula_edits(model, &mut elements, edits);
        info!("{} metabolites changed protonation state", edits.len());
        let (pool, synthesized_protons) =
            complete_proton_pool(model, compartments, &mut elements, found)?;

        let imbalance = self.checker.check(model, &elements)?;
        imbalance.check_len(model.n_rxns())?;

        let mut classifications = Vec::with_capacity(model.n_rxns());
        let mut unresolved_reactions = Vec::new();
        let mut stoich_edits: Vec<StoichEdit> = Vec::new();
        for rxn in 0..model.n_rxns() {
            let column = model.s.column(rxn);
            let missing_formula = column.keys().any(|&met| {
                model.met_formulas[met]
                    .as_deref()
                    .is_none_or(|f| f.trim().is_empty())
            });
            let classification = classify_reaction(&ReactionContext {
                column,
                met_compartment: &compartments.met_compartment,
                complex_imbalance: imbalance.is_complex(rxn),
                missing_formula,
                direction_override: inputs
                    .direction_override
                    .as_ref()
                    .is_some_and(|flags| flags[rxn]),
                target_ph: &inputs.ph.target,
            });
            if classification.topology == ReactionTopology::Unanalyzable {
                warn!(
                    "reaction '{}' cannot be rebalanced: {}",
                    model.rxn_ids[rxn],
                    model.reaction_equation(rxn)
                );
                unresolved_reactions.push(model.rxn_ids[rxn].clone());
            }
            if let Some(edit) =
                plan_balance(model, rxn, &classification, imbalance.hydrogen(rxn), &pool)?
            {
                stoich_edits.push(edit);
            }
            classifications.push(classification);
        }
        apply_stoich_edits(model, &stoich_edits)?;
        let balanced_reactions: Vec<String> = stoich_edits
            .iter()
            .map(|e| model.rxn_ids[e.rxn].clone())
            .collect();
        info!(
            "{} reactions rebalanced, {} unresolved",
            balanced_reactions.len(),
            unresolved_reactions.len()
        );

        Ok(AdjustmentReport {
            unresolved_reactions,
            changed_metabolites,
            unparsed_formulas: Vec::new(),
            synthesized_protons,
            adopted_compartments,
            classifications,
            balanced_reactions,
        })
    }
}

/// A model together with everything needed to adjust it.
#[derive(Debug, Clone, Default)]
pub struct PhTask {
    pub model: MetabolicModel,
    pub pka_library: PKaLibrary,
    pub settings: AdjustSettings,
    /// ids of reactions whose target compartment is taken from the other side
    pub direction_override: Vec<String>,
}

impl PhTask {
    pub fn new(model: MetabolicModel) -> Self {
        Self {
            model,
            ..Default::default()
        }
    }

    fn override_flags(&self) -> Result<Option<Vec<bool>>, PhAdjustError> {
        if self.direction_override.is_empty() {
            return Ok(None);
        }
        let mut flags = vec![false; self.model.n_rxns()];
        for id in &self.direction_override {
            let rxn = self.model.rxn_index(id).ok_or_else(|| {
                PhAdjustError::InvalidTask(format!("direction override for unknown reaction '{}'", id))
            })?;
            flags[rxn] = true;
        }
        Ok(Some(flags))
    }

    /// Builds the pass inputs from the library and the settings and runs the pass on the model.
    pub fn solve(&mut self) -> Result<AdjustmentReport, PhAdjustError> {
        self.model.check_consistency()?;
        let compartments =
            resolve_compartments(&self.model.met_ids, self.model.compartments.as_deref())?;
        let inputs = AdjustInputs {
            pka: PKaTable::from_library(&self.pka_library, &self.model, compartments.convention)?,
            ph: PhAssignment::from_settings(&self.settings, &compartments.vocabulary)?,
            direction_override: self.override_flags()?,
        };
        PhAdjuster::new()
            .with_proton_spellings(self.settings.proton_spellings.clone())
            .run_resolved(&mut self.model, compartments, &inputs)
    }
}
