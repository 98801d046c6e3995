//! # Reaction topology classifier
//!
//! ## Aim
//! Decides, for one reaction, which compartment's proton pool absorbs its hydrogen imbalance.
//!
//! ## Main Data Structures and Logic
//! - `ReactionTopology`: the closed set of outcomes.
//! - `TOPOLOGY_TABLE`: decision table keyed by the number of distinct substrate compartments,
//!   the number of distinct product compartments and, for one/one reactions, whether the two
//!   compartments coincide. Rows are tried top to bottom.
//! - `classify_reaction()`: exchange and unanalyzable reactions are filtered out first, then the
//!   table gives the topology and `select_target()` the compartment.
//!
//! | substrates | products | same compartment | topology        | target (override)              |
//! |------------|----------|------------------|-----------------|--------------------------------|
//! | one        | one      | yes              | SameCompartment | that compartment               |
//! | one        | one      | no               | Symport         | product (substrate)            |
//! | many       | one      | -                | Abc             | product (substrate side)       |
//! | one        | many     | -                | MembraneBound   | substrate (product side)       |
//! | many       | many     | -                | Antiport        | lowest target pH substrate compartment (highest) |
//!
//! When a side spanning several compartments must be picked, compartments of the opposite side
//! are left out if possible, and the lowest (or highest) target pH wins; ties go to the lowest
//! compartment index.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionTopology {
    SameCompartment,
    Symport,
    Abc,
    MembraneBound,
    Antiport,
    Exchange,
    Unanalyzable,
}

impl ReactionTopology {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionTopology::SameCompartment => "same compartment",
            ReactionTopology::Symport => "symport/diffusion",
            ReactionTopology::Abc => "ABC",
            ReactionTopology::MembraneBound => "membrane-bound",
            ReactionTopology::Antiport => "antiport",
            ReactionTopology::Exchange => "exchange",
            ReactionTopology::Unanalyzable => "unanalyzable",
        }
    }

    pub const ALL: [ReactionTopology; 7] = [
        ReactionTopology::SameCompartment,
        ReactionTopology::Symport,
        ReactionTopology::Abc,
        ReactionTopology::MembraneBound,
        ReactionTopology::Antiport,
        ReactionTopology::Exchange,
        ReactionTopology::Unanalyzable,
    ];
}

impl fmt::Display for ReactionTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// number of distinct compartments on one side of a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    fn of(set: &BTreeSet<usize>) -> Self {
        if set.len() == 1 {
            Cardinality::One
        } else {
            Cardinality::Many
        }
    }
}

/// (substrates, products, same compartment or `None` for any, topology)
pub const TOPOLOGY_TABLE: [(Cardinality, Cardinality, Option<bool>, ReactionTopology); 5] = [
    (Cardinality::One, Cardinality::One, Some(true), ReactionTopology::SameCompartment),
    (Cardinality::One, Cardinality::One, Some(false), ReactionTopology::Symport),
    (Cardinality::Many, Cardinality::One, None, ReactionTopology::Abc),
    (Cardinality::One, Cardinality::Many, None, ReactionTopology::MembraneBound),
    (Cardinality::Many, Cardinality::Many, None, ReactionTopology::Antiport),
];

/// looks the topology of a two-sided reaction up in [`TOPOLOGY_TABLE`]
pub fn topology_for(substrates: Cardinality, products: Cardinality, same: bool) -> ReactionTopology {
    TOPOLOGY_TABLE
        .iter()
        .find(|(s, p, overlap, _)| {
            *s == substrates && *p == products && overlap.is_none_or(|o| o == same)
        })
        .map(|(_, _, _, topology)| *topology)
        .unwrap_or(ReactionTopology::Unanalyzable)
}

/// topology and rebalancing compartment of a reaction; `target` is `None` for skipped reactions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub topology: ReactionTopology,
    pub target: Option<usize>,
}

impl Classification {
    fn skipped(topology: ReactionTopology) -> Self {
        Self {
            topology,
            target: None,
        }
    }
}

/// Everything the classifier needs to know about one reaction.
#[derive(Debug, Clone, Copy)]
pub struct ReactionContext<'a> {
    /// signed stoichiometric column: metabolite row -> coefficient
    pub column: &'a BTreeMap<usize, f64>,
    pub met_compartment: &'a [usize],
    /// imbalance on an element other than hydrogen
    pub complex_imbalance: bool,
    /// a participant has no formula
    pub missing_formula: bool,
    pub direction_override: bool,
    /// target pH of every compartment
    pub target_ph: &'a [f64],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    LowestPh,
    HighestPh,
}

// picks from `candidates` (minus `exclude` when something is left) by target pH; the set is
// ordered so the first extreme found has the lowest index
fn select_target(
    candidates: &BTreeSet<usize>,
    exclude: &BTreeSet<usize>,
    extreme: Extreme,
    target_ph: &[f64],
) -> Option<usize> {
    let remaining: Vec<usize> = candidates.difference(exclude).copied().collect();
    let pool: Vec<usize> = if remaining.is_empty() {
        candidates.iter().copied().collect()
    } else {
        remaining
    };
    let ph = |c: usize| target_ph.get(c).copied().unwrap_or(f64::NAN);
    let mut best: Option<usize> = None;
    for c in pool {
        best = match best {
            None => Some(c),
            Some(b) => {
                let better = match extreme {
                    Extreme::LowestPh => ph(c) < ph(b),
                    Extreme::HighestPh => ph(c) > ph(b),
                };
                if better { Some(c) } else { Some(b) }
            }
        };
    }
    best
}

fn single(set: &BTreeSet<usize>) -> Option<usize> {
    set.iter().next().copied()
}

/// Classifies one reaction and selects the compartment whose proton pool balances it.
pub fn classify_reaction(ctx: &ReactionContext) -> Classification {
    let mut substrates = BTreeSet::new();
    let mut products = BTreeSet::new();
    for (&met, &coefficient) in ctx.column {
        let comp = ctx.met_compartment[met];
        if coefficient < 0.0 {
            substrates.insert(comp);
        } else if coefficient > 0.0 {
            products.insert(comp);
        }
    }
    if substrates.is_empty() || products.is_empty() {
        return Classification::skipped(ReactionTopology::Exchange);
    }
    if ctx.complex_imbalance || ctx.missing_formula {
        return Classification::skipped(ReactionTopology::Unanalyzable);
    }

    let same = substrates == products;
    let topology = topology_for(Cardinality::of(&substrates), Cardinality::of(&products), same);
    let flip = ctx.direction_override;
    let none = BTreeSet::new();
    let target = match topology {
        ReactionTopology::SameCompartment => single(&substrates),
        ReactionTopology::Symport => {
            if flip {
                single(&substrates)
            } else {
                single(&products)
            }
        }
        ReactionTopology::Abc => {
            if flip {
                select_target(&substrates, &products, Extreme::LowestPh, ctx.target_ph)
            } else {
                single(&products)
            }
        }
        ReactionTopology::MembraneBound => {
            if flip {
                select_target(&products, &substrates, Extreme::LowestPh, ctx.target_ph)
            } else {
                single(&substrates)
            }
        }
        ReactionTopology::Antiport => {
            let extreme = if flip {
                Extreme::HighestPh
            } else {
                Extreme::LowestPh
            };
            select_target(&substrates, &none, extreme, ctx.target_ph)
        }
        ReactionTopology::Exchange | ReactionTopology::Unanalyzable => None,
    };
    Classification { topology, target }
}
