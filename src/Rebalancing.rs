//! # Rebalancing
//!
//! Restores the hydrogen balance of reactions after the formulas and charges of their
//! metabolites were adjusted to a new pH.
//!
//! | stage          | module        | output                                   |
//! |----------------|---------------|------------------------------------------|
//! | imbalance      | `imbalance`   | element and charge imbalance per reaction |
//! | proton pool    | `proton_pool` | proton metabolite per compartment        |
//! | classification | `topology`    | topology and target compartment          |
//! | balancing      | `balancer`    | new proton coefficient                   |
//!
//! `auto_adjust` runs the whole pass, from pKa data to the rebalanced model.
pub mod auto_adjust;
pub mod balancer;
pub mod imbalance;
pub mod proton_pool;
pub mod topology;
