#[allow(non_snake_case)]
pub mod MetabolicModel;
#[allow(non_snake_case)]
pub mod Protonation;
#[allow(non_snake_case)]
pub mod Rebalancing;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod errors;
pub mod settings;
