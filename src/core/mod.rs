// src/core/mod.rs - Simulation core: roster, scoring, aggregation, allocation

pub mod aggregator;
pub mod disclosure;
pub mod investor;
pub mod ledger;
pub mod orchestrator;
pub mod rating;
pub mod scorer;
pub mod strategy;
pub mod types;
