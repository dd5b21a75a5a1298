//! Utility library for the TMPRED project: numeric helpers shared by the training, evaluation
//! and plotting drivers.

pub mod cdf;
pub mod od;
pub mod series;
pub mod table;
