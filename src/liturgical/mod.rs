//! Liturgical calendar matching: which sermon belongs to which Sunday or feast

mod calendar;

pub use calendar::*;
