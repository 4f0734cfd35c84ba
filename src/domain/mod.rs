//! Pure business rules: no I/O below this module.

pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod reference;
pub mod status;
pub mod stock;
pub mod value_objects;
