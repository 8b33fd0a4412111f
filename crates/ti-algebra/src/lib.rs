//! # ti-algebra
//!
//! Pure vector-field math with no I/O and no state: leadfield row
//! superposition and the TI-envelope closed form. Every function here
//! takes plain data and returns plain data so it can be unit-tested and
//! benchmarked in isolation from the simulator that calls it.

pub mod superposition;
pub mod ti_field;
