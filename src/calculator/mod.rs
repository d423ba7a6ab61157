//! Arithmetic core.
//!
//! Operands are validated once, at the boundary, into [`Operands`]; the
//! [`Calculator`] service then only has to apply the per-operation rules
//! (no negatives, no zero divisors), fold, reject results that overflow, and
//! record the result.

mod operands;
mod operation;
mod service;

pub use operands::{MIN_OPERANDS, Operands};
pub use operation::{Operation, RESULT_OUT_OF_RANGE};
pub use service::{BatchItem, Calculator, Computation};
