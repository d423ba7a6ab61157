//! Validated operand lists.

use crate::error::{CalculatorError, Result};

/// Minimum number of operands for any operation.
pub const MIN_OPERANDS: usize = 2;

pub(crate) const INSUFFICIENT_OPERANDS: &str =
    "Se requieren al menos dos números para una operación.";

/// An ordered list of at least two finite numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Operands(Vec<f64>);

impl Operands {
    /// Validate an already-numeric list.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.len() < MIN_OPERANDS {
            return Err(CalculatorError::Validation(INSUFFICIENT_OPERANDS.to_string()));
        }

        if values.iter().any(|n| !n.is_finite()) {
            return Err(CalculatorError::Validation(
                "Los números deben ser finitos.".to_string(),
            ));
        }

        Ok(Self(values))
    }

    /// Parse raw strings (query parameters, CLI arguments) into operands.
    pub fn parse<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = raw
            .into_iter()
            .map(|s| {
                let s = s.as_ref().trim();
                s.parse::<f64>()
                    .map_err(|_| CalculatorError::Validation(format!("Valor no numérico: '{}'", s)))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// First operand and the rest. Never panics: length is checked at construction.
    pub fn split_first(&self) -> (f64, &[f64]) {
        (self.0[0], &self.0[1..])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}
