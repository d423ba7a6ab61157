//! Arithmetic operations and their validation rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calculator::Operands;
use crate::error::{CalculatorError, Result};

pub const RESULT_OUT_OF_RANGE: &str = "El resultado excede el rango numérico.";

/// The four operations the service knows how to fold.
///
/// Route codes (`sum`, `res`, `mul`, `div`) are what clients send; the
/// stored name (`suma`, `resta`, ...) is what lands in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "suma", alias = "sum")]
    Sum,
    #[serde(rename = "resta", alias = "res")]
    Subtract,
    #[serde(rename = "multiplicacion", alias = "mul")]
    Multiply,
    #[serde(rename = "division", alias = "div")]
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Sum,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Route code used in URLs and batch payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Subtract => "res",
            Operation::Multiply => "mul",
            Operation::Divide => "div",
        }
    }

    /// Name persisted in the history store.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sum => "suma",
            Operation::Subtract => "resta",
            Operation::Multiply => "multiplicacion",
            Operation::Divide => "division",
        }
    }

    /// The binary function behind this operation.
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operation::Sum => lhs + rhs,
            Operation::Subtract => lhs - rhs,
            Operation::Multiply => lhs * rhs,
            Operation::Divide => lhs / rhs,
        }
    }

    /// Reject operands this service refuses to work with.
    ///
    /// Negative values are forbidden for every operation, and a divide may
    /// not have a zero anywhere after the dividend.
    pub fn check(&self, operands: &Operands) -> Result<()> {
        if operands.iter().any(|n| n < 0.0) {
            return Err(CalculatorError::Forbidden(
                "No se permiten números negativos.".to_string(),
            ));
        }

        if *self == Operation::Divide && operands.iter().skip(1).any(|n| n == 0.0) {
            return Err(CalculatorError::Forbidden(
                "No se puede dividir entre cero.".to_string(),
            ));
        }

        Ok(())
    }

    /// Fold the operands left to right.
    pub fn fold(&self, operands: &Operands) -> f64 {
        let (first, rest) = operands.split_first();
        rest.iter().fold(first, |acc, &n| self.apply(acc, n))
    }

    /// Check the operands, fold them, and reject a result that left the
    /// finite `f64` range.
    pub fn evaluate(&self, operands: &Operands) -> Result<f64> {
        self.check(operands)?;

        let result = self.fold(operands);
        if !result.is_finite() {
            return Err(CalculatorError::Validation(RESULT_OUT_OF_RANGE.to_string()));
        }
        Ok(result)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" | "suma" => Ok(Operation::Sum),
            "res" | "resta" => Ok(Operation::Subtract),
            "mul" | "multiplicacion" => Ok(Operation::Multiply),
            "div" | "division" => Ok(Operation::Divide),
            _ => Err(format!("Operación desconocida: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn operands(values: &[f64]) -> Operands {
        Operands::new(values.to_vec()).unwrap()
    }

    #[test]
    fn test_operation_parsing() {
        assert_eq!("sum".parse::<Operation>().unwrap(), Operation::Sum);
        assert_eq!("suma".parse::<Operation>().unwrap(), Operation::Sum);
        assert_eq!("RES".parse::<Operation>().unwrap(), Operation::Subtract);
        assert_eq!(
            "multiplicacion".parse::<Operation>().unwrap(),
            Operation::Multiply
        );
        assert_eq!("div".parse::<Operation>().unwrap(), Operation::Divide);
        assert!("pow".parse::<Operation>().is_err());
    }

    #[test]
    fn test_fold_is_left_associative() {
        assert_eq!(Operation::Subtract.fold(&operands(&[100.0, 10.0, 5.0])), 85.0);
        assert_eq!(Operation::Divide.fold(&operands(&[100.0, 5.0, 2.0])), 10.0);
        assert_eq!(Operation::Subtract.fold(&operands(&[5.0, 10.0])), -5.0);
    }

    #[test]
    fn test_sum_and_product() {
        let cases: [&[f64]; 4] = [
            &[10.0, 20.0, 30.0],
            &[5.5, 4.5],
            &[0.0, 0.0, 0.0],
            &[1.0, 2.0, 3.0, 4.0, 5.0],
        ];
        for values in cases {
            let ops = operands(values);
            assert_eq!(Operation::Sum.fold(&ops), values.iter().sum::<f64>());
            assert_eq!(Operation::Multiply.fold(&ops), values.iter().product::<f64>());
        }
    }

    #[test]
    fn test_check_rejects_negatives_for_every_operation() {
        for op in Operation::ALL {
            let err = op.check(&operands(&[10.0, -5.0])).unwrap_err();
            assert!(matches!(err, CalculatorError::Forbidden(_)), "{op}");
        }
    }

    #[test]
    fn test_check_rejects_zero_divisor_anywhere() {
        let err = Operation::Divide
            .check(&operands(&[100.0, 10.0, 0.0, 5.0]))
            .unwrap_err();
        assert!(matches!(err, CalculatorError::Forbidden(_)));

        // A zero dividend is fine.
        assert!(Operation::Divide.check(&operands(&[0.0, 10.0])).is_ok());
        // Zero is only special for division.
        assert!(Operation::Multiply.check(&operands(&[10.0, 0.0])).is_ok());
    }

    #[test]
    fn test_evaluate_rejects_overflow() {
        let cases: [(Operation, &[f64]); 3] = [
            (Operation::Multiply, &[1e200, 1e200]),
            (Operation::Divide, &[1.0, 1e-320]),
            (Operation::Sum, &[1.7e308, 1.7e308]),
        ];
        for (op, values) in cases {
            let err = op.evaluate(&operands(values)).unwrap_err();
            assert!(matches!(err, CalculatorError::Validation(ref m) if m == RESULT_OUT_OF_RANGE), "{op}");
        }

        assert_eq!(Operation::Multiply.evaluate(&operands(&[1e100, 1e100])).unwrap(), 1e200);
    }

    #[test]
    fn test_evaluate_checks_before_folding() {
        let err = Operation::Divide.evaluate(&operands(&[1.0, 0.0])).unwrap_err();
        assert!(matches!(err, CalculatorError::Forbidden(_)));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Operation::Multiply).unwrap();
        assert_eq!(json, r#""multiplicacion""#);

        let op: Operation = serde_json::from_str(r#""res""#).unwrap();
        assert_eq!(op, Operation::Subtract);
        let op: Operation = serde_json::from_str(r#""division""#).unwrap();
        assert_eq!(op, Operation::Divide);

        assert!(serde_json::from_str::<Operation>(r#""pow""#).is_err());
    }

    proptest! {
        #[test]
        fn sum_equals_total(values in prop::collection::vec(0.0f64..1e6, 2..16)) {
            let ops = operands(&values);
            prop_assert_eq!(Operation::Sum.fold(&ops), values.iter().sum::<f64>());
        }

        #[test]
        fn multiply_equals_product(values in prop::collection::vec(0.0f64..1e3, 2..8)) {
            let ops = operands(&values);
            prop_assert_eq!(Operation::Multiply.fold(&ops), values.iter().product::<f64>());
        }

        #[test]
        fn subtract_is_first_minus_rest(values in prop::collection::vec(0.0f64..1e6, 2..16)) {
            let ops = operands(&values);
            let expected = values[1..].iter().fold(values[0], |acc, n| acc - n);
            prop_assert_eq!(Operation::Subtract.fold(&ops), expected);
        }

        #[test]
        fn non_negative_operands_pass_check(values in prop::collection::vec(0.0f64..1e6, 2..16)) {
            let ops = operands(&values);
            prop_assert!(Operation::Sum.check(&ops).is_ok());
            prop_assert!(Operation::Multiply.check(&ops).is_ok());
        }
    }
}
