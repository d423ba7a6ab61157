//! Calculadora: a calculator web service with a persisted operation history.
//!
//! - `GET /calculadora/{sum,res,mul,div}?nums=..` computes and records one operation
//! - `POST /calculadora/lote` runs a batch, all-or-nothing on validation
//! - `GET /calculadora/historial[/operacion/{op}|/fecha/{YYYY-MM-DD}]` queries the history
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use calculadora::calculator::{Calculator, Operands, Operation};
//! use calculadora::history::{HistoryOrder, MemoryStore};
//!
//! let calculator = Calculator::new(Arc::new(MemoryStore::new()), HistoryOrder::Ascending);
//! let out = calculator
//!     .compute(Operation::Divide, Operands::new(vec![100.0, 5.0, 2.0])?)
//!     .await?;
//! assert_eq!(out.result, 10.0);
//! ```

pub mod calculator;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod metrics;
pub mod server;
