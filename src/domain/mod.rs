//! Core domain types and logic.

pub mod trade;
pub mod dividend;
pub mod stock;
pub mod geometric;
pub mod index;
pub mod market;
pub mod error;
