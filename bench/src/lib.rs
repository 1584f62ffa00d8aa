//! Benchmark utilities for typed_hub.
//!
//! - **Dispatch**: `emit` cost against sequence length, persistent and once
//! - **Registration**: append, prepend and remove on growing sequences
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p typed_hub_bench
//!
//! # Run specific benchmark group
//! cargo bench -p typed_hub_bench -- emit
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

pub mod events;
