//! Core library for chronos
//!
//! This crate implements the **Functional Core** of the chronos workload
//! report generator, following the Functional Core - Imperative Shell
//! architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`chronos_core`** (this crate): Pure transformations with zero I/O
//! - **`pdf`**: Drawing surface, table layout and pagination
//! - **`chronos`**: Storage, asset fetching, archive packaging, CLI and HTTP
//!   (the Imperative Shell)
//!
//! Every function here is deterministic: the same records always produce the
//! same summaries and pages, independent of hash iteration order.
//!
//! # Module Organization
//!
//! - [`normalize`]: Value coercion, year expansion, accent folding, plurality vote
//! - [`csv`]: Tolerant CSV parsing and header alias resolution
//! - [`records`]: Assignment and roster record model
//! - [`store`]: Shape tolerance for stored collections
//! - [`period`]: Half-year periods and the configured period list
//! - [`title`]: Appointment title rule table
//! - [`aggregate`]: Per-holder hour aggregation and career resolution
//! - [`pages`]: Per-career proposal pages and worker grouping
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use chronos_core::aggregate::summarize_holders;
//! use chronos_core::csv::records_from_csv;
//! use chronos_core::period::PeriodList;
//!
//! let records = records_from_csv("Profesor,RFC,MesIni,AnoIni,Teo\nA,X1,8,24,4\n");
//! let periods = PeriodList::parse("2024-II,2025-I")?;
//! let holders = summarize_holders(&records, &[], &periods);
//!
//! assert_eq!(holders[0].totals()[0].theoretical, 4);
//! ```

pub mod aggregate;
pub mod csv;
pub mod normalize;
pub mod pages;
pub mod period;
pub mod records;
pub mod store;
pub mod title;

pub use period::InvalidPeriod;
