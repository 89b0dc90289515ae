//! Data layer: core types, loading, filtering, and projections.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet        uploads
//!        │                           │
//!        ▼                           ▼
//!   ┌──────────┐   missing?   ┌──────────┐
//!   │  table    │ ◄─────────── │  sample   │
//!   └──────────┘              └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐   memoized in `cache`
//!   │  loader   │  RawTable → Company / Round, then `derive`
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSelection → filtered companies
//!   └──────────┘
//!        │
//!        ├──────────────► aggregate   (KPIs)
//!        ▼
//!   ┌──────────┐
//!   │  project  │  round semi-join, table, chart projections
//!   └──────────┘
//! ```
//!
//! `pipeline` ties the filter, aggregate and project steps into one pure call.

pub mod aggregate;
pub mod cache;
pub mod derive;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod project;
pub mod sample;
pub mod table;
