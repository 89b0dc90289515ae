//! LATAM startup benchmark: load company and funding-round tables, filter
//! them by country, stage and industry, and derive the KPIs, chart series and
//! comparison table shown by the desktop dashboard.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use config::{DashboardConfig, Fallback, LoaderConfig, SourcePreference};
pub use data::filter::{Category, FilterSelection};
pub use data::loader::{Loader, Upload, Uploads};
pub use data::model::{Company, CompanyColumn, Dataset, Round};
pub use data::pipeline::{DashboardView, FilteredView};
pub use error::{LoadError, Result};
