#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod driver;
pub mod models;
pub mod normalize;
pub mod selection;
pub mod store;

pub use config::MigrationConfig;
pub use driver::{MigrationDriver, MigrationReport, StepReport};
pub use normalize::{NormalizationStep, Pipeline};
pub use selection::{StepInclusion, StepSelection};
pub use store::{DocumentStore, JsonDirStore, MemoryStore, StoreError};
