//! # Supply chain import
//!
//! Batch import of a flat supply-chain transaction export (one row per order
//! line, denormalized across customer, product, order and shipping
//! attributes) into four normalized tables: `customers`, `products`,
//! `orders` and `shipping_details`.
//!
//! ## Pipeline
//!
//! 1. Read the source fully into memory ([`source`]).
//! 2. Deduplicate customers and products, first occurrence wins ([`dedup`]).
//! 3. Insert canonical entities and keep the generated keys ([`loader`]).
//! 4. Resolve every row to an order through those keys, then attach a
//!    shipping record to every order by source position.
//! 5. Summarize the final table state ([`summary`]).
//!
//! Rows that cannot be resolved or inserted are counted, never fatal.
//!
//! ## Example
//!
//! ```no_run
//! use supply_chain_import::{CsvSource, Database, ImportPipeline, PgSink, PipelineConfig};
//!
//! let config = PipelineConfig::from_env()?;
//! let db = Database::connect(&config.database)?;
//! let mut sink = PgSink::connect(&db)?;
//! let source = CsvSource::new(&config.source_path, config.encoding);
//!
//! let report = ImportPipeline::new(&config).run(&source, &mut sink)?;
//! println!("{}", report);
//! # Ok::<(), supply_chain_import::PipelineError>(())
//! ```

// Core modules
pub mod coerce;
pub mod config;
pub mod dedup;
pub mod entity;
pub mod error;
pub mod source;

// Loading
pub mod loader;
pub mod pipeline;
pub mod sink;
pub mod summary;

// Diesel ORM runtime infrastructure
pub mod db;

// Re-export key types
pub use config::{DatabaseSettings, PipelineConfig};
pub use entity::{Entity, FieldValue};
pub use error::{ConfigError, PipelineError, SinkError, SourceError};
pub use source::{Column, CsvSource, Encoding, RowPosition, SourceReader, SourceRow, SourceTable};

// Re-export loading types
pub use loader::{KeyMap, LoadOutcome, ShippingOutcome, SkipReason, SkipTally};
pub use pipeline::{ImportPipeline, Phase};
pub use sink::{GeneratedKey, MemorySink, Sink};
pub use summary::{RunReport, TableSummary};

// Re-export db types
pub use db::{Database, PgSink};
