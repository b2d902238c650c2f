pub mod cleaning;
pub mod config;
pub mod enrich;
pub mod error;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod series;
pub mod stats;
