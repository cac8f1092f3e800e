// Report engine library: CSV loading, normalization, chart layouts and the gRPC service.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod normalize;
pub mod services;
pub mod table;
