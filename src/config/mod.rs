//! Configuration management for the attribute grid solver

pub mod settings;

pub use settings::{
    example_constraints, CliOverrides, OutputConfig, OutputFormat, Settings, SolverBackend, SolverConfig,
};
