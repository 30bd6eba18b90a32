//! Configuration settings for the attribute grid solver

use crate::error::{PuzzleError, PuzzleResult};
use crate::puzzle::{Color, Dimensions, Nation, Owns, TopologyConfig, Transport};
use crate::sat::constraints::{CoOccurrence, ConstraintSet, FixedAssignment, NeighborPair};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub puzzle: Dimensions,
    #[serde(default)]
    pub topology: TopologyConfig,
    #[serde(default)]
    pub constraints: ConstraintSet,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Solutions decoded and reported
    pub max_solutions: usize,
    /// Projected models enumerated before the count is reported as a lower bound
    pub count_limit: usize,
    pub parallel_uniqueness: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Cadical,
    Varisat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            puzzle: Dimensions::default(),
            topology: TopologyConfig::default(),
            constraints: example_constraints(),
            solver: SolverConfig {
                backend: SolverBackend::Cadical,
                max_solutions: 1,
                count_limit: 1000,
                parallel_uniqueness: true,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/solutions"),
            },
        }
    }
}

/// A small, satisfiable constraint set for the default 3x3 puzzle
pub fn example_constraints() -> ConstraintSet {
    ConstraintSet {
        fixed: vec![
            FixedAssignment { object: 0, value: Nation::Tatarin.into() },
            FixedAssignment { object: 4, value: Color::White.into() },
        ],
        co_occurrence: vec![
            CoOccurrence(vec![Nation::German.into(), Owns::Fish.into()]),
            CoOccurrence(vec![Color::Red.into(), Transport::Bus.into()]),
        ],
        neighbors: vec![NeighborPair {
            first: Nation::German.into(),
            second: Nation::Chinese.into(),
        }],
        left_neighbors: vec![NeighborPair {
            first: Owns::Hamster.into(),
            second: Color::Blue.into(),
        }],
        right_neighbors: Vec::new(),
        uniqueness: true,
        upper_bound: true,
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> PuzzleResult<()> {
        self.puzzle.validate()?;

        if self.solver.max_solutions == 0 {
            return Err(PuzzleError::configuration("max_solutions must be positive"));
        }
        if self.solver.count_limit < self.solver.max_solutions {
            return Err(PuzzleError::configuration(format!(
                "count_limit ({}) must be at least max_solutions ({})",
                self.solver.count_limit, self.solver.max_solutions
            )));
        }

        self.constraints.validate(&self.puzzle)
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.solver.max_solutions = max_solutions;
        }
        if let Some(count_limit) = cli_overrides.count_limit {
            self.solver.count_limit = count_limit;
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub backend: Option<SolverBackend>,
    pub max_solutions: Option<usize>,
    pub count_limit: Option<usize>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
}
