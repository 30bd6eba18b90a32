//! Main CLI application for the attribute grid solver

use anyhow::{Context, Result};
use attribute_grid_solver::{
    config::{CliOverrides, OutputFormat, Settings, SolverBackend},
    puzzle::{Category, Color, Dimensions, GridShape, Owns, Topology, TopologyConfig},
    sat::{CoOccurrence, ConstraintSet, FixedAssignment},
    solve::{PuzzleProblem, SolveReport},
    utils::{ColorOutput, SolutionFormatter},
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "attribute_grid_solver")]
#[command(about = "Attribute grid puzzle solver: constraints to formulas to SAT")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a puzzle and count its solutions
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// SAT backend (overrides config)
        #[arg(short, long, value_enum)]
        backend: Option<SolverBackend>,

        /// Maximum solutions to decode (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Models enumerated before the count becomes a lower bound (overrides config)
        #[arg(long)]
        count_limit: Option<usize>,

        /// Output format for saved solutions (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create example configuration files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Compile a puzzle and print statistics without solving
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Also write the lowered formula in DIMACS format
        #[arg(long)]
        dimacs: Option<PathBuf>,
    },

    /// Print the resolved neighbor of every object
    Neighbors {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            backend,
            max_solutions,
            count_limit,
            format,
            output,
            verbose,
        } => {
            let overrides = CliOverrides {
                backend,
                max_solutions,
                count_limit,
                format,
                output_dir: output,
            };
            solve_command(&config, &overrides, verbose)
        }
        Commands::Setup { directory, force } => setup_command(&directory, force),
        Commands::Check { config, dimacs } => check_command(&config, dimacs.as_deref()),
        Commands::Neighbors { config } => neighbors_command(&config),
    }
}

/// Load the config file, or fall back to the built-in example puzzle
fn load_settings(config_path: &Path) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "Config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Ok(Settings::default())
    }
}

fn solve_command(config_path: &Path, overrides: &CliOverrides, verbose: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Starting attribute grid solver"));

    let mut settings = load_settings(config_path)?;
    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;

    if verbose {
        println!("Configuration:");
        println!(
            "  Grid: {}x{}, {} values per category",
            settings.puzzle.grid.width, settings.puzzle.grid.height, settings.puzzle.values_per_category
        );
        println!(
            "  Categories: {}",
            settings
                .puzzle
                .categories
                .iter()
                .map(|category| category.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Backend: {:?}", settings.solver.backend);
        println!("  Max solutions: {}", settings.solver.max_solutions);
        println!("  Count limit: {}", settings.solver.count_limit);
        println!("  Output dir: {}", settings.output.output_directory.display());
        println!();
    }

    let start_time = Instant::now();
    println!("{}", ColorOutput::info("Compiling constraints..."));
    let problem = PuzzleProblem::new(settings.clone()).context("Failed to compile puzzle")?;

    if verbose {
        println!("{}", problem.encoder().bank().statistics());
        println!("{}", problem.compile_statistics());
    }

    let report = problem.solve().context("Failed to solve puzzle")?;
    let total_time = start_time.elapsed();

    if report.solutions.is_empty() {
        println!("{}", ColorOutput::warning(&empty_report_message(&report)));
        return Ok(());
    }

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Model count {} ({:.3}s total)",
            report.count,
            total_time.as_secs_f64()
        ))
    );
    println!("\n{}", SolutionFormatter::format_report(&report));

    if verbose {
        println!("{}", report.solver_statistics);
    }

    SolutionFormatter::save_solutions(
        &report.solutions,
        &settings.output.output_directory,
        settings.output.format,
    )
    .context("Failed to save solutions")?;
    println!(
        "{}",
        ColorOutput::success(&format!(
            "Solutions saved to {}",
            settings.output.output_directory.display()
        ))
    );

    Ok(())
}

/// A positive count with nothing decoded means every model fell outside the value range
fn empty_report_message(report: &SolveReport) -> String {
    if report.is_satisfiable() {
        format!(
            "Model count {}, but all {} decoded models were rejected",
            report.count, report.rejected
        )
    } else {
        "No solutions found".to_string()
    }
}

fn setup_command(directory: &Path, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let examples_dir = config_dir.join("examples");
    let output_dir = directory.join("output/solutions");
    for dir in [&config_dir, &examples_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let files = [
        (config_dir.join("default.yaml"), Settings::default()),
        (examples_dir.join("two_objects.yaml"), two_object_example()),
        (examples_dir.join("wrapped.yaml"), wrapped_example()),
    ];
    for (path, settings) in &files {
        if path.exists() && !force {
            println!("Skipped: {} (already exists)", path.display());
            continue;
        }
        settings
            .to_file(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        println!("Created: {}", path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: cargo run -- solve --config config/default.yaml");

    Ok(())
}

/// Smallest interesting puzzle: two objects, one category, one fixed value
fn two_object_example() -> Settings {
    let mut settings = Settings::default();
    settings.puzzle = Dimensions {
        grid: GridShape::new(2, 1),
        values_per_category: 2,
        categories: vec![Category::Color],
    };
    settings.constraints = ConstraintSet {
        fixed: vec![FixedAssignment {
            object: 0,
            value: Color::Red.into(),
        }],
        ..ConstraintSet::default()
    };
    settings.solver.max_solutions = 5;
    settings
}

/// The default puzzle on a torus, without the directional clue
fn wrapped_example() -> Settings {
    let mut settings = Settings::default();
    settings.topology = TopologyConfig {
        wrap_horizontal: true,
        wrap_vertical: true,
        ..TopologyConfig::default()
    };
    settings.constraints.left_neighbors.clear();
    settings
        .constraints
        .co_occurrence
        .push(CoOccurrence(vec![Color::Green.into(), Owns::Drone.into()]));
    settings
}

fn check_command(config_path: &Path, dimacs: Option<&Path>) -> Result<()> {
    println!("{}", ColorOutput::info("Checking puzzle..."));

    let settings = load_settings(config_path)?;
    let problem = PuzzleProblem::new(settings).context("Failed to compile puzzle")?;

    println!("{}", problem.encoder().bank().statistics());
    println!("{}", problem.compile_statistics());
    println!("Compile time: {:.3}s", problem.compile_time().as_secs_f64());
    println!("Formula nodes: {}", problem.formula().node_count());

    let cnf = problem.lower()?;
    println!("CNF: {} variables, {} clauses", cnf.variable_count(), cnf.clause_count());

    if let Some(path) = dimacs {
        std::fs::write(path, cnf.to_dimacs()).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("DIMACS written to {}", path.display());
    }

    if problem.formula().is_false() {
        println!("{}", ColorOutput::warning("The constraints simplify to FALSE"));
    } else {
        println!("{}", ColorOutput::success("Puzzle compiled"));
    }
    Ok(())
}

fn neighbors_command(config_path: &Path) -> Result<()> {
    let settings = load_settings(config_path)?;
    let topology = Topology::new(settings.puzzle.grid, settings.topology);
    println!("{}", SolutionFormatter::format_neighbor_table(&topology));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "attribute_grid_solver",
            "solve",
            "--config",
            "test.yaml",
            "--backend",
            "varisat",
            "--count-limit",
            "50",
        ]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["attribute_grid_solver", "solve", "--backend", "minisat"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path(), false).unwrap();

        let default_path = temp_dir.path().join("config/default.yaml");
        assert!(default_path.exists());
        assert!(Settings::from_file(&default_path).is_ok());
        assert!(Settings::from_file(&temp_dir.path().join("config/examples/two_objects.yaml")).is_ok());
        assert!(Settings::from_file(&temp_dir.path().join("config/examples/wrapped.yaml")).is_ok());
        assert!(temp_dir.path().join("output/solutions").exists());

        let default_text = std::fs::read_to_string(&default_path).unwrap();
        assert!(default_text.contains("nation: TATARIN"));
        assert!(!default_text.contains("!nation"));
        let example_text =
            std::fs::read_to_string(temp_dir.path().join("config/examples/two_objects.yaml")).unwrap();
        assert!(example_text.contains("color: RED"));

        // a second run without --force leaves files alone
        std::fs::write(&default_path, "edited").unwrap();
        setup_command(temp_dir.path(), false).unwrap();
        assert_eq!(std::fs::read_to_string(&default_path).unwrap(), "edited");
    }

    #[test]
    fn test_check_writes_dimacs() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path(), false).unwrap();

        let dimacs = temp_dir.path().join("puzzle.cnf");
        check_command(&temp_dir.path().join("config/examples/two_objects.yaml"), Some(&dimacs)).unwrap();
        assert!(std::fs::read_to_string(&dimacs).unwrap().contains("p cnf"));
    }

    #[test]
    fn test_empty_report_message() {
        let mut settings = two_object_example();
        settings.puzzle.values_per_category = 1;
        settings.constraints.upper_bound = false;
        settings.solver.max_solutions = 2;
        settings.solver.count_limit = 300;
        let report = PuzzleProblem::new(settings).unwrap().solve().unwrap();
        assert_eq!(
            empty_report_message(&report),
            "Model count 15, but all 2 decoded models were rejected"
        );

        let mut settings = two_object_example();
        settings.constraints.fixed.push(FixedAssignment {
            object: 1,
            value: Color::Red.into(),
        });
        let report = PuzzleProblem::new(settings).unwrap().solve().unwrap();
        assert_eq!(empty_report_message(&report), "No solutions found");
    }

    #[test]
    fn test_solve_two_object_example() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path(), false).unwrap();

        let overrides = CliOverrides {
            format: Some(OutputFormat::Json),
            output_dir: Some(temp_dir.path().join("solutions")),
            ..CliOverrides::default()
        };
        solve_command(&temp_dir.path().join("config/examples/two_objects.yaml"), &overrides, true).unwrap();
        assert!(temp_dir.path().join("solutions/solution_001.json").exists());
    }
}
