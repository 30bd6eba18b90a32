//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::puzzle::Topology;
use crate::solve::{Solution, SolveReport};
use anyhow::{Context, Result};
use std::path::Path;

/// Format solutions for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Grid-shaped table: one block per grid row, one line per category
    pub fn format_solution(solution: &Solution) -> String {
        let width = solution.grid.width.max(1);
        let column = solution
            .objects
            .iter()
            .flat_map(|assignment| assignment.values.iter().map(|value| value.name().len()))
            .max()
            .unwrap_or(0)
            .max(4);
        let label = solution
            .categories
            .iter()
            .map(|category| category.to_string().len())
            .max()
            .unwrap_or(0);

        let mut output = String::new();
        for (row, objects) in solution.objects.chunks(width).enumerate() {
            output.push_str(&format!("{:label$} |", format!("y={}", row), label = label));
            for assignment in objects {
                output.push_str(&format!(" {:column$} |", format!("#{}", assignment.object), column = column));
            }
            output.push('\n');

            for (slot, category) in solution.categories.iter().enumerate() {
                output.push_str(&format!("{:label$} |", category.to_string(), label = label));
                for assignment in objects {
                    let name = assignment.values.get(slot).map_or("?", |value| value.name());
                    output.push_str(&format!(" {:column$} |", name, column = column));
                }
                output.push('\n');
            }
            output.push('\n');
        }
        output
    }

    /// Model count, timings and one table per solution
    pub fn format_report(report: &SolveReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("Model count: {}\n", report.count));
        output.push_str(&format!("Compile time: {:.3}s\n", report.compile_time.as_secs_f64()));
        output.push_str(&format!("Solve time: {:.3}s\n", report.solve_time.as_secs_f64()));
        output.push_str(&format!("Solutions shown: {}\n", report.solutions.len()));
        for (i, solution) in report.solutions.iter().enumerate() {
            output.push_str(&format!("\n=== Solution {} ===\n", i + 1));
            output.push_str(&Self::format_solution(solution));
        }
        output
    }

    /// Neighbor lookup for every object under the configured topology
    pub fn format_neighbor_table(topology: &Topology) -> String {
        let config = topology.config();
        let mut output = String::new();
        output.push_str(&format!(
            "Grid {}x{}, left offset ({}, {}), right offset ({}, {}), wrap horizontal: {}, wrap vertical: {}\n",
            topology.shape().width,
            topology.shape().height,
            config.left_offset.dx,
            config.left_offset.dy,
            config.right_offset.dx,
            config.right_offset.dy,
            config.wrap_horizontal,
            config.wrap_vertical
        ));
        output.push_str("Object | (x, y)   | Left | Right\n");
        output.push_str("-------|----------|------|------\n");

        let show = |neighbor: Option<usize>| neighbor.map_or_else(|| "-".to_string(), |n| n.to_string());
        for object in 0..topology.shape().object_count() {
            let (x, y) = topology.shape().position(object);
            output.push_str(&format!(
                "{:6} | ({:2}, {:2}) | {:>4} | {}\n",
                object,
                x,
                y,
                show(topology.left_neighbor(object)),
                show(topology.right_neighbor(object))
            ));
        }
        output
    }

    /// Save solutions to files based on output format
    pub fn save_solutions<P: AsRef<Path>>(solutions: &[Solution], output_dir: P, format: OutputFormat) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        for (i, solution) in solutions.iter().enumerate() {
            match format {
                OutputFormat::Text => {
                    let filepath = output_dir.join(format!("solution_{:03}.txt", i + 1));
                    std::fs::write(&filepath, Self::format_solution(solution))
                        .with_context(|| format!("Failed to write {}", filepath.display()))?;
                }
                OutputFormat::Json => {
                    let filepath = output_dir.join(format!("solution_{:03}.json", i + 1));
                    solution.save_to_file(&filepath)?;
                }
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: AnsiColor) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, AnsiColor::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, AnsiColor::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, AnsiColor::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, AnsiColor::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AnsiColor {
    Red,
    Green,
    Yellow,
    Blue,
}

impl AnsiColor {
    fn code(self) -> u8 {
        match self {
            AnsiColor::Red => 31,
            AnsiColor::Green => 32,
            AnsiColor::Yellow => 33,
            AnsiColor::Blue => 34,
        }
    }
}
