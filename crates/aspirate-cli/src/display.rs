//! Display formatting for CLI output

use aspirate_build::BuildReport;
use aspirate_core::SkippedEntry;
use aspirate_helm::ChartOutput;
use console::style;
use std::path::Path;

/// Manifest entries left out of generation
pub fn display_skipped(skipped: &[SkippedEntry]) {
    for entry in skipped {
        println!(
            "{} Skipping {}: {}",
            style("⚠").yellow(),
            style(&entry.name).cyan(),
            entry.reason
        );
    }
}

pub fn display_build_report(report: &BuildReport) {
    for outcome in &report.outcomes {
        println!(
            "{} Built {} as {}",
            style("✓").green().bold(),
            style(&outcome.target).cyan(),
            style(&outcome.image).yellow()
        );
    }
}

/// Per-resource directories written for kustomize
pub fn display_kustomize_output(output: &Path, resources: &[String], final_manifest: Option<&Path>) {
    for name in resources {
        println!(
            "{} Generated manifests for {}",
            style("✓").green().bold(),
            style(name).cyan()
        );
    }
    match final_manifest {
        Some(path) => println!(
            "{} Wrote {}",
            style("✓").green().bold(),
            style(path.display()).yellow()
        ),
        None => println!(
            "{} Skipped final kustomization in {}",
            style("→").blue(),
            style(output.display()).yellow()
        ),
    }
}

pub fn display_chart_output(output: &ChartOutput) {
    for collision in &output.collisions {
        println!(
            "{} Template {} was generated more than once; the last object was kept",
            style("⚠").yellow(),
            style(collision).cyan()
        );
    }
    println!(
        "{} Generated Helm chart at {} ({} templates)",
        style("✓").green().bold(),
        style(output.chart_path.display()).yellow(),
        output.templates.len()
    );
}
