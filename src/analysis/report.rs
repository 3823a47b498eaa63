//! Plain-text experiment report.

use std::fmt;

use super::Analysis;
use crate::experiment::ExperimentDefinition;

/// Render a human-readable report.
///
/// Pure function of its inputs: identical `(experiment, analysis)` pairs
/// render byte-identical text. Variants appear in definition order.
#[must_use]
pub fn format_report(experiment: &ExperimentDefinition, analysis: &Analysis) -> String {
    Report {
        experiment,
        analysis,
    }
    .to_string()
}

/// Display adapter behind [`format_report`].
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Experiment being reported on.
    pub experiment: &'a ExperimentDefinition,
    /// Its analysis.
    pub analysis: &'a Analysis,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let experiment = self.experiment;
        let analysis = self.analysis;

        writeln!(f, "Experiment: {} ({})", experiment.name(), experiment.id())?;
        writeln!(f, "Entity: {}", experiment.entity_type())?;
        writeln!(f, "Status: {}", experiment.status())?;
        writeln!(f)?;
        writeln!(f, "Variants:")?;

        for variant in experiment.variants() {
            let marker = if variant.is_control() { " [control]" } else { "" };
            writeln!(f, "  {} ({}){marker}", variant.name(), variant.id())?;

            match analysis.result(variant.id()) {
                Some(result) => {
                    writeln!(f, "    Impressions: {}", result.impressions)?;
                    writeln!(f, "    Conversions: {}", result.conversions)?;
                    writeln!(f, "    Conversion rate: {:.2}%", result.conversion_rate)?;
                    writeln!(f, "    Completion rate: {:.2}%", result.completion_rate)?;
                    writeln!(f, "    Average score: {:.2}", result.average_score)?;
                    writeln!(f, "    Average time: {:.0}s", result.average_time_seconds)?;
                }
                None => writeln!(f, "    No data")?,
            }
        }

        writeln!(f)?;
        match analysis.winner.as_deref() {
            Some(winner_id) => match experiment.variant(winner_id) {
                Some(variant) => writeln!(f, "Winner: {} ({winner_id})", variant.name())?,
                None => writeln!(f, "Winner: {winner_id}")?,
            },
            None => writeln!(f, "Winner: none")?,
        }
        writeln!(f, "Confidence: {}%", analysis.confidence)?;
        write!(f, "Recommendation: {}", analysis.recommendation)
    }
}
