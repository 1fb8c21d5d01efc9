//! Per-phase accumulation and the final migration summary

use std::time::Duration;

use crate::error::MigrationError;
use crate::sink::BulkWriteResponse;

/// Pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connectivity and partitioning compatibility checks
    Init,
    /// Vertex streaming, index population, vertex bulk writes
    Vertices,
    /// Edge streaming and edge bulk writes
    Edges,
    /// Both phases drained and acknowledged
    Done,
}

impl Phase {
    /// Human-readable phase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Vertices => "vertices",
            Self::Edges => "edges",
            Self::Done => "done",
        }
    }
}

/// Counts, wall time, and cost units accumulated over one phase.
#[derive(Debug, Clone, Default)]
pub struct PhaseStats {
    /// Elements acknowledged by the sink
    pub imported: u64,
    /// Wall time spent inside the sink for this phase
    pub elapsed: Duration,
    /// Destination-defined cost units consumed
    pub cost_units: f64,
}

impl PhaseStats {
    /// Fold one acknowledged bulk write into the phase totals.
    pub fn absorb(&mut self, response: &BulkWriteResponse) {
        self.imported += response.written;
        self.elapsed += response.elapsed;
        self.cost_units += response.cost_units;
    }
}

/// Final (or partial, on failure) outcome of a migration run.
///
/// Vertex-phase totals survive an edge-phase failure, so a failed run still
/// reports everything it managed to import.
#[derive(Debug)]
pub struct MigrationReport {
    /// Phase the run reached
    pub phase: Phase,
    /// Vertex phase totals
    pub vertices: PhaseStats,
    /// Edge phase totals
    pub edges: PhaseStats,
    /// Source-side vertex count, when the source could report one
    pub source_vertices: Option<u64>,
    /// Source-side edge count, when the source could report one
    pub source_edges: Option<u64>,
    /// The error that stopped the run, if any
    pub failure: Option<MigrationError>,
}

impl MigrationReport {
    /// Whether the run drained both phases without error.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.phase == Phase::Done
    }

    fn total_imported(&self) -> u64 {
        self.vertices.imported + self.edges.imported
    }

    fn total_elapsed(&self) -> Duration {
        self.vertices.elapsed + self.edges.elapsed
    }

    fn total_cost(&self) -> f64 {
        self.vertices.cost_units + self.edges.cost_units
    }

    /// Combined elements per second across both phases.
    #[must_use]
    pub fn combined_rate(&self) -> f64 {
        let secs = self.total_elapsed().as_secs_f64();
        if secs > 0.0 {
            self.total_imported() as f64 / secs
        } else {
            0.0
        }
    }

    /// Combined cost units per second across both phases.
    #[must_use]
    pub fn combined_cost_rate(&self) -> f64 {
        let secs = self.total_elapsed().as_secs_f64();
        if secs > 0.0 {
            self.total_cost() / secs
        } else {
            0.0
        }
    }

    /// Average cost units per imported element.
    #[must_use]
    pub fn avg_cost_per_element(&self) -> f64 {
        let imported = self.total_imported();
        if imported > 0 {
            self.total_cost() / imported as f64
        } else {
            0.0
        }
    }

    /// Imported-vs-source count comparison for validation runs.
    #[must_use]
    pub fn count_check(&self) -> CountCheck {
        CountCheck {
            source_vertices: self.source_vertices,
            source_edges: self.source_edges,
            imported_vertices: self.vertices.imported,
            imported_edges: self.edges.imported,
        }
    }

    /// Print the final summary to the console.
    pub fn print_summary(&self) {
        println!("\nMigration Summary");
        println!("=================");
        println!("Phase reached: {}", self.phase.name());
        println!(
            "Vertices imported: {} in {:.2?} ({:.1} cost units)",
            self.vertices.imported, self.vertices.elapsed, self.vertices.cost_units
        );
        println!(
            "Edges imported: {} in {:.2?} ({:.1} cost units)",
            self.edges.imported, self.edges.elapsed, self.edges.cost_units
        );
        println!("Combined rate: {:.0} elements/sec", self.combined_rate());
        println!(
            "Combined cost rate: {:.1} units/sec",
            self.combined_cost_rate()
        );
        println!(
            "Average cost per element: {:.2}",
            self.avg_cost_per_element()
        );
        if let Some(err) = &self.failure {
            println!("Failed: {err}");
        }
    }
}

/// Imported counts compared against the source's own counts.
#[derive(Debug, Clone)]
pub struct CountCheck {
    /// Vertices the source reported
    pub source_vertices: Option<u64>,
    /// Edges the source reported
    pub source_edges: Option<u64>,
    /// Vertices acknowledged by the sink
    pub imported_vertices: u64,
    /// Edges acknowledged by the sink
    pub imported_edges: u64,
}

impl CountCheck {
    /// True when every known source count matches its imported count.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.source_vertices
            .is_none_or(|n| n == self.imported_vertices)
            && self.source_edges.is_none_or(|n| n == self.imported_edges)
    }

    /// Print the count comparison to the console.
    pub fn print(&self) {
        println!("\nCount Validation Report");
        println!("=======================");
        match self.source_vertices {
            Some(n) => println!("Vertices: {} imported / {} in source", self.imported_vertices, n),
            None => println!("Vertices: {} imported / source count unknown", self.imported_vertices),
        }
        match self.source_edges {
            Some(n) => println!("Edges: {} imported / {} in source", self.imported_edges, n),
            None => println!("Edges: {} imported / source count unknown", self.imported_edges),
        }
        println!("Status: {}", if self.passed() { "PASSED" } else { "FAILED" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(written: u64, millis: u64, cost: f64) -> BulkWriteResponse {
        BulkWriteResponse {
            written,
            elapsed: Duration::from_millis(millis),
            cost_units: cost,
        }
    }

    #[test]
    fn phase_stats_accumulate_across_batches() {
        let mut stats = PhaseStats::default();
        stats.absorb(&response(3, 100, 12.0));
        stats.absorb(&response(2, 50, 8.0));
        assert_eq!(stats.imported, 5);
        assert_eq!(stats.elapsed, Duration::from_millis(150));
        assert!((stats.cost_units - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn combined_summary_math() {
        let mut vertices = PhaseStats::default();
        vertices.absorb(&response(3, 1000, 30.0));
        let mut edges = PhaseStats::default();
        edges.absorb(&response(2, 1000, 10.0));

        let report = MigrationReport {
            phase: Phase::Done,
            vertices,
            edges,
            source_vertices: Some(3),
            source_edges: Some(2),
            failure: None,
        };

        assert!(report.succeeded());
        assert!((report.combined_rate() - 2.5).abs() < 1e-9);
        assert!((report.combined_cost_rate() - 20.0).abs() < 1e-9);
        assert!((report.avg_cost_per_element() - 8.0).abs() < 1e-9);
        assert!(report.count_check().passed());
    }

    #[test]
    fn empty_report_divides_safely() {
        let report = MigrationReport {
            phase: Phase::Init,
            vertices: PhaseStats::default(),
            edges: PhaseStats::default(),
            source_vertices: None,
            source_edges: None,
            failure: None,
        };
        assert_eq!(report.combined_rate(), 0.0);
        assert_eq!(report.avg_cost_per_element(), 0.0);
    }

    #[test]
    fn count_check_fails_on_shortfall() {
        let check = CountCheck {
            source_vertices: Some(3),
            source_edges: Some(2),
            imported_vertices: 3,
            imported_edges: 1,
        };
        assert!(!check.passed());
    }
}
