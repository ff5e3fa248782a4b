//! Diagnostics returned alongside every generated surface.
//!
//! Counts describe how the field behaved during sampling (undefined samples,
//! placeholder vertices, indeterminate cubes) and what the resulting mesh looks
//! like (vertex sharing, open and non-manifold edges).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::metrics::FieldTimingReport;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeshDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,

    /// Field evaluations performed, one per grid or lattice point.
    pub sample_count: usize,

    /// Samples that faulted or produced a non-finite value.
    pub undefined_sample_count: usize,

    /// Height-field vertices parked at the origin for undefined samples.
    pub placeholder_vertex_count: usize,

    /// Cubes whose configuration was neither empty nor full.
    pub active_cube_count: usize,

    /// Cubes with at least one undefined corner.
    ///
    /// Under `UndefinedCornerPolicy::SkipCube` these emit no triangles; under
    /// `Outside` they are still counted so callers can see where the field
    /// was singular.
    pub indeterminate_cube_count: usize,

    /// Edge-vertex lookups answered by the cache instead of a new vertex.
    pub shared_vertex_count: usize,

    /// Edges used by exactly one triangle.
    pub open_edge_count: usize,

    /// Edges used by more than two triangles.
    pub non_manifold_edge_count: usize,

    /// Min/max over the finite samples, `None` if there were none.
    pub value_range: Option<(f64, f64)>,

    /// Only populated with the `mesh_engine_metrics` feature on non-wasm targets.
    pub timing: Option<FieldTimingReport>,

    pub warnings: Vec<String>,
}

impl FieldMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// `true` when every sample was defined and nothing was flagged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.undefined_sample_count == 0
            && self.indeterminate_cube_count == 0
            && self.is_manifold()
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Fills the open and non-manifold edge counts from a triangle list.
    pub fn record_topology(&mut self, indices: &[u32]) {
        let (open, non_manifold) = count_edge_topology(indices);
        self.open_edge_count = open;
        self.non_manifold_edge_count = non_manifold;
    }

    /// Short one-line form for logs: `"V:{vertices} T:{triangles} [issues...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.undefined_sample_count > 0 {
            parts.push(format!(
                "undefined:{}/{}",
                self.undefined_sample_count, self.sample_count
            ));
        }
        if self.placeholder_vertex_count > 0 {
            parts.push(format!("placeholders:{}", self.placeholder_vertex_count));
        }
        if self.indeterminate_cube_count > 0 {
            parts.push(format!("indeterminate:{}", self.indeterminate_cube_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }

        parts.join(" ")
    }
}

impl fmt::Display for FieldMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Field Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(
            f,
            "  Samples: {} ({} undefined)",
            self.sample_count, self.undefined_sample_count
        )?;
        if let Some((min, max)) = self.value_range {
            writeln!(f, "  Value range: [{min}, {max}]")?;
        }
        if self.active_cube_count > 0 || self.indeterminate_cube_count > 0 {
            writeln!(
                f,
                "  Cubes: {} active, {} indeterminate",
                self.active_cube_count, self.indeterminate_cube_count
            )?;
            writeln!(f, "  Shared vertex lookups: {}", self.shared_vertex_count)?;
        }
        if self.placeholder_vertex_count > 0 {
            writeln!(f, "  Placeholder vertices: {}", self.placeholder_vertex_count)?;
        }
        writeln!(
            f,
            "  Edges: {} open, {} non-manifold",
            self.open_edge_count, self.non_manifold_edge_count
        )?;

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_clean() { "CLEAN" } else { "ISSUES DETECTED" };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}

/// Counts undirected edges used by one triangle and by more than two.
#[must_use]
pub fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut uses: HashMap<(u32, u32), usize> = HashMap::new();
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    let open = uses.values().filter(|&&count| count == 1).count();
    let non_manifold = uses.values().filter(|&&count| count > 2).count();
    (open, non_manifold)
}
