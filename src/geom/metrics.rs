//! Opt-in timing hooks for the field evaluators.
//!
//! Timing is only collected when the `mesh_engine_metrics` feature is enabled
//! and the target is not `wasm32` (`std::time::Instant` is unavailable there).
//! Otherwise every call compiles down to running the closure.

use serde::Serialize;

/// Phases of a height-field or isosurface build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Evaluating the field over the sample grid or lattice.
    Sampling,
    /// Marching cubes classification and edge interpolation.
    Extraction,
    /// Quad-grid index generation.
    Triangulation,
    /// Per-vertex normal accumulation.
    Normals,
    /// Height or domain coloring.
    Coloring,
    /// Edge topology counts.
    Diagnostics,
}

/// Cumulative nanoseconds per [`TimingBucket`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTimingReport {
    pub sampling_ns: u64,
    pub extraction_ns: u64,
    pub triangulation_ns: u64,
    pub normals_ns: u64,
    pub coloring_ns: u64,
    pub diagnostics_ns: u64,
}

impl FieldTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.sampling_ns
            .saturating_add(self.extraction_ns)
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.normals_ns)
            .saturating_add(self.coloring_ns)
            .saturating_add(self.diagnostics_ns)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    #[cfg_attr(
        not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))),
        allow(dead_code)
    )]
    fn slot(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Sampling => &mut self.sampling_ns,
            TimingBucket::Extraction => &mut self.extraction_ns,
            TimingBucket::Triangulation => &mut self.triangulation_ns,
            TimingBucket::Normals => &mut self.normals_ns,
            TimingBucket::Coloring => &mut self.coloring_ns,
            TimingBucket::Diagnostics => &mut self.diagnostics_ns,
        }
    }
}

/// Accumulates phase timings for one evaluator call.
#[derive(Debug, Default)]
pub struct FieldMetrics {
    #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
    report: FieldTimingReport,
}

impl FieldMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = FieldTimingReport::default();
        }
    }

    /// The accumulated report, or `None` when metrics are compiled out.
    #[must_use]
    pub fn end(&self) -> Option<FieldTimingReport> {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f`, adding its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            let slot = self.report.slot(bucket);
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
