//! Tunable parameters for the ChESS engine.
//!
//! The upstream detector this crate implements (mrgingham) carries two
//! near-duplicate parameter sets baked into two code paths: an initial-pass
//! set (`R=5`, peak threshold 200, stdev threshold 25) and a
//! refinement-pass set (`R=10`, peak threshold 120, stdev threshold 20).
//! `ChessParams::use_radius10` makes that a single runtime switch instead of
//! two copies of the algorithm.

/// Sub-pixel refinement strategy applied to an accepted connected component.
///
/// Only one concrete strategy exists today. The enum (rather than a single
/// hardcoded function) leaves room for an alternative strategy to be added
/// later without breaking `ChessParams`'s shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RefinerKind {
    /// Intensity-weighted centroid of the accepted component (spec §4.3).
    #[default]
    Centroid,
}

/// A refinement strategy bound to a `RefinerKind`.
///
/// Exists as its own type (rather than a bare function pointer) so a future
/// refiner can carry state across calls within one detector invocation.
#[derive(Clone, Copy, Debug)]
pub struct Refiner {
    kind: RefinerKind,
}

impl Refiner {
    pub fn from_kind(kind: RefinerKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> RefinerKind {
        self.kind
    }
}

/// Response/variance thresholds governing the connected-component tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChessParams {
    /// Selects the refinement-era constants (`true`, the default) or the
    /// legacy initial-pass constants (`false`). See [`ChessParams::legacy`].
    pub use_radius10: bool,
    /// Overrides the variance-gate window radius independently of
    /// `use_radius10`, for callers who want the initial-pass response
    /// thresholds with the refinement-era variance window or vice versa.
    pub descriptor_use_radius10: Option<bool>,
    /// Response threshold for component seeding, expressed as a fraction of
    /// the strongest positive response observed in the current response
    /// field. Ignored when `threshold_abs` is set.
    pub threshold_rel: f32,
    /// Absolute response threshold overriding `threshold_rel` when present.
    /// Set this to reproduce the fixed mrgingham constants exactly.
    pub threshold_abs: Option<f32>,
    /// Minimum pixel separation enforced between reported centroids in a
    /// single scan, applied as a post-process dedupe pass after connected
    /// components are extracted.
    pub nms_radius: u32,
    /// Minimum accepted pixel count for a connected component (spec:
    /// `CC_MIN_SIZE`).
    pub min_cluster_size: u32,
    /// Sub-pixel refinement strategy for accepted components.
    pub refiner: RefinerKind,
}

impl ChessParams {
    /// The ChESS operator's output is unspecified within this many pixels of
    /// the image border. This is a property of the 16-sample, radius-5 ring
    /// the response operator uses, not a user-tunable knob.
    pub const MARGIN: i32 = 7;

    /// Refinement-era constants: `R=10`, stdev threshold 20, peak threshold
    /// 120, seed threshold 15. The default preset.
    pub fn modern() -> Self {
        Self {
            use_radius10: true,
            descriptor_use_radius10: None,
            threshold_rel: 0.15,
            threshold_abs: None,
            nms_radius: 3,
            min_cluster_size: 2,
            refiner: RefinerKind::Centroid,
        }
    }

    /// Initial-pass constants: `R=5`, stdev threshold 25, peak threshold
    /// 200, seed threshold 20.
    pub fn legacy() -> Self {
        Self {
            use_radius10: false,
            ..Self::modern()
        }
    }

    /// Variance-gate window radius this parameter set uses. Public because
    /// orientation estimation in `chess-corners` samples the same window.
    pub fn constancy_window_r(&self) -> i32 {
        if self.descriptor_use_radius10.unwrap_or(self.use_radius10) {
            10
        } else {
            5
        }
    }

    pub(crate) fn stdev_threshold(&self) -> i32 {
        if self.use_radius10 {
            20
        } else {
            25
        }
    }

    pub(crate) fn variance_threshold(&self) -> i32 {
        let t = self.stdev_threshold();
        t * t
    }

    pub(crate) fn response_min_peak_threshold(&self) -> i16 {
        if self.use_radius10 {
            120
        } else {
            200
        }
    }

    pub(crate) fn response_min_threshold_fixed(&self) -> i16 {
        if self.use_radius10 {
            15
        } else {
            20
        }
    }

    /// The response-seed threshold to use for a response field whose
    /// strongest positive value is `max_response`.
    pub(crate) fn response_min_threshold(&self, max_response: i16) -> i16 {
        if let Some(abs) = self.threshold_abs {
            return abs.round() as i16;
        }
        let rel = (max_response as f32 * self.threshold_rel).round() as i16;
        rel.max(self.response_min_threshold_fixed())
    }
}

impl Default for ChessParams {
    fn default() -> Self {
        Self::modern()
    }
}

/// Image-pyramid construction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PyramidParams {
    /// Number of levels to build, including level 0 (the original image).
    /// `num_levels = 1` disables downsampling entirely.
    pub num_levels: u8,
    /// Stop building coarser levels once either dimension would drop below
    /// this many pixels.
    pub min_size: usize,
}

impl Default for PyramidParams {
    fn default() -> Self {
        Self {
            num_levels: 4,
            min_size: 64,
        }
    }
}

/// Parameters for the coarse-to-fine (detect-then-refine) protocol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoarseToFineParams {
    pub pyramid: PyramidParams,
    /// Half-width of the seed neighborhood used when re-entering the
    /// tracker during per-point refinement (spec §4.3's "3x3 neighborhood").
    pub refinement_radius: u32,
    /// Points within this many full-image pixels of each other after
    /// refinement are considered duplicates of the same corner.
    pub merge_radius: f32,
}

impl Default for CoarseToFineParams {
    fn default() -> Self {
        Self {
            pyramid: PyramidParams::default(),
            refinement_radius: 1,
            merge_radius: 2.0,
        }
    }
}

/// Top-level detector configuration: response/tracker thresholds plus the
/// multiscale protocol used to reach them.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ChessConfig {
    pub params: ChessParams,
    pub multiscale: CoarseToFineParams,
}

impl ChessConfig {
    /// Run the tracker once at level 0, with no pyramid and no refinement
    /// pass. Appropriate for callers that only need raw corners and will do
    /// their own geometric refinement downstream (e.g. a ChArUco or marker
    /// detector validating corners against a homography).
    pub fn single_scale() -> Self {
        Self {
            params: ChessParams::default(),
            multiscale: CoarseToFineParams {
                pyramid: PyramidParams {
                    num_levels: 1,
                    min_size: 1,
                },
                ..CoarseToFineParams::default()
            },
        }
    }

    /// The full coarse-to-fine protocol: detect at the coarsest level that
    /// yields results, then refine down to level 0.
    pub fn coarse_to_fine() -> Self {
        Self::default()
    }
}
