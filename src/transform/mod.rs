//! Placement math: normalized, anchor-relative parameters to pixel-space affines.

pub(crate) mod placement;
