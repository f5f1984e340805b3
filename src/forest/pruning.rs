//! Terrain-adaptive pruning support: slope field computation.

use crate::terrain::{normalize_field, Heightmap};

/// Result of a pruning pass.
#[derive(Debug, Clone)]
pub struct PruneOutcome {
    /// Number of trees removed.
    pub removed: usize,
    /// The normalized slope magnitude field the pass was evaluated
    /// against, kept for export or inspection.
    pub slope: Vec<f32>,
}

/// Computes the normalized slope magnitude field of a heightmap.
///
/// The gradient uses central differences in the interior and one-sided
/// differences at the borders; the magnitude field is normalized to [0, 1]
/// the same way the heightmap is, including the degenerate flat-field
/// fallback.
pub fn slope_field(heightmap: &Heightmap) -> Vec<f32> {
    let width = heightmap.width();
    let height = heightmap.height();
    let mut field = vec![0.0f32; heightmap.len()];

    for y in 0..height {
        for x in 0..width {
            let left = heightmap.get(x.saturating_sub(1), y);
            let right = heightmap.get((x + 1).min(width - 1), y);
            let dx_span = ((x + 1).min(width - 1) - x.saturating_sub(1)) as f32;

            let up = heightmap.get(x, y.saturating_sub(1));
            let down = heightmap.get(x, (y + 1).min(height - 1));
            let dy_span = ((y + 1).min(height - 1) - y.saturating_sub(1)) as f32;

            let dzdx = if dx_span > 0.0 { (right - left) / dx_span } else { 0.0 };
            let dzdy = if dy_span > 0.0 { (down - up) / dy_span } else { 0.0 };

            field[(y * width + x) as usize] = (dzdx * dzdx + dzdy * dzdy).sqrt();
        }
    }

    normalize_field(&mut field);
    field
}
