use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

/// Five-class diverging "Spectral" palette used for color-by bucketing.
pub const SPECTRAL5: [&str; 5] = ["#2b83ba", "#abdda4", "#ffffbf", "#fdae61", "#d7191c"];

/// Marker color when no color-by column is selected.
pub const DEFAULT_MARKER: &str = "#31AADE";

/// Parse a `#rrggbb` string into a [`Color32`]; unparsable input maps to gray.
pub fn hex_color(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("invalid color {hex}: {e}");
            Color32::GRAY
        }
    }
}

pub fn spectral5() -> Vec<Color32> {
    SPECTRAL5.iter().map(|h| hex_color(h)).collect()
}

// ---------------------------------------------------------------------------
// Quantile bucketing
// ---------------------------------------------------------------------------

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Bucket edges at the `0, 1/n, …, 1` quantiles of the finite values, with
/// duplicate edges dropped. Empty when there is nothing finite.
pub fn quantile_edges(values: &[f64], n: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || n == 0 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = (0..=n)
        .map(|k| quantile(&sorted, k as f64 / n as f64))
        .collect();
    edges.dedup();
    edges
}

/// Bucket index of `value` for right-closed intervals
/// `[e0, e1], (e1, e2], …`. A single edge yields one bucket.
pub fn bucket_of(edges: &[f64], value: f64) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if !value.is_finite() || value < first || value > last {
        return None;
    }
    Some(edges.partition_point(|&e| e < value).saturating_sub(1))
}

// ---------------------------------------------------------------------------
// Color mapping: numeric column value → Color32
// ---------------------------------------------------------------------------

/// Maps a numeric column to palette colors by quantile bucket.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    edges: Vec<f64>,
    palette: Vec<Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a color map for `column` from the values currently on screen.
    pub fn quantile(column: &str, values: &[f64], palette: Vec<Color32>) -> Self {
        ColorMap {
            column: column.to_string(),
            edges: quantile_edges(values, palette.len()),
            palette,
            default_color: Color32::GRAY,
        }
    }

    /// Palette index for a value, `None` when it falls in no bucket.
    pub fn bucket(&self, value: f64) -> Option<usize> {
        bucket_of(&self.edges, value).filter(|&i| i < self.palette.len())
    }

    /// Look up the color for a value; non-finite values get the default.
    pub fn color_for(&self, value: f64) -> Color32 {
        self.bucket(value)
            .and_then(|i| self.palette.get(i))
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (bucket label → color) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        if let ([edge], Some(&c)) = (self.edges.as_slice(), self.palette.first()) {
            return vec![(format!("{edge:.3}"), c)];
        }
        self.edges
            .windows(2)
            .zip(&self.palette)
            .enumerate()
            .map(|(i, (w, c))| {
                let open = if i == 0 { '[' } else { '(' };
                (format!("{open}{:.3}, {:.3}]", w[0], w[1]), *c)
            })
            .collect()
    }
}
