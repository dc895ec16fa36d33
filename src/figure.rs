use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::color::{self, ColorMap};
use crate::data::model::Catalog;
use crate::state::Controls;

/// Marker opacity shared by both plots.
pub const MARKER_ALPHA: f32 = 0.6;

pub const CMD_TITLE: &str = "Color-Mag Diagram";

/// Displayed axis interval. `start > end` means the axis is drawn inverted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    /// Span of the finite values; `[0, 1]` when there are none.
    pub fn of(values: &[f64], inverted: bool) -> Self {
        let (lo, hi) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 1.0));
        if inverted {
            Self { start: hi, end: lo }
        } else {
            Self { start: lo, end: hi }
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Points sharing one marker color.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

/// Everything needed to draw one scatter plot, independent of the toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub series: Vec<Series>,
    pub marker_size: f32,
}

impl ScatterFigure {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

/// The free-axis plot and, when enabled, the color-magnitude diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureSet {
    pub scatter: ScatterFigure,
    pub cmd: Option<ScatterFigure>,
}

fn gather(catalog: &Catalog, column: &str, rows: &[usize]) -> Vec<f64> {
    match catalog.column(column) {
        Some(values) => rows.iter().map(|&r| values[r]).collect(),
        None => vec![f64::NAN; rows.len()],
    }
}

/// Per-row color class keys plus the legend entry of each key. Keys follow
/// palette order so series draw in bucket order.
struct ColorClasses {
    keys: Vec<usize>,
    legend: BTreeMap<usize, (String, Color32)>,
}

const UNBINNED: usize = usize::MAX;

fn color_classes(catalog: &Catalog, controls: &Controls, rows: &[usize]) -> ColorClasses {
    let mut legend = BTreeMap::new();
    let Some(column) = controls.color_by.as_deref() else {
        legend.insert(0, ("sources".to_string(), color::hex_color(color::DEFAULT_MARKER)));
        return ColorClasses {
            keys: vec![0; rows.len()],
            legend,
        };
    };

    let values = gather(catalog, column, rows);
    let map = ColorMap::quantile(column, &values, color::spectral5());
    let keys = values
        .iter()
        .map(|&v| map.bucket(v).unwrap_or(UNBINNED))
        .collect();
    for (i, (label, c)) in map.legend_entries().into_iter().enumerate() {
        legend.insert(i, (format!("{column} {label}"), c));
    }
    legend.insert(UNBINNED, (format!("{column} n/a"), map.color_for(f64::NAN)));

    ColorClasses { keys, legend }
}

#[allow(clippy::too_many_arguments)]
fn scatter(
    title: String,
    x_label: String,
    y_label: String,
    xs: &[f64],
    ys: &[f64],
    (invert_x, invert_y): (bool, bool),
    classes: &ColorClasses,
    marker_size: f32,
) -> ScatterFigure {
    let mut grouped: BTreeMap<usize, Vec<[f64; 2]>> = BTreeMap::new();
    for ((&x, &y), &key) in xs.iter().zip(ys).zip(&classes.keys) {
        if x.is_finite() && y.is_finite() {
            grouped.entry(key).or_default().push([x, y]);
        }
    }

    let series = grouped
        .into_iter()
        .filter_map(|(key, points)| {
            let (label, color) = classes.legend.get(&key)?.clone();
            Some(Series {
                label,
                color: color.gamma_multiply(MARKER_ALPHA),
                points,
            })
        })
        .collect();

    ScatterFigure {
        title,
        x_label,
        y_label,
        x_range: AxisRange::of(xs, invert_x),
        y_range: AxisRange::of(ys, invert_y),
        series,
        marker_size,
    }
}

/// Project the filtered rows into figures. Pure: same inputs, same figures.
pub fn project(catalog: &Catalog, target: &str, controls: &Controls, rows: &[usize]) -> FigureSet {
    let classes = color_classes(catalog, controls, rows);

    let xs = gather(catalog, &controls.x_column, rows);
    let ys = gather(catalog, &controls.y_column, rows);
    let free = scatter(
        target.to_string(),
        controls.x_column.clone(),
        controls.y_column.clone(),
        &xs,
        &ys,
        (controls.invert_x, controls.invert_y),
        &classes,
        controls.marker_size,
    );

    let cmd = controls.show_cmd.then(|| {
        let color_column = controls.pair.color_column();
        let mag_column = controls.pair.magnitude_column();
        let cs = gather(catalog, &color_column, rows);
        let ms = gather(catalog, &mag_column, rows);
        // Brighter is up: magnitude axis always inverted.
        scatter(
            CMD_TITLE.to_string(),
            color_column,
            mag_column,
            &cs,
            &ms,
            (false, true),
            &classes,
            controls.marker_size,
        )
    });

    FigureSet { scatter: free, cmd }
}
