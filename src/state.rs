use std::ops::RangeInclusive;

use crate::data::filter::{limit_data, slider_limits, FilterBounds, RangeBound};
use crate::data::loader::{LoadError, LoadedCatalog};
use crate::data::model::{band_column, BandPair, Statistic, MAGNITUDE_SUFFIX};
use crate::figure::{self, FigureSet};

pub const MARKER_SIZE_RANGE: RangeInclusive<f32> = 0.1..=10.0;
pub const DEFAULT_MARKER_SIZE: f32 = 4.0;

// ---------------------------------------------------------------------------
// Controls – every user-editable value
// ---------------------------------------------------------------------------

/// Current value of every control in the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub pair: BandPair,
    pub x_column: String,
    pub y_column: String,
    /// `None` draws every marker in the default color.
    pub color_by: Option<String>,
    pub marker_size: f32,
    pub invert_x: bool,
    pub invert_y: bool,
    pub show_cmd: bool,
    pub bounds: FilterBounds,
}

/// A single control edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    SelectPair(BandPair),
    SelectX(String),
    SelectY(String),
    ColorBy(Option<String>),
    MarkerSize(f32),
    InvertX(bool),
    InvertY(bool),
    ShowCmd(bool),
    SetBound(Statistic, RangeBound),
    ResetBounds(FilterBounds),
}

impl Controls {
    /// Startup values: x = second band magnitude, y = its error, bounds wide open.
    pub fn initial(pair: &BandPair, limits: FilterBounds) -> Self {
        Self {
            pair: pair.clone(),
            x_column: band_column(&pair.second, MAGNITUDE_SUFFIX),
            y_column: band_column(&pair.second, Statistic::Err.suffix()),
            color_by: None,
            marker_size: DEFAULT_MARKER_SIZE,
            invert_x: false,
            invert_y: false,
            show_cmd: true,
            bounds: limits,
        }
    }

    /// The state transition: old controls + one edit → new controls.
    pub fn apply(mut self, event: ControlEvent) -> Self {
        match event {
            ControlEvent::SelectPair(pair) => self.pair = pair,
            ControlEvent::SelectX(col) => self.x_column = col,
            ControlEvent::SelectY(col) => self.y_column = col,
            ControlEvent::ColorBy(col) => self.color_by = col,
            ControlEvent::MarkerSize(size) => {
                self.marker_size = size.clamp(*MARKER_SIZE_RANGE.start(), *MARKER_SIZE_RANGE.end())
            }
            ControlEvent::InvertX(on) => self.invert_x = on,
            ControlEvent::InvertY(on) => self.invert_y = on,
            ControlEvent::ShowCmd(on) => self.show_cmd = on,
            ControlEvent::SetBound(stat, bound) => self.bounds.set(stat, bound),
            ControlEvent::ResetBounds(bounds) => self.bounds = bounds,
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub source: LoadedCatalog,

    /// Slider extents, fixed when the catalog is loaded.
    pub limits: FilterBounds,

    pub controls: Controls,

    /// Indices of sources passing the current filters.
    pub visible_rows: Vec<usize>,

    pub figures: FigureSet,

    /// Bumped on every redraw so the plots drop their zoom state.
    pub revision: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: LoadedCatalog) -> Result<Self, LoadError> {
        let pair = source.pairs.first().cloned().ok_or(LoadError::TooFewBands(0))?;
        let limits = slider_limits(&source.catalog, &pair);
        let controls = Controls::initial(&pair, limits);
        let visible_rows = limit_data(&source.catalog, &controls.pair, &controls.bounds);
        let figures = figure::project(&source.catalog, &source.target, &controls, &visible_rows);

        Ok(Self {
            source,
            limits,
            controls,
            visible_rows,
            figures,
            revision: 0,
            status_message: None,
        })
    }

    /// Replace the catalog (File → Open…); controls and limits start over.
    pub fn set_catalog(&mut self, source: LoadedCatalog) -> Result<(), LoadError> {
        *self = AppState::new(source)?;
        Ok(())
    }

    /// Column names offered in the axis and color-by selectors.
    pub fn columns(&self) -> &[String] {
        self.source.catalog.column_names()
    }

    /// Apply one control edit and redraw. Edits naming an unknown band pair
    /// or column are ignored.
    pub fn dispatch(&mut self, event: ControlEvent) {
        if let Some(reason) = self.reject(&event) {
            log::warn!("ignoring {event:?}: {reason}");
            return;
        }
        log::debug!("{event:?}");
        self.controls = self.controls.clone().apply(event);
        self.refresh();
    }

    fn reject(&self, event: &ControlEvent) -> Option<String> {
        let catalog = &self.source.catalog;
        match event {
            ControlEvent::SelectPair(pair) if !self.source.pairs.contains(pair) => {
                Some(format!("unknown band pair {pair}"))
            }
            ControlEvent::SelectX(col)
            | ControlEvent::SelectY(col)
            | ControlEvent::ColorBy(Some(col))
                if !catalog.has_column(col) =>
            {
                Some(format!("unknown column {col}"))
            }
            _ => None,
        }
    }

    /// Recompute the filtered rows and the figures from the current controls.
    pub fn refresh(&mut self) {
        let catalog = &self.source.catalog;
        self.visible_rows = limit_data(catalog, &self.controls.pair, &self.controls.bounds);
        self.figures = figure::project(
            catalog,
            &self.source.target,
            &self.controls,
            &self.visible_rows,
        );
        self.revision += 1;
        log::debug!(
            "{} of {} sources pass the filters",
            self.visible_rows.len(),
            catalog.len()
        );
    }

    pub fn reset_bounds(&mut self) {
        self.dispatch(ControlEvent::ResetBounds(self.limits));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Catalog;
    use std::path::PathBuf;

    fn source() -> LoadedCatalog {
        let stats = |snr: [f64; 3]| {
            vec![
                ("SNR", snr.to_vec()),
                ("ERR", vec![0.01, 0.02, 0.5]),
                ("SHARP", vec![0.0, 0.01, 0.02]),
                ("ROUND", vec![0.1, 0.2, 0.3]),
                ("CROWD", vec![0.0, 0.1, 0.2]),
                ("CHI", vec![1.0, 1.1, 1.2]),
            ]
        };
        let mut columns = Vec::new();
        for (band, mags, snr) in [
            ("F475W", [24.0, 99.999, 26.0], [40.0, 0.0, 8.0]),
            ("F814W", [23.0, 22.0, 25.0], [60.0, 70.0, 6.0]),
            ("F110W", [22.0, 21.0, 24.0], [80.0, 75.0, 10.0]),
        ] {
            columns.push((band_column(band, MAGNITUDE_SUFFIX), mags.to_vec()));
            for (suffix, values) in stats(snr) {
                columns.push((band_column(band, suffix), values));
            }
        }
        let mut catalog = Catalog::from_columns(columns).unwrap();
        let pairs = catalog.add_color_columns();
        LoadedCatalog {
            catalog,
            target: "HODGE6".to_string(),
            path: PathBuf::from("gst/HODGE6.gst.fits"),
            pairs,
        }
    }

    #[test]
    fn initial_state_uses_first_pair() {
        let state = AppState::new(source()).unwrap();
        assert_eq!(state.controls.pair, BandPair::new("F475W", "F814W"));
        assert_eq!(state.controls.x_column, "F814W_VEGA");
        assert_eq!(state.controls.y_column, "F814W_ERR");
        assert_eq!(state.controls.bounds, state.limits);
        // Row 1 is a F475W non-detection.
        assert_eq!(state.visible_rows, vec![0, 2]);
        assert!(state.figures.cmd.is_some());
    }

    #[test]
    fn transition_is_a_pure_function_of_old_controls() {
        let state = AppState::new(source()).unwrap();
        let before = state.controls.clone();
        let after = before
            .clone()
            .apply(ControlEvent::InvertY(true))
            .apply(ControlEvent::MarkerSize(25.0));
        assert!(after.invert_y);
        assert_eq!(after.marker_size, 10.0);
        assert_eq!(after.pair, before.pair);
        assert_eq!(state.controls, before);
    }

    #[test]
    fn bound_edit_refilters() {
        let mut state = AppState::new(source()).unwrap();
        let rev = state.revision;
        state.dispatch(ControlEvent::SetBound(Statistic::Snr, RangeBound::new(10.0, 100.0)));
        assert_eq!(state.visible_rows, vec![0]);
        assert!(state.revision > rev);

        state.reset_bounds();
        assert_eq!(state.visible_rows, vec![0, 2]);
    }

    #[test]
    fn inversion_survives_other_edits() {
        let mut state = AppState::new(source()).unwrap();
        state.dispatch(ControlEvent::InvertX(true));
        state.dispatch(ControlEvent::SelectY("F814W_SNR".to_string()));
        assert!(state.figures.scatter.x_range.is_inverted());
        assert_eq!(state.figures.scatter.y_label, "F814W_SNR");
    }

    #[test]
    fn pair_change_switches_cmd_and_filter_bands() {
        let mut state = AppState::new(source()).unwrap();
        state.dispatch(ControlEvent::SelectPair(BandPair::new("F814W", "F110W")));
        // No F475W constraint any more, so the non-detection row comes back.
        assert_eq!(state.visible_rows, vec![0, 1, 2]);
        let cmd = state.figures.cmd.as_ref().unwrap();
        assert_eq!(cmd.x_label, "F814W-F110W");
        assert_eq!(cmd.y_label, "F110W_VEGA");
    }

    #[test]
    fn unknown_targets_are_ignored() {
        let mut state = AppState::new(source()).unwrap();
        let before = state.controls.clone();
        state.dispatch(ControlEvent::SelectX("NOPE".to_string()));
        state.dispatch(ControlEvent::SelectPair(BandPair::new("F110W", "F475W")));
        assert_eq!(state.controls, before);
    }

    #[test]
    fn failed_catalog_swap_keeps_current_state() {
        let mut state = AppState::new(source()).unwrap();
        state.dispatch(ControlEvent::SetBound(Statistic::Snr, RangeBound::new(10.0, 100.0)));
        let (controls, rows) = (state.controls.clone(), state.visible_rows.clone());

        // One wide band: no color pair to start from.
        let catalog = Catalog::from_columns(vec![
            ("F475W_VEGA".to_string(), vec![24.0]),
            ("F475W_SNR".to_string(), vec![40.0]),
        ])
        .unwrap();
        let single = LoadedCatalog {
            catalog,
            target: "SINGLE".to_string(),
            path: PathBuf::from("gst/SINGLE.gst.fits"),
            pairs: Vec::new(),
        };
        assert!(matches!(
            state.set_catalog(single),
            Err(LoadError::TooFewBands(0))
        ));
        assert_eq!(state.controls, controls);
        assert_eq!(state.visible_rows, rows);
        assert_eq!(state.source.target, "HODGE6");
    }

    #[test]
    fn empty_selection_still_projects() {
        let mut state = AppState::new(source()).unwrap();
        state.dispatch(ControlEvent::SetBound(Statistic::Chi, RangeBound::new(5.0, 6.0)));
        assert!(state.visible_rows.is_empty());
        assert!(state.figures.scatter.is_empty());
    }
}
