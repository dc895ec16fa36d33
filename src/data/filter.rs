use super::model::{band_column, BandPair, Catalog, Statistic, MAGNITUDE_SUFFIX};

/// Sources with |VEGA| above this are not recovered in that band.
pub const DETECTION_LIMIT: f64 = 60.0;

/// Sources with VEGA at or above this are flagged as non-detections by DOLPHOT.
pub const NON_DETECTION: f64 = 90.0;

// ---------------------------------------------------------------------------
// RangeBound / FilterBounds
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` interval. NaN never falls inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBound {
    pub min: f64,
    pub max: f64,
}

impl RangeBound {
    /// Build a bound, swapping the ends if they arrive reversed.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One inclusive range per statistic, applied to both bands of the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterBounds {
    pub snr: RangeBound,
    pub err: RangeBound,
    pub sharp: RangeBound,
    pub round: RangeBound,
    pub crowd: RangeBound,
    pub chi: RangeBound,
}

impl FilterBounds {
    /// Bounds that reject nothing.
    pub fn unbounded() -> Self {
        let all = RangeBound::new(f64::NEG_INFINITY, f64::INFINITY);
        Self {
            snr: all,
            err: all,
            sharp: all,
            round: all,
            crowd: all,
            chi: all,
        }
    }

    pub fn get(&self, stat: Statistic) -> RangeBound {
        match stat {
            Statistic::Snr => self.snr,
            Statistic::Err => self.err,
            Statistic::Sharp => self.sharp,
            Statistic::Round => self.round,
            Statistic::Crowd => self.crowd,
            Statistic::Chi => self.chi,
        }
    }

    pub fn set(&mut self, stat: Statistic, bound: RangeBound) {
        let slot = match stat {
            Statistic::Snr => &mut self.snr,
            Statistic::Err => &mut self.err,
            Statistic::Sharp => &mut self.sharp,
            Statistic::Round => &mut self.round,
            Statistic::Crowd => &mut self.crowd,
            Statistic::Chi => &mut self.chi,
        };
        *slot = bound;
    }
}

// ---------------------------------------------------------------------------
// Range filter
// ---------------------------------------------------------------------------

/// Return indices of sources recovered in both bands of `pair` whose six
/// statistics all fall inside `bounds`, for both bands.
///
/// A band missing any required column rejects every row.
pub fn limit_data(catalog: &Catalog, pair: &BandPair, bounds: &FilterBounds) -> Vec<usize> {
    let mut predicates: Vec<(&[f64], RangeBound)> = Vec::with_capacity(14);
    for band in pair.bands() {
        let detect = RangeBound::new(-DETECTION_LIMIT, DETECTION_LIMIT);
        let mut wanted = vec![(band_column(band, MAGNITUDE_SUFFIX), detect)];
        wanted.extend(
            Statistic::ALL
                .iter()
                .map(|&s| (band_column(band, s.suffix()), bounds.get(s))),
        );
        for (name, bound) in wanted {
            match catalog.column(&name) {
                Some(values) => predicates.push((values, bound)),
                None => {
                    log::warn!("column {name} missing; no rows pass for band pair {pair}");
                    return Vec::new();
                }
            }
        }
    }

    (0..catalog.len())
        .filter(|&row| predicates.iter().all(|(values, b)| b.contains(values[row])))
        .collect()
}

/// Rows where every listed band has VEGA below the non-detection flag.
pub fn detected_rows(catalog: &Catalog, bands: &[&str]) -> Vec<usize> {
    let mags: Vec<&[f64]> = bands
        .iter()
        .filter_map(|b| catalog.column(&band_column(b, MAGNITUDE_SUFFIX)))
        .collect();
    (0..catalog.len())
        .filter(|&row| mags.iter().all(|m| m[row] < NON_DETECTION))
        .collect()
}

/// Minimum and maximum over every column whose name contains `param`,
/// restricted to `rows`. NaNs are ignored; `None` when nothing is left.
pub fn minmax(catalog: &Catalog, rows: &[usize], param: &str) -> Option<(f64, f64)> {
    catalog
        .column_names()
        .iter()
        .filter(|name| name.contains(param))
        .filter_map(|name| catalog.column(name))
        .flat_map(|values| rows.iter().map(move |&r| values[r]))
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Slider limits for every statistic, from the sources detected in both
/// bands of `pair`. ERR always starts at zero.
pub fn slider_limits(catalog: &Catalog, pair: &BandPair) -> FilterBounds {
    let rows = detected_rows(catalog, &pair.bands());
    log::debug!(
        "{} of {} sources detected in {pair}",
        rows.len(),
        catalog.len()
    );

    let mut limits = FilterBounds::unbounded();
    for stat in Statistic::ALL {
        let (lo, hi) = minmax(catalog, &rows, stat.suffix()).unwrap_or_else(|| {
            log::warn!("no detected values for {stat}; slider collapsed to [0, 0]");
            (0.0, 0.0)
        });
        let lo = if stat == Statistic::Err { 0.0 } else { lo };
        limits.set(stat, RangeBound::new(lo, hi));
    }
    limits
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two wide bands with hand-picked rows:
    /// 0: good in both bands
    /// 1: F475W non-detection (VEGA 99)
    /// 2: F814W SNR below 5
    /// 3: good, F475W SNR exactly 100
    /// 4: good, CHI NaN in F814W
    fn catalog() -> Catalog {
        let col = |name: &str, v: [f64; 5]| (name.to_string(), v.to_vec());
        let mut cat = Catalog::from_columns(vec![
            col("F475W_VEGA", [24.0, 99.0, 25.0, 23.0, 22.0]),
            col("F475W_SNR", [50.0, 60.0, 20.0, 100.0, 40.0]),
            col("F475W_ERR", [0.02, 9.9, 0.05, 0.01, 0.03]),
            col("F475W_SHARP", [0.01, 0.0, -0.02, 0.03, 0.0]),
            col("F475W_ROUND", [0.1, 0.0, 0.2, 0.1, 0.05]),
            col("F475W_CROWD", [0.0, 0.0, 0.3, 0.1, 0.2]),
            col("F475W_CHI", [1.1, 0.0, 1.5, 0.9, 1.0]),
            col("F814W_VEGA", [23.0, 22.0, 26.0, 22.5, 21.0]),
            col("F814W_SNR", [70.0, 80.0, 3.0, 90.0, 60.0]),
            col("F814W_ERR", [0.01, 0.01, 0.3, 0.01, 0.02]),
            col("F814W_SHARP", [0.0, 0.01, 0.1, -0.01, 0.02]),
            col("F814W_ROUND", [0.05, 0.1, 0.3, 0.0, 0.1]),
            col("F814W_CROWD", [0.01, 0.0, 0.5, 0.05, 0.1]),
            col("F814W_CHI", [1.0, 1.2, 2.0, 0.95, f64::NAN]),
        ])
        .unwrap();
        cat.add_color_columns();
        cat
    }

    fn pair() -> BandPair {
        BandPair::new("F475W", "F814W")
    }

    fn assert_rows_satisfy(cat: &Catalog, rows: &[usize], bounds: &FilterBounds) {
        for &row in rows {
            for band in pair().bands() {
                let mag = cat.column(&band_column(band, "VEGA")).unwrap()[row];
                assert!(mag.abs() <= DETECTION_LIMIT);
                for stat in Statistic::ALL {
                    let v = cat.column(&band_column(band, stat.suffix())).unwrap()[row];
                    assert!(bounds.get(stat).contains(v), "row {row} {band} {stat} = {v}");
                }
            }
        }
    }

    #[test]
    fn snr_window_excludes_non_detections_and_faint_rows() {
        let cat = catalog();
        let mut bounds = FilterBounds::unbounded();
        bounds.snr = RangeBound::new(5.0, 100.0);

        let rows = limit_data(&cat, &pair(), &bounds);
        // Row 1 is a non-detection regardless of SNR; row 2 fails SNR;
        // row 4 has a NaN CHI, which never satisfies a bound.
        assert_eq!(rows, vec![0, 3]);
        assert_rows_satisfy(&cat, &rows, &bounds);
    }

    #[test]
    fn bounds_are_inclusive() {
        let cat = catalog();
        let mut bounds = FilterBounds::unbounded();
        bounds.snr = RangeBound::new(50.0, 100.0);
        bounds.chi = RangeBound::new(0.9, 1.1);
        assert_eq!(limit_data(&cat, &pair(), &bounds), vec![0, 3]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let cat = catalog();
        let mut bounds = slider_limits(&cat, &pair());
        bounds.err = RangeBound::new(0.0, 0.04);
        let first = limit_data(&cat, &pair(), &bounds);
        assert_rows_satisfy(&cat, &first, &bounds);

        let subset = cat.select(&first);
        let second = limit_data(&subset, &pair(), &bounds);
        assert_eq!(second, (0..first.len()).collect::<Vec<_>>());
    }

    #[test]
    fn full_range_bounds_keep_every_detected_row() {
        let cat = catalog();
        let limits = slider_limits(&cat, &pair());
        let detected = detected_rows(&cat, &pair().bands());
        assert_eq!(detected, vec![0, 2, 3, 4]);

        for stat in Statistic::ALL {
            let mut only = FilterBounds::unbounded();
            only.set(stat, limits.get(stat));
            let kept = limit_data(&cat, &pair(), &only);
            for &row in &detected {
                let has_nan = pair().bands().iter().any(|b| {
                    cat.column(&band_column(b, stat.suffix())).unwrap()[row].is_nan()
                });
                if !has_nan {
                    assert!(kept.contains(&row), "{stat} dropped detected row {row}");
                }
            }
        }
    }

    #[test]
    fn slider_limits_come_from_detected_rows() {
        let cat = catalog();
        let limits = slider_limits(&cat, &pair());
        // Row 1 is a non-detection, so its F475W ERR of 9.9 is left out.
        assert_eq!(limits.snr, RangeBound::new(3.0, 100.0));
        assert_eq!(limits.err, RangeBound::new(0.0, 0.3));
        assert_eq!(limits.chi, RangeBound::new(0.9, 2.0));
        assert_eq!(limits.crowd, RangeBound::new(0.0, 0.5));
    }

    #[test]
    fn missing_statistic_column_rejects_all_rows() {
        let cat = Catalog::from_columns(vec![
            ("F475W_VEGA".into(), vec![20.0]),
            ("F814W_VEGA".into(), vec![20.0]),
        ])
        .unwrap();
        assert!(limit_data(&cat, &pair(), &FilterBounds::unbounded()).is_empty());
    }

    #[test]
    fn reversed_bound_is_normalised() {
        let b = RangeBound::new(5.0, 1.0);
        assert_eq!((b.min, b.max), (1.0, 5.0));
        assert!(!b.contains(f64::NAN));
    }
}
