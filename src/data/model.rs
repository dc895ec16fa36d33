use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Statistic – one DOLPHOT per-band quality quantity
// ---------------------------------------------------------------------------

/// The six per-band quantities the range filter constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    Snr,
    Err,
    Sharp,
    Round,
    Crowd,
    Chi,
}

impl Statistic {
    pub const ALL: [Statistic; 6] = [
        Statistic::Snr,
        Statistic::Err,
        Statistic::Sharp,
        Statistic::Round,
        Statistic::Crowd,
        Statistic::Chi,
    ];

    /// Column suffix as written by DOLPHOT, e.g. `SNR` in `F475W_SNR`.
    pub fn suffix(self) -> &'static str {
        match self {
            Statistic::Snr => "SNR",
            Statistic::Err => "ERR",
            Statistic::Sharp => "SHARP",
            Statistic::Round => "ROUND",
            Statistic::Crowd => "CROWD",
            Statistic::Chi => "CHI",
        }
    }

    /// Slider step used by the control panel.
    pub fn step(self) -> f64 {
        match self {
            Statistic::Snr => 1.0,
            Statistic::Err => 0.05,
            _ => 0.1,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

pub const MAGNITUDE_SUFFIX: &str = "VEGA";

/// `<band>_<suffix>` column name.
pub fn band_column(band: &str, suffix: &str) -> String {
    format!("{band}_{suffix}")
}

// ---------------------------------------------------------------------------
// BandPair – the two photometric bands being compared
// ---------------------------------------------------------------------------

/// An ordered pair of band names, shown as `F475W,F814W`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BandPair {
    pub first: String,
    pub second: String,
}

impl BandPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Name of the derived color column, e.g. `F475W-F814W`.
    pub fn color_column(&self) -> String {
        format!("{}-{}", self.first, self.second)
    }

    /// Magnitude column of the second band (the CMD y-axis).
    pub fn magnitude_column(&self) -> String {
        band_column(&self.second, MAGNITUDE_SUFFIX)
    }

    pub fn bands(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }
}

impl fmt::Display for BandPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.first, self.second)
    }
}

// ---------------------------------------------------------------------------
// Catalog – the loaded photometry table
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("table column {0} has a different length from the others")]
    RaggedColumn(String),
}

/// Column-oriented table of numeric values, one row per source.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    index: BTreeMap<String, usize>,
    rows: usize,
}

impl Catalog {
    /// Build from named columns. All columns must have the same length.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self, CatalogError> {
        let rows = columns.first().map_or(0, |(_, v)| v.len());
        let mut catalog = Catalog {
            rows,
            ..Default::default()
        };
        for (name, values) in columns {
            if values.len() != rows {
                return Err(CatalogError::RaggedColumn(name));
            }
            catalog.push_column(name, values);
        }
        Ok(catalog)
    }

    fn push_column(&mut self, name: String, values: Vec<f64>) {
        match self.index.get(&name) {
            Some(&i) => self.columns[i] = values,
            None => {
                self.index.insert(name.clone(), self.names.len());
                self.names.push(name);
                self.columns.push(values);
            }
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index.get(name).map(|&i| self.columns[i].as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names in table order (derived columns last).
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// New catalog holding only `rows`, in the given order.
    pub fn select(&self, rows: &[usize]) -> Catalog {
        Catalog {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| rows.iter().map(|&r| c[r]).collect())
                .collect(),
            index: self.index.clone(),
            rows: rows.len(),
        }
    }

    /// Wide photometric bands, in column order.
    ///
    /// A band is any `<name>_VEGA` column prefix; narrow bands (names not
    /// ending in `W`, e.g. `F658N`) are excluded.
    pub fn bands(&self) -> Vec<String> {
        let suffix = format!("_{MAGNITUDE_SUFFIX}");
        self.names
            .iter()
            .filter_map(|n| n.strip_suffix(&suffix))
            .filter(|band| band.ends_with('W'))
            .map(str::to_string)
            .collect()
    }

    /// Add one `A-B` color column per unordered pair of wide bands and return
    /// the pairs in combination order (`(b0,b1), (b0,b2), …, (b1,b2), …`).
    pub fn add_color_columns(&mut self) -> Vec<BandPair> {
        let bands = self.bands();
        let mut pairs = Vec::new();
        for (i, first) in bands.iter().enumerate() {
            for second in &bands[i + 1..] {
                let pair = BandPair::new(first.as_str(), second.as_str());
                let color: Option<Vec<f64>> = match (
                    self.column(&band_column(first, MAGNITUDE_SUFFIX)),
                    self.column(&band_column(second, MAGNITUDE_SUFFIX)),
                ) {
                    (Some(a), Some(b)) => Some(a.iter().zip(b).map(|(a, b)| a - b).collect()),
                    _ => None,
                };
                if let Some(color) = color {
                    self.push_column(pair.color_column(), color);
                }
                pairs.push(pair);
            }
        }
        pairs
    }
}
