use std::path::{Path, PathBuf};

use thiserror::Error;

use super::fits::{self, FitsError};
use super::model::{
    band_column, BandPair, Catalog, CatalogError, Statistic, MAGNITUDE_SUFFIX,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no file in {dir} ends in 'fits' and contains '{pattern}'")]
    NoMatch { dir: PathBuf, pattern: String },
    #[error("{} files in {dir} match '{pattern}': {}", .matches.len(), join_paths(.matches))]
    Ambiguous {
        dir: PathBuf,
        pattern: String,
        matches: Vec<PathBuf>,
    },
    #[error("cannot scan {dir}: {source}")]
    ScanDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("file must have a fits extension: {0}")]
    BadExtension(PathBuf),
    #[error("{0} not found")]
    NotFound(PathBuf),
    #[error("reading {path}: {source}")]
    Fits { path: PathBuf, source: FitsError },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("catalog has {0} wide band(s); at least two are needed")]
    TooFewBands(usize),
    #[error("band {band} is missing column {column}")]
    MissingColumn { band: String, column: String },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Where to look for a catalog when none is given on the command line.
#[derive(Debug, Clone)]
pub struct DiscoveryRule {
    pub dir: PathBuf,
    pub pattern: String,
}

impl Default for DiscoveryRule {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./gst"),
            pattern: "HODGE6.gst.fits".to_string(),
        }
    }
}

/// Find the single file in `rule.dir` whose name ends in `fits` and whose
/// path contains `rule.pattern`. Zero or several matches are errors.
pub fn discover(rule: &DiscoveryRule) -> Result<PathBuf, LoadError> {
    let scan_err = |source| LoadError::ScanDir {
        dir: rule.dir.clone(),
        source,
    };
    let mut matches = Vec::new();
    for entry in std::fs::read_dir(&rule.dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.ends_with("fits") && path.to_string_lossy().contains(&rule.pattern) {
            matches.push(path);
        }
    }
    matches.sort();

    match matches.len() {
        0 => Err(LoadError::NoMatch {
            dir: rule.dir.clone(),
            pattern: rule.pattern.clone(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(LoadError::Ambiguous {
            dir: rule.dir.clone(),
            pattern: rule.pattern.clone(),
            matches,
        }),
    }
}

/// Check a user-supplied path: `fits` extension (any case) and existence.
pub fn validate_path(path: &Path) -> Result<(), LoadError> {
    if !path.to_string_lossy().to_ascii_lowercase().ends_with("fits") {
        return Err(LoadError::BadExtension(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Target label: the file name up to `.gst`, e.g. `HODGE6` for
/// `HODGE6.gst.fits`.
pub fn target_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once(".gst") {
        Some((target, _)) => target.to_string(),
        None => name,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// A catalog with its derived color columns and provenance.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub target: String,
    pub path: PathBuf,
    /// Band pairs in combination order; the first is the default selection.
    pub pairs: Vec<BandPair>,
}

/// Read a FITS catalog, check every wide band carries the DOLPHOT columns,
/// and add the color columns.
pub fn load_catalog(path: &Path) -> Result<LoadedCatalog, LoadError> {
    validate_path(path)?;

    let table = fits::read_binary_table_file(path).map_err(|source| LoadError::Fits {
        path: path.to_path_buf(),
        source,
    })?;
    let mut catalog = Catalog::from_columns(
        table
            .columns
            .into_iter()
            .map(|c| (c.name, c.values))
            .collect(),
    )?;

    let bands = catalog.bands();
    if bands.len() < 2 {
        return Err(LoadError::TooFewBands(bands.len()));
    }
    for band in &bands {
        let suffixes =
            std::iter::once(MAGNITUDE_SUFFIX).chain(Statistic::ALL.map(Statistic::suffix));
        for suffix in suffixes {
            let column = band_column(band, suffix);
            if !catalog.has_column(&column) {
                return Err(LoadError::MissingColumn {
                    band: band.clone(),
                    column,
                });
            }
        }
    }

    let pairs = catalog.add_color_columns();
    let target = target_name(path);
    log::info!(
        "Loaded {} sources for {target} from {} (bands {:?})",
        catalog.len(),
        path.display(),
        bands
    );

    Ok(LoadedCatalog {
        catalog,
        target,
        path: path.to_path_buf(),
        pairs,
    })
}

/// Load `explicit` when given, otherwise the single file found by `rule`.
pub fn open(explicit: Option<&Path>, rule: &DiscoveryRule) -> Result<LoadedCatalog, LoadError> {
    match explicit {
        Some(path) => load_catalog(path),
        None => load_catalog(&discover(rule)?),
    }
}
