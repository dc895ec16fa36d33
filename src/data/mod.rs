/// Data layer: FITS decoding, catalog model, loading and filtering.
///
/// Architecture:
/// ```text
///  HODGE6.gst.fits
///        │
///        ▼
///   ┌──────────┐
///   │   fits    │  BINTABLE → named f64 columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  discover / validate → Catalog + target + color columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  VEGA + six statistic bounds, both bands → row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  selected rows → CSV
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod fits;
pub mod loader;
pub mod model;
