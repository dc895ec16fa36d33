pub mod color;
pub mod data;
pub mod figure;
pub mod server;
pub mod state;

// Re-export commonly used items
pub use data::loader::{DiscoveryRule, LoadError, LoadedCatalog};
pub use data::model::{BandPair, Catalog, CatalogError, Statistic};
pub use state::{AppState, ControlEvent, Controls};
