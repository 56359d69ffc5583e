pub mod coordinate;
pub mod loaders;
pub mod property;
pub mod selectors;

pub use coordinate::Coordinate;
pub use loaders::load_config_file;
pub use property::{FieldSpec, PropertyRecord, PROPERTY_FIELDS};
pub use selectors::PortalSelectors;
