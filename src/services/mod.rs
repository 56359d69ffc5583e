pub mod distance;
pub mod geocoder;
pub mod nearby_discovery;
pub mod property_extractor;
pub mod property_locator;
pub mod result_writer;

pub use distance::{distance_miles, within_radius};
pub use geocoder::{Geocoder, NominatimGeocoder};
pub use nearby_discovery::NearbyDiscovery;
pub use property_extractor::PropertyExtractor;
pub use property_locator::{LocateOutcome, PropertyLocator};
pub use result_writer::ResultWriter;
