pub mod annotation;
pub mod feature;
pub mod format;
pub mod interval;
pub mod peak;
pub mod region;
pub mod region_set;
pub mod strand;

// re-export for cleaner imports
pub use self::annotation::Annotation;
pub use self::feature::{Attributes, FeatureType, GeneFeature, Origin};
pub use self::format::{AnnotationFormat, CoordinateSystem};
pub use self::interval::Interval;
pub use self::peak::Peak;
pub use self::region::Region;
pub use self::region_set::RegionSet;
pub use self::strand::Strand;
