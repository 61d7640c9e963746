mod classifier;
mod comparator;
mod extractor;
mod wildcard;

pub use classifier::{
    Classification, FilterReason, ResponseClassifier, has_file_extension, is_directory,
};
pub use comparator::{ContentComparator, DiffComparator};
pub use extractor::EndpointExtractor;
pub use wildcard::{WILDCARD_PROBES, WildcardDetector, WildcardSignature};
