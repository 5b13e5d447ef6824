pub mod descriptor;
pub mod matcher;

pub use descriptor::descriptor_distance;
pub use matcher::{Match, Matcher, DEFAULT_MATCH_THRESHOLD, MATCH_EPSILON};
