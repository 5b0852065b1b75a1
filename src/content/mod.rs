pub mod cast;
pub mod merge;
pub mod rebuild;
pub mod split;

pub use cast::{cast, cast_tracked};
pub use merge::merge;
pub use rebuild::{rebuild, RebuildOutcome, RebuildStats};
pub use split::{split, SplitDocument};
