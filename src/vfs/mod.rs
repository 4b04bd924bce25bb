mod entry;
mod exist_fs;
mod oracle;
mod path;
mod synth;
mod trace;

pub use entry::{AccessMode, Attributes, DIR_MODE, DirListing, VolumeStats};
pub use exist_fs::ExistFs;
pub use oracle::exists;
pub use path::{PathCategory, classify};
pub use synth::MAX_SIZE;
pub use trace::Traced;
