//! Composition units: transforms assembled from other transforms.

mod adapter;
mod concat;
mod sequential;

pub use adapter::ColumnAdapter;
pub use concat::Concat;
pub use sequential::Sequential;
