//! Game objects.

mod flagship;

pub use flagship::Flagship;
