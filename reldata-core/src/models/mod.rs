pub mod dataset;
pub mod dtype;

pub use dataset::RelationalDataset;
pub use dtype::{Dtype, Element};
