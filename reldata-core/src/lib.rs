pub mod archive;
pub mod config;
pub mod convert;
pub mod error;
pub mod home;
pub mod models;
pub mod request;

pub use archive::{deserialize_zipfile, DEFAULT_FOLD};
pub use config::DatasetsConfig;
pub use convert::{from_numpy, Task};
pub use error::DatasetError;
pub use home::{clear_data_home, get_data_home};
pub use models::{Dtype, Element, RelationalDataset};
pub use request::{load, ArchiveSource, FetchError, ReleaseClient};
