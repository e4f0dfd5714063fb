pub mod conformance;
pub mod engine;
pub mod pipeline;
pub mod resolve;
pub mod source;

pub use crate::domain::model::{City, Dataset, DirectoryReport, Hotel, Rejection};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
