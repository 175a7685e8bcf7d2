pub mod bins;
pub mod config;
pub mod dataset;
pub mod error;
pub mod records;
pub mod series;
pub mod summary;
pub mod waves;

pub use dataset::{build_injection_dataset, build_injection_dataset_with, InjectionDataset};
pub use error::{AsymError, AsymResult};
