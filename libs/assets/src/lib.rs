pub mod cache;
pub mod error;
pub mod registry;

pub use cache::{LogoCache, LogoVariant};
pub use error::{AssetsError, Result};
pub use registry::{TeamAssetRecord, TeamRegistry};
