pub mod cli;
pub mod error;
pub mod model;
pub mod provider;
pub mod sources;

pub use cli::Cli;
pub use error::{ConfigError, Result};
pub use model::{DeviceConfig, HardwareMapping, Layout, LogoVariant, MatrixGeometry, RefreshIntervals, RenderOptions};
pub use provider::UnifiedConfigurationProvider;
pub use sources::{
    CloudCachedConfigSource, CloudConfigSource, ConfigSource, DefaultConfigSource,
    EnvironmentConfigSource, HttpCloudConfigSource, RuntimeConfigSource, StaticCloudConfigSource,
};
