pub mod builder;
pub mod defaults;
pub mod file;

pub use builder::{CommandOverrides, build_config};
pub use defaults::DefaultsConfig;
pub use file::FileConfig;
