// Library exports for reuse by integration tests and other applications
pub mod cli;
pub mod fs_access;
pub mod image_processing;
pub mod utils;

// Re-export commonly used types
pub use cli::{Args, ModeArg};
pub use fs_access::{FileSystem, OsFileSystem};
pub use image_processing::{
    CropMode, Orientation, ProcessingConfig, ProcessingEngine, ProcessingResult, OUTPUT_SIZE,
};
