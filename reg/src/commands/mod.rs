/// Tags command handlers and rendering
pub mod tags;

/// Version command handlers
pub mod version;
