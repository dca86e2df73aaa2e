mod registry;

pub use registry::LanguageRegistry;
