pub mod scheme;

pub use scheme::InitScheme;
