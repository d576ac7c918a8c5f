pub mod executor;
pub mod harvest;
pub mod logging;
pub mod model;
pub mod sinks;
pub mod synth;
pub mod traits;
pub mod walker;

// Re-export common types for convenience
pub use executor::*;
pub use model::*;
pub use traits::*;
