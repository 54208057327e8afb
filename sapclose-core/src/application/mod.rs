// sapclose-core/src/application/mod.rs

pub mod pipeline;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Cela permet au CLI de faire :
// `use sapclose_core::application::{run_closing, RunResult};`
// sans avoir à connaître la structure interne des fichiers.

pub use pipeline::{RunResult, run_closing};
