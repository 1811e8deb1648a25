//! Bootstrap state the loaders depend on.
//!
//! Responsibilities:
//! - Model the application context (`Production/Staging`, ...).
//! - Describe the runtime environment (project path, var path, interactivity).
//! - Load `.env` files ahead of command-line parsing.
//!
//! Does NOT handle:
//! - Reading or merging configuration (see `reader` and `loader`).

mod context;
mod dotenv;
mod environment;

pub use context::{ApplicationContext, RootContext};
pub use dotenv::load_dotenv;
pub use environment::Environment;
