mod config;
mod error;
mod state;
mod version;

pub use config::Config;
pub use error::Error;
pub use state::AppState;
pub use version::Version;
