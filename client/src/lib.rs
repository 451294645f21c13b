//! wordgrid - terminal front end for collaborative word-grid writing.
//!
//! Wires `wordgrid-core` sessions to a Fireworks chat-completions model,
//! renders the grid as text and optionally submits finished grids.

pub mod config;
pub mod fireworks;
pub mod logging;
pub mod render;
pub mod submit;

pub use config::ClientConfig;
pub use fireworks::FireworksProvider;
pub use render::{render_grid, render_status};
pub use submit::{GridSubmitter, SubmitError};
