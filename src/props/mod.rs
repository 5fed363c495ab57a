//! Non-terrain scene content.
//!
//! Every prop is ordinary scene nodes with mesh payloads, animated by
//! writing node transforms from the simulation tick.

mod library;
mod rig;
mod shooting_star;
mod statue;

pub use library::{PropLibrary, PropMesh};
pub use rig::CentrePiece;
pub use shooting_star::{trail_mesh, ShootingStar};
pub use statue::StatueColumn;
