//! Entity storage, the occupancy grid, and the combined [`World`] (spec §3,
//! §4.1).

pub mod connectivity;
pub mod grid;
pub mod store;
pub mod thing;
pub mod world;

pub use connectivity::make_connected;
pub use grid::{BackgroundEntry, Grid};
pub use store::EntityStore;
pub use thing::Thing;
pub use world::{Projectile, World};
