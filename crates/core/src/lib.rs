// crates/core/src/lib.rs
pub mod capabilities;
pub mod entities;
pub mod events;
pub mod intent;
pub mod result;

pub use capabilities::*;
pub use entities::*;
pub use events::*;
pub use intent::*;
pub use result::*;
