//! L-system line drawing generator
//!
//! Rewrites a symbol string with a deterministic, context-free grammar, walks
//! the result with a turtle, and hands back a flat stream of 3D vertex pairs
//! (one pair per line segment) ready to upload to a GPU buffer or export for
//! a plotter. Streams are cached on disk in a header-less binary format keyed
//! by catalog system and iteration count.
//!
//! ```rust
//! use lsystem_turtle::prelude::*;
//!
//! let resolved = catalog::resolve(SystemId::DragonCurve.id(), 4).unwrap();
//! let vertices = resolved.grammar.interpret(4).unwrap();
//! let bbox = BoundingBox::from_vertices(&vertices).unwrap();
//! assert_eq!(vertices.len() % 2, 0);
//! assert!(bbox.extent().x > 0.0);
//! ```

/// Error types shared by every module.
pub mod errors;

/// L-system implementation, with expansion/rewriting
pub mod l_system;

/// Turtle graphics implementation, turning expansions into vertex pairs
pub mod turtle;

/// Binary encoding of vertex streams
pub mod codec;

/// Predefined systems and cache file naming
pub mod catalog;

/// Bounding boxes and view framing
pub mod bounds;

/// Expand + interpret pipeline, including parallel batches
pub mod generator;

/// Lazily populated on-disk vertex cache
pub mod cache;

/// SVG output
pub mod export;

pub mod config;
pub mod logging;

/// Make your life easy! Just import prelude::* for the common types.
pub mod prelude {
    pub use crate::bounds::BoundingBox;
    pub use crate::catalog::{self, SystemId};
    pub use crate::errors::LSystemError;
    pub use crate::l_system::{LSystem, Rule};
    pub use crate::turtle::{degrees, Turtle, TurtleTrait};
}
