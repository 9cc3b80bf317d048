//! Text-level recoloring of SVG markup.
//!
//! [`RecolorSession`] is the state controller used by the editor;
//! [`substitute`] and [`ColorMapping`] are the pure pieces it is built from.

pub mod mapping;
pub mod session;

pub use mapping::{ColorMapping, substitute};
pub use session::RecolorSession;
