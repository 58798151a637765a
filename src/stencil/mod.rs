//! Stencil: buffer view bertipe untuk satu record
//!
//! Prinsip desain:
//! - Zero-Copy: `get_ref` menunjuk langsung ke storage view
//! - Ownership eksplisit: owned, borrowed, atau kosong (setelah move)
//! - Flat Binary: stream berisi raw footprint bytes, tanpa framing

mod region;
mod stream;
mod view;

pub use region::{Ownership, REGION_ALIGN};
pub use view::Stencil;
