//! Composite sub-records reused across tag grammars.
//!
//! Each decoder applies the termination policy its field defines: counted
//! lists read their count first and check it against the remaining bytes,
//! sentinel lists stop on their marker, and chained lists follow their
//! per-record offsets.

pub mod button;
pub mod clip;
pub mod color;
pub mod filter;
pub mod geometry;
pub mod morph;
pub mod shape;
pub mod sound;
pub mod text;

pub use button::{ButtonCondAction, ButtonConditions, ButtonRecord, ButtonStateFlags};
pub use clip::{ClipActionRecord, ClipActions, ClipEventFlags};
pub use color::{Color, ColorTransform};
pub use filter::Filter;
pub use geometry::{Matrix, Rect};
pub use shape::{FillStyle, LineStyle, Shape, ShapeRecord, ShapeVersion, ShapeWithStyle};
pub use sound::{SoundFormat, SoundInfo};
pub use text::{KerningRecord, TextRecord, ZoneRecord};
