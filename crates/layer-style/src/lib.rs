//! Per-feature style resolution for map layers.
//!
//! A layer's `VisualConfig` holds a base style and an ordered rule cascade.
//! This crate turns (config, feature) into a concrete style and picks how a
//! point feature is drawn. Everything here is synchronous and total: any
//! input, however incomplete, yields a usable style.
//!
//! - [`resolve`]: the rule cascade
//! - [`draw`]: line/polygon draw style and point renderer choice
//! - [`icons`]: icon name to symbol resolution

pub mod draw;
pub mod icons;
pub mod resolve;

pub use draw::{choose_point_renderer, to_draw_style, DrawStyle, PointRenderer};
pub use icons::resolve_icon;
pub use resolve::{
    configured_icon, match_rule, property_key, resolve_properties, resolve_style, ResolvedStyle,
};
