//! Fallback icon and color for catalog rows created before visual
//! configuration existed.
//!
//! Consulted only when the stored configuration leaves a value out; a stored
//! value is never replaced. Entries can be removed once the corresponding
//! catalog rows carry their own configuration.

use layer_common::{MapMarker, StyleProps, VisualConfig};

/// Icon and color for one legacy slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyStyle {
    pub slug: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

pub const LEGACY_STYLES: &[LegacyStyle] = &[
    LegacyStyle {
        slug: "focos_calor",
        icon: "flame",
        color: "#ef4444",
    },
    LegacyStyle {
        slug: "desmatamento",
        icon: "axe",
        color: "#b45309",
    },
    LegacyStyle {
        slug: "propriedades",
        icon: "home",
        color: "#16a34a",
    },
    LegacyStyle {
        slug: "estradas",
        icon: "route",
        color: "#6b7280",
    },
    LegacyStyle {
        slug: "acoes",
        icon: "map-pin",
        color: "#2563eb",
    },
];

/// The legacy fallback table, switchable from configuration.
#[derive(Debug, Clone, Copy)]
pub struct LegacyDefaults {
    enabled: bool,
}

impl LegacyDefaults {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn lookup(&self, slug: &str) -> Option<&'static LegacyStyle> {
        if !self.enabled {
            return None;
        }
        LEGACY_STYLES.iter().find(|s| s.slug == slug)
    }

    /// Default the marker descriptor to a point, then fill icon and color
    /// gaps for legacy slugs.
    pub fn apply(&self, slug: &str, visual: &mut VisualConfig) {
        let marker = visual.map_marker.get_or_insert_with(MapMarker::point);

        let Some(legacy) = self.lookup(slug) else {
            return;
        };

        marker.icon.get_or_insert_with(|| legacy.icon.to_string());
        marker.color.get_or_insert_with(|| legacy.color.to_string());

        let base = visual.base_style.get_or_insert_with(StyleProps::default);
        if base.icon_name.is_none() {
            base.icon_name = Some(legacy.icon.to_string());
            // An injected icon only draws when the marker type asks for one
            base.marker_type.get_or_insert_with(|| "icon".to_string());
        }
        base.color.get_or_insert_with(|| legacy.color.to_string());
    }
}

impl Default for LegacyDefaults {
    fn default() -> Self {
        Self::new(true)
    }
}
