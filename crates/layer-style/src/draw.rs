//! Draw styles for lines/polygons and renderer selection for points.

use serde::{Deserialize, Serialize};

use crate::icons::resolve_icon;
use crate::resolve::ResolvedStyle;

/// Outline color used when a style has none.
pub const DEFAULT_COLOR: &str = "#3388ff";
pub const DEFAULT_WEIGHT: f64 = 2.0;
pub const DEFAULT_OPACITY: f64 = 1.0;
pub const DEFAULT_FILL_OPACITY: f64 = 0.2;
/// Circle marker radius in pixels when neither style nor caller set one.
pub const DEFAULT_RADIUS: f64 = 8.0;

/// Concrete path options for line and polygon features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStyle {
    pub color: String,
    pub fill_color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
}

/// How a point feature is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointRenderer {
    /// Colored circular badge with a symbol inside
    IconMarker {
        symbol: String,
        color: String,
        #[serde(rename = "fillColor")]
        fill_color: String,
    },

    /// Filled circle
    CircleMarker {
        color: String,
        #[serde(rename = "fillColor")]
        fill_color: String,
        weight: f64,
        opacity: f64,
        #[serde(rename = "fillOpacity")]
        fill_opacity: f64,
        radius: f64,
    },

    /// Unstyled default pin
    DefaultPin,
}

/// Apply draw defaults to a resolved style.
pub fn to_draw_style(style: &ResolvedStyle) -> DrawStyle {
    let color = non_empty(&style.color).unwrap_or(DEFAULT_COLOR).to_string();
    let fill_color = non_empty(&style.fill_color)
        .map(str::to_string)
        .unwrap_or_else(|| color.clone());

    DrawStyle {
        color,
        fill_color,
        weight: style.weight.unwrap_or(DEFAULT_WEIGHT),
        opacity: style.opacity.unwrap_or(DEFAULT_OPACITY),
        fill_opacity: style.fill_opacity.unwrap_or(DEFAULT_FILL_OPACITY),
        dash_array: style.dash_array.clone(),
    }
}

/// Pick the point renderer for a resolved style.
///
/// `default_radius` applies to circle markers whose style sets no radius.
pub fn choose_point_renderer(style: &ResolvedStyle, default_radius: f64) -> PointRenderer {
    let marker_type = style.marker_type.as_deref().map(str::trim);

    match (marker_type, non_empty(&style.icon_name)) {
        (Some(t), Some(icon)) if t.eq_ignore_ascii_case("icon") => {
            let draw = to_draw_style(style);
            PointRenderer::IconMarker {
                symbol: resolve_icon(icon).to_string(),
                color: draw.color,
                fill_color: draw.fill_color,
            }
        }
        (Some(t), _) if t.eq_ignore_ascii_case("circle") => {
            let draw = to_draw_style(style);
            PointRenderer::CircleMarker {
                color: draw.color,
                fill_color: draw.fill_color,
                weight: draw.weight,
                opacity: draw.opacity,
                fill_opacity: draw.fill_opacity,
                radius: style.radius.filter(|r| *r > 0.0).unwrap_or(default_radius),
            }
        }
        _ => PointRenderer::DefaultPin,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_defaults() {
        let draw = to_draw_style(&ResolvedStyle::default());
        assert_eq!(draw.color, DEFAULT_COLOR);
        assert_eq!(draw.fill_color, DEFAULT_COLOR);
        assert_eq!(draw.weight, 2.0);
        assert_eq!(draw.opacity, 1.0);
        assert_eq!(draw.fill_opacity, 0.2);
        assert_eq!(draw.dash_array, None);
    }

    #[test]
    fn test_fill_color_follows_color() {
        let style = ResolvedStyle {
            color: Some("#ef4444".to_string()),
            ..Default::default()
        };
        assert_eq!(to_draw_style(&style).fill_color, "#ef4444");
    }

    #[test]
    fn test_icon_without_name_is_default_pin() {
        let style = ResolvedStyle {
            marker_type: Some("icon".to_string()),
            ..Default::default()
        };
        assert_eq!(choose_point_renderer(&style, DEFAULT_RADIUS), PointRenderer::DefaultPin);
    }

    #[test]
    fn test_circle_radius_default() {
        let style = ResolvedStyle {
            marker_type: Some("circle".to_string()),
            color: Some("#16a34a".to_string()),
            ..Default::default()
        };
        match choose_point_renderer(&style, 6.0) {
            PointRenderer::CircleMarker { radius, fill_color, .. } => {
                assert_eq!(radius, 6.0);
                assert_eq!(fill_color, "#16a34a");
            }
            other => panic!("expected circle marker, got {:?}", other),
        }
    }

    #[test]
    fn test_renderer_serialization() {
        let json = serde_json::to_value(PointRenderer::DefaultPin).unwrap();
        assert_eq!(json["kind"], "default_pin");
    }
}
