//! Icon name resolution.
//!
//! Catalog rows name icons free-form ("alert-triangle", "tree_pine",
//! "Flame"). The map client draws symbols from a library whose names are
//! PascalCase. Resolution order: legacy alias table, PascalCase conversion,
//! case-insensitive lookup, then the generic pin.

use tracing::warn;

/// Symbol drawn when nothing else resolves.
pub const FALLBACK_SYMBOL: &str = "MapPin";

/// Symbols available in the client's symbol library.
pub const SYMBOLS: &[&str] = &[
    "AlertCircle",
    "AlertTriangle",
    "Axe",
    "Ban",
    "Bird",
    "Building",
    "Camera",
    "Car",
    "ClipboardCheck",
    "CloudRain",
    "Droplet",
    "Droplets",
    "Eye",
    "Factory",
    "Fence",
    "FileText",
    "Fish",
    "Flag",
    "Flame",
    "Gavel",
    "GraduationCap",
    "Hammer",
    "Home",
    "Info",
    "Landmark",
    "Leaf",
    "MapPin",
    "Megaphone",
    "Mountain",
    "Navigation",
    "Package",
    "Pickaxe",
    "Recycle",
    "Route",
    "Search",
    "Shield",
    "ShieldAlert",
    "Siren",
    "Sprout",
    "Tent",
    "Tractor",
    "TreePine",
    "Trees",
    "Truck",
    "Users",
    "Waves",
    "Wind",
];

/// Legacy names that do not convert to a library symbol.
const ALIASES: &[(&str, &str)] = &[
    ("fire", "Flame"),
    ("warning", "AlertTriangle"),
    ("tree", "TreePine"),
    ("pin", "MapPin"),
    ("marker", "MapPin"),
];

/// Resolve a free-form icon identifier to a library symbol. Never fails.
pub fn resolve_icon(name: &str) -> &'static str {
    let trimmed = name.trim();
    let lowered = trimmed.to_lowercase();

    if let Some(&(_, symbol)) = ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        return symbol;
    }

    let pascal = to_pascal_case(trimmed);
    if let Some(symbol) = SYMBOLS.iter().copied().find(|s| *s == pascal) {
        return symbol;
    }
    if let Some(symbol) = SYMBOLS
        .iter()
        .copied()
        .find(|s| s.eq_ignore_ascii_case(&pascal))
    {
        return symbol;
    }

    warn!(icon = %name, fallback = FALLBACK_SYMBOL, "Unknown icon name");
    FALLBACK_SYMBOL
}

/// "alert-triangle" / "alert_triangle" / "alert triangle" -> "AlertTriangle".
///
/// Characters after the first of each segment are kept as written, so names
/// already in PascalCase pass through.
pub fn to_pascal_case(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
