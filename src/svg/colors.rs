//! Stroke color parsing and wire color assignment
//!
//! Reads the `.stN{stroke:#RRGGBB}` rules of an embedded stylesheet and maps
//! each stroke onto a wire color code.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^{}]+)\{([^}]*)\}").expect("css rule pattern"));
static STROKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|;)\s*stroke\s*:\s*(#[0-9A-Fa-f]{6}|#[0-9A-Fa-f]{3})\b").expect("stroke pattern")
});

/// Stroke colors used for wires. Black is the default drawing ink, so it
/// never marks a wire on its own.
const WIRE_PALETTE: &[(u32, &str)] = &[
    (0xFF0000, "RD"),
    (0xED1C24, "RD"),
    (0x00A651, "GN"),
    (0x00FF00, "GN"),
    (0x39B54A, "GN"),
    (0x0000FF, "BU"),
    (0x2E3192, "BU"),
    (0x0072BC, "BU"),
    (0x00AEEF, "BU"),
    (0xFFFF00, "YE"),
    (0xFFF200, "YE"),
    (0x808080, "GY"),
    (0x939598, "GY"),
    (0xA52A2A, "BN"),
    (0x8B4513, "BN"),
    (0x8B5E3C, "BN"),
    (0x800080, "PU"),
    (0x662D91, "PU"),
    (0x92278F, "PU"),
    (0xFFA500, "OG"),
    (0xF7941D, "OG"),
    (0xFFC0CB, "PK"),
    (0xEC008C, "PK"),
    (0xFFFFFF, "WH"),
];

/// Parse `#RGB` or `#RRGGBB` into a 24-bit value
pub fn parse_hex(hex: &str) -> Option<u32> {
    let digits = hex.strip_prefix('#')?;
    match digits.len() {
        6 => u32::from_str_radix(digits, 16).ok(),
        3 => {
            let short = u32::from_str_radix(digits, 16).ok()?;
            let (r, g, b) = ((short >> 8) & 0xF, (short >> 4) & 0xF, short & 0xF);
            Some((r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11))
        }
        _ => None,
    }
}

/// Wire color code for a stroke, if the stroke is a known wire color
pub fn wire_color_code(hex: &str) -> Option<&'static str> {
    let rgb = parse_hex(hex)?;
    WIRE_PALETTE
        .iter()
        .find(|(value, _)| *value == rgb)
        .map(|(_, code)| *code)
}

/// Class to wire color table of a stylesheet. Classes with no stroke or an
/// unknown stroke color are left out.
pub fn class_colors(css: &str) -> IndexMap<String, String> {
    let mut colors = IndexMap::new();
    for rule in RULE.captures_iter(css) {
        let Some(stroke) = STROKE.captures(&rule[2]) else {
            continue;
        };
        let Some(code) = wire_color_code(&stroke[1]) else {
            continue;
        };
        for selector in rule[1].split(',') {
            if let Some(class) = selector.trim().strip_prefix('.') {
                colors.insert(class.to_string(), code.to_string());
            }
        }
    }
    colors
}
