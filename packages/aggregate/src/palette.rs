//! Modality colors.

use incident_map_geography_models::Rgba;

/// Keyword table, tested in order against the uppercased category.
pub const MODALITY_PALETTE: &[(&str, Rgba)] = &[
    ("PRIMARIA", Rgba::new(231, 76, 60, 160)),
    ("SECUNDARIA", Rgba::new(52, 152, 219, 160)),
    ("TERCIARIA", Rgba::new(46, 204, 113, 160)),
    ("CUATERNARIA", Rgba::new(241, 196, 15, 160)),
    ("MÚLTIPLE", Rgba::new(155, 89, 182, 160)),
    ("INDIVIDUAL", Rgba::new(230, 126, 34, 160)),
    ("COLECTIVA", Rgba::new(26, 188, 156, 160)),
    ("POZO PARA RIEGO", Rgba::new(49, 130, 206, 160)),
];

/// Color for categories matching no keyword.
pub const DEFAULT_COLOR: Rgba = Rgba::new(149, 165, 166, 140);

/// Color of the first keyword contained in `category`.
#[must_use]
pub fn category_color(category: &str) -> Rgba {
    MODALITY_PALETTE
        .iter()
        .find(|(keyword, _)| category.contains(keyword))
        .map_or(DEFAULT_COLOR, |(_, color)| *color)
}
