//! Column-name aliases and the resolver that reads through them.
//!
//! Source files disagree on column spelling (`MUNICIPIO`, the `MUNUCUPIO`
//! typo, `Municipio`). All attribute reads go through [`resolve`] with one
//! of the alias lists below, so schema drift is handled in data rather
//! than scattered through the filtering code.

use incident_map_records_models::Attributes;

/// Grave-site latitude columns.
pub const GRAVE_LATITUDE: &[&str] = &["Coord_Y", "coord_y", "Y", "lat", "Lat"];
/// Grave-site longitude columns.
pub const GRAVE_LONGITUDE: &[&str] = &["Coord_X", "coord_x", "X", "lon", "Lng", "Long"];
/// Grave-site municipality.
pub const GRAVE_MUNICIPALITY: &[&str] = &["MUNICIPIO", "MUNUCUPIO"];
/// Municipality lookup used when locating a named grave (accepts the
/// mixed-case spellings too).
pub const GRAVE_MUNICIPALITY_ANY: &[&str] = &["MUNICIPIO", "MUNUCUPIO", "Municipio", "municipio"];
/// Grave-site zone.
pub const GRAVE_ZONE: &[&str] = &["ZONA"];
/// Grave-site modality (burial context classification).
pub const GRAVE_MODALITY: &[&str] = &["MODALIDAD DE FOSA", "MODALIDAD"];
/// Who made the discovery.
pub const GRAVE_FINDER: &[&str] = &["QUIÉN HIZO EL HALLAZGO", "QUIEN HIZO EL HALLAZGO"];
/// Grave-site free-text description.
pub const GRAVE_DESCRIPTION: &[&str] = &["DESCRIPCIÓN", "Descripcion", "DESCRIPCION"];
/// Grave-site explicit year.
pub const GRAVE_YEAR: &[&str] = &["AÑO", "Anio", "Año", "año"];
/// Grave-site free-text date.
pub const GRAVE_DATE: &[&str] = &["FECHA DEL HALLAZGO", "FECHA", "Fecha"];

/// Massacre latitude column.
pub const MASSACRE_LATITUDE: &[&str] = &["coord_y"];
/// Massacre longitude column.
pub const MASSACRE_LONGITUDE: &[&str] = &["coord_x"];
/// Massacre municipality.
pub const MASSACRE_MUNICIPALITY: &[&str] = &["Municipio", "MUNICIPIO", "municipio"];
/// Massacre summary.
pub const MASSACRE_DESCRIPTION: &[&str] = &[
    "Descripción resumida",
    "DESCRIPCIÓN",
    "Descripcion",
    "DESCRIPCION",
];
/// Massacre place.
pub const MASSACRE_PLACE: &[&str] = &["LUGAR", "Lugar", "lugar"];
/// Massacre explicit year.
pub const MASSACRE_YEAR: &[&str] = &["año", "Año", "AÑO"];
/// Massacre free-text date.
pub const MASSACRE_DATE: &[&str] = &["fecha", "Fecha", "FECHA"];

/// Returns the trimmed value of the first alias present with non-blank
/// content, or `""` when none qualifies.
#[must_use]
pub fn resolve<'a>(attributes: &'a Attributes, aliases: &[&str]) -> &'a str {
    aliases
        .iter()
        .filter_map(|alias| attributes.get(alias))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or("")
}
