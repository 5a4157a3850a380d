/// Kind of media installed, byte 11 of the status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    None,
    Continuous,
    DieCut,
    Unknown(u8),
}

impl MediaType {
    pub fn from_code(code: u8) -> Self {
        // The command reference says 0x4A / 0x4B but devices report 0x0A / 0x0B.
        match code {
            0x00 => Self::None,
            0x0A => Self::Continuous,
            0x0B => Self::DieCut,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::Continuous => 0x0A,
            Self::DieCut => 0x0B,
            Self::Unknown(code) => *code,
        }
    }
}

/// Position of the printable area on the 720 dot head, in dots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub left: u32,
    pub printable: u32,
    pub right: u32,
}

impl Geometry {
    const fn new(left: u32, printable: u32, right: u32) -> Self {
        Geometry {
            left,
            printable,
            right,
        }
    }
}

struct GeometryEntry {
    media_type: MediaType,
    width_mm: u8,
    // 0 for continuous tape
    length_mm: u8,
    geometry: Geometry,
}

const fn entry(media_type: MediaType, width_mm: u8, length_mm: u8, geometry: Geometry) -> GeometryEntry {
    GeometryEntry {
        media_type,
        width_mm,
        length_mm,
        geometry,
    }
}

use MediaType::{Continuous, DieCut};

// Declaration order matters for the die-cut fallback below.
static GEOMETRY: &[GeometryEntry] = &[
    // Continuous length tape
    entry(Continuous, 12, 0, Geometry::new(585, 106, 29)),
    entry(Continuous, 29, 0, Geometry::new(408, 306, 6)),
    entry(Continuous, 38, 0, Geometry::new(295, 413, 12)),
    entry(Continuous, 50, 0, Geometry::new(154, 554, 12)),
    entry(Continuous, 54, 0, Geometry::new(130, 590, 0)),
    entry(Continuous, 62, 0, Geometry::new(12, 696, 12)),
    // Die-cut labels (width x length)
    entry(DieCut, 17, 54, Geometry::new(555, 165, 0)),
    entry(DieCut, 17, 87, Geometry::new(555, 165, 0)),
    entry(DieCut, 23, 23, Geometry::new(442, 236, 42)),
    entry(DieCut, 29, 42, Geometry::new(408, 306, 6)),
    entry(DieCut, 29, 90, Geometry::new(408, 306, 6)),
    entry(DieCut, 38, 90, Geometry::new(295, 413, 12)),
    entry(DieCut, 39, 48, Geometry::new(289, 425, 6)),
    entry(DieCut, 52, 29, Geometry::new(142, 578, 0)),
    entry(DieCut, 54, 29, Geometry::new(59, 602, 59)),
    entry(DieCut, 60, 86, Geometry::new(24, 672, 24)),
    entry(DieCut, 62, 29, Geometry::new(12, 696, 12)),
    entry(DieCut, 62, 100, Geometry::new(12, 696, 12)),
    // Round labels, diameter as width and length
    entry(DieCut, 12, 12, Geometry::new(513, 94, 113)),
    entry(DieCut, 24, 24, Geometry::new(442, 236, 42)),
    entry(DieCut, 58, 58, Geometry::new(51, 618, 51)),
];

fn lookup(media_type: MediaType, width_mm: u8, length_mm: u8) -> Option<Geometry> {
    GEOMETRY
        .iter()
        .find(|e| e.media_type == media_type && e.width_mm == width_mm && e.length_mm == length_mm)
        .map(|e| e.geometry)
}

/// Resolve the printable area for the installed media.
///
/// Length is ignored for continuous tape. Unknown die-cut lengths fall back
/// to the first die-cut entry of the same width in table order, which is
/// only an approximation when several label lengths share a width.
pub fn resolve_geometry(media_type: MediaType, width_mm: u8, length_mm: u8) -> Option<Geometry> {
    let key_length = if media_type == Continuous { 0 } else { length_mm };
    if let Some(geometry) = lookup(media_type, width_mm, key_length) {
        return Some(geometry);
    }

    match media_type {
        DieCut => GEOMETRY
            .iter()
            .find(|e| e.media_type == DieCut && e.width_mm == width_mm)
            .map(|e| e.geometry),
        Continuous => lookup(Continuous, width_mm, 0),
        _ => None,
    }
}

static SUPPLIES: &[(MediaType, u8, u8, &str)] = &[
    (Continuous, 12, 0, "DK-22214 12mm continuous"),
    (Continuous, 29, 0, "DK-22210 29mm continuous"),
    (Continuous, 38, 0, "DK-22225 38mm continuous"),
    (Continuous, 50, 0, "DK-22223 50mm continuous"),
    (Continuous, 54, 0, "DK-22211 54mm continuous"),
    (Continuous, 62, 0, "DK-22205 62mm continuous"),
    (DieCut, 17, 54, "DK-1208 17×54"),
    (DieCut, 29, 90, "DK-1201 29×90"),
    (DieCut, 38, 90, "DK-1202 38×90"),
    (DieCut, 62, 29, "DK-1209 62×29"),
    (DieCut, 62, 100, "DK-1218 62×100"),
    (DieCut, 24, 24, "Round Ø24"),
];

/// Brother DK supply name for the media, when it is a known roll.
pub fn supply_name(media_type: MediaType, width_mm: u8, length_mm: u8) -> Option<&'static str> {
    let length_mm = if media_type == Continuous { 0 } else { length_mm };
    SUPPLIES
        .iter()
        .find(|(t, w, l, _)| *t == media_type && *w == width_mm && *l == length_mm)
        .map(|(_, _, _, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_62() {
        assert_eq!(
            resolve_geometry(Continuous, 62, 0),
            Some(Geometry::new(12, 696, 12))
        );
    }

    #[test]
    fn continuous_12() {
        assert_eq!(
            resolve_geometry(Continuous, 12, 0),
            Some(Geometry::new(585, 106, 29))
        );
    }

    #[test]
    fn continuous_ignores_length() {
        assert_eq!(
            resolve_geometry(Continuous, 29, 77),
            Some(Geometry::new(408, 306, 6))
        );
    }

    #[test]
    fn die_cut_exact() {
        assert_eq!(
            resolve_geometry(DieCut, 23, 23),
            Some(Geometry::new(442, 236, 42))
        );
        assert_eq!(
            resolve_geometry(DieCut, 58, 58),
            Some(Geometry::new(51, 618, 51))
        );
    }

    #[test]
    fn die_cut_unknown_length_takes_first_entry_with_width() {
        // 62x29 is declared before 62x100
        assert_eq!(
            resolve_geometry(DieCut, 62, 50),
            Some(Geometry::new(12, 696, 12))
        );
        assert_eq!(
            resolve_geometry(DieCut, 17, 1),
            Some(Geometry::new(555, 165, 0))
        );
    }

    #[test]
    fn unknown_media_has_no_geometry() {
        assert_eq!(resolve_geometry(Continuous, 100, 0), None);
        assert_eq!(resolve_geometry(DieCut, 100, 100), None);
        assert_eq!(resolve_geometry(MediaType::None, 62, 0), None);
    }

    #[test]
    fn table_covers_full_head() {
        for e in GEOMETRY {
            let g = e.geometry;
            assert_eq!(g.left + g.printable + g.right, 720, "{}x{}", e.width_mm, e.length_mm);
        }
    }

    #[test]
    fn media_type_codes() {
        assert_eq!(MediaType::from_code(0x0A), Continuous);
        assert_eq!(MediaType::from_code(0x0B), DieCut);
        assert_eq!(MediaType::from_code(0x4A), MediaType::Unknown(0x4A));
        assert_eq!(MediaType::Unknown(0x4A).code(), 0x4A);
    }

    #[test]
    fn supply_names() {
        assert_eq!(supply_name(Continuous, 62, 9), Some("DK-22205 62mm continuous"));
        assert_eq!(supply_name(DieCut, 29, 90), Some("DK-1201 29×90"));
        assert_eq!(supply_name(DieCut, 29, 42), None);
    }
}
