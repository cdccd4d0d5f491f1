use serde::{Deserialize, Serialize};

/// Named physical paper sizes. Dimensions are portrait, in millimeters.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    Letter,
    Legal,
}

impl PaperSize {
    pub const ALL: [Self; 4] = [Self::A4, Self::A3, Self::Letter, Self::Legal];

    /// Portrait (width, height) in millimeters.
    pub const fn dimensions_mm(self) -> (f64, f64) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::A3 => "A3",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
        }
    }

    /// Page size for the given orientation.
    pub const fn oriented_mm(self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Common tabletop token sizes (one grid square is 25.4 mm).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TokenPreset {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
    Gargantuan,
}

impl TokenPreset {
    pub const ALL: [Self; 6] = [
        Self::Tiny,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Huge,
        Self::Gargantuan,
    ];

    pub const fn size_mm(self) -> f64 {
        match self {
            Self::Tiny => 12.7,
            Self::Small | Self::Medium => 25.4,
            Self::Large => 50.8,
            Self::Huge => 76.2,
            Self::Gargantuan => 101.6,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tiny => "Tiny",
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::Huge => "Huge",
            Self::Gargantuan => "Gargantuan",
        }
    }
}

/// Serializable row for the paper/preset pickers in the JS front end.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NamedSize {
    pub id: String,
    pub label: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
}

pub fn paper_table() -> Vec<NamedSize> {
    PaperSize::ALL
        .iter()
        .map(|p| {
            let (width_mm, height_mm) = p.dimensions_mm();
            NamedSize {
                id: p.label().to_lowercase(),
                label: p.label(),
                width_mm,
                height_mm,
            }
        })
        .collect()
}

pub fn token_preset_table() -> Vec<NamedSize> {
    TokenPreset::ALL
        .iter()
        .map(|t| NamedSize {
            id: t.label().to_lowercase(),
            label: t.label(),
            width_mm: t.size_mm(),
            height_mm: t.size_mm(),
        })
        .collect()
}
