//! Built-in frame recipes.
//!
//! Gradient strokes are flattened to their middle color and glow effects
//! are left out; both are easy to lose in print anyway.

use super::{FrameCategory, Part, RecipeFrame};
use crate::color::Rgba;

fn c(hex: &str) -> Rgba {
    Rgba::from_hex(hex).unwrap_or(Rgba::new(0, 0, 0, 255))
}

fn ring(color: &str, width: f64, inset: f64) -> Part {
    Part::Ring {
        color: c(color),
        width,
        inset,
        dash: None,
    }
}

fn corner_dots(color: &str, radius: f64, inset: f64) -> Part {
    Part::CornerDots {
        color: c(color),
        radius,
        inset,
    }
}

fn cardinal_dots(color: &str, radius: f64, inset: f64) -> Part {
    Part::CardinalDots {
        color: c(color),
        radius,
        inset,
    }
}

fn diamonds(color: &str, size: f64, inset: f64) -> Part {
    Part::Diamonds {
        color: c(color),
        size,
        inset,
    }
}

fn spikes(color: &str, size: f64, inset: f64, count: u32, inward: bool) -> Part {
    Part::Spikes {
        color: c(color),
        size,
        inset,
        count,
        inward,
    }
}

pub(super) fn frames() -> Vec<RecipeFrame> {
    use FrameCategory::{Anime, Dark, Fantasy, Metal, Minimal, Scifi};

    vec![
        // Classic fantasy
        RecipeFrame::new(
            "gold-ornate",
            "Gold Ornate",
            Fantasy,
            vec![
                ring("#ffe8a1", 3.0, 2.0),
                ring("#8b6914", 1.0, 7.0),
                corner_dots("#f0d67b", 2.0, 4.5),
            ],
        ),
        RecipeFrame::new(
            "royal",
            "Royal Crest",
            Fantasy,
            vec![
                ring("#4a0e6b", 3.5, 2.0),
                ring("#c9a03c", 1.0, 7.0),
                diamonds("#c9a03c", 3.0, 4.5),
            ],
        ),
        RecipeFrame::new(
            "silver-filigree",
            "Silver Filigree",
            Fantasy,
            vec![
                ring("#eaf0f6", 2.5, 2.0),
                ring("#a0b4c8", 0.8, 6.0),
                corner_dots("#dde6ef", 1.5, 4.0),
                cardinal_dots("#c8d6e5", 1.0, 4.0),
            ],
        ),
        RecipeFrame::new(
            "runic",
            "Runic Circle",
            Fantasy,
            vec![
                ring("#2a4a7a", 2.5, 2.0),
                ring("#6699cc", 0.8, 6.0),
                Part::Ticks {
                    color: c("#88bbee"),
                    width: 1.5,
                    inset: 3.5,
                    count: 16,
                },
            ],
        ),
        // Dark & horror
        RecipeFrame::new(
            "gothic",
            "Gothic",
            Dark,
            vec![
                ring("#1a1a2e", 4.0, 2.0),
                ring("#3d1f5c", 1.0, 2.0),
                Part::CornerSpikes {
                    color: c("#1a1a2e"),
                    size: 5.0,
                    inset: 2.0,
                },
            ],
        ),
        RecipeFrame::new(
            "bone",
            "Bone",
            Dark,
            vec![
                ring("#3d2b1f", 4.0, 1.5),
                ring("#d4c5a0", 2.5, 3.0),
                corner_dots("#d4c5a0", 3.0, 3.0),
                corner_dots("#3d2b1f", 1.5, 3.0),
            ],
        ),
        RecipeFrame::new(
            "thorns",
            "Thorns",
            Dark,
            vec![
                ring("#2a0a0a", 3.0, 2.0),
                ring("#5c1a1a", 1.0, 2.0),
                spikes("#3a0e0e", 4.0, 2.0, 20, true),
                corner_dots("#8b0000", 1.5, 3.5),
            ],
        ),
        RecipeFrame::new(
            "infernal",
            "Infernal",
            Dark,
            vec![
                ring("#ff4500", 3.0, 2.0),
                ring("#ff660044", 1.5, 6.0),
                spikes("#ff440066", 5.0, 1.5, 14, false),
            ],
        ),
        // Sci-fi & cyber
        RecipeFrame::new(
            "hud",
            "HUD Interface",
            Scifi,
            vec![
                Part::Brackets {
                    color: c("#00e5ff"),
                    width: 1.5,
                    inset: 3.0,
                    length: 0.25,
                },
                Part::Ticks {
                    color: c("#00e5ff88"),
                    width: 1.0,
                    inset: 3.0,
                    count: 8,
                },
            ],
        ),
        RecipeFrame::new(
            "neon",
            "Neon Glow",
            Scifi,
            vec![ring("#ff00ff", 2.0, 3.0), ring("#ff88ff", 1.0, 5.0)],
        ),
        RecipeFrame::new(
            "matrix",
            "Digital Grid",
            Scifi,
            vec![
                ring("#00ff41", 1.5, 2.0),
                Part::Brackets {
                    color: c("#00ff41"),
                    width: 1.0,
                    inset: 2.0,
                    length: 0.15,
                },
            ],
        ),
        RecipeFrame::new(
            "holographic",
            "Holographic",
            Scifi,
            vec![ring("#00ff88", 2.5, 2.5), ring("#ffffff44", 0.8, 6.0)],
        ),
        // Anime & stylized
        RecipeFrame::new(
            "energy",
            "Power Aura",
            Anime,
            vec![
                ring("#ffd700", 3.0, 2.0),
                spikes("#ffd70088", 4.0, 2.0, 16, false),
            ],
        ),
        RecipeFrame::new(
            "kawaii",
            "Pastel Dream",
            Anime,
            vec![
                ring("#b3ffb3", 4.0, 2.0),
                ring("#ffffff88", 1.5, 7.0),
                Part::CornerStars {
                    color: c("#ffffff"),
                    size: 3.0,
                    inset: 4.0,
                },
            ],
        ),
        RecipeFrame::new(
            "starlight",
            "Starlight",
            Anime,
            vec![
                ring("#1a1a4e", 3.5, 2.0),
                ring("#3333aa", 0.8, 6.5),
                Part::CornerStars {
                    color: c("#eeeeff"),
                    size: 2.5,
                    inset: 4.0,
                },
                Part::CardinalStars {
                    color: c("#ccccff"),
                    size: 1.8,
                    inset: 4.0,
                },
            ],
        ),
        // Metal & material
        RecipeFrame::new(
            "metal-gold",
            "Gold",
            Metal,
            vec![
                ring("#ffec8b", 4.0, 2.0),
                ring("#8b6914aa", 0.5, 2.0),
                ring("#8b6914aa", 0.5, 7.0),
            ],
        ),
        RecipeFrame::new(
            "metal-silver",
            "Silver",
            Metal,
            vec![
                ring("#f0f0f0", 4.0, 2.0),
                ring("#50505088", 0.5, 2.0),
                ring("#50505088", 0.5, 7.0),
            ],
        ),
        RecipeFrame::new(
            "metal-copper",
            "Copper",
            Metal,
            vec![
                ring("#e8a882", 4.0, 2.0),
                ring("#6b331388", 0.5, 2.0),
                ring("#6b331388", 0.5, 7.0),
            ],
        ),
        RecipeFrame::new(
            "metal-iron",
            "Iron",
            Metal,
            vec![
                ring("#787878", 4.5, 2.0),
                ring("#22222288", 0.5, 2.0),
                ring("#22222288", 0.5, 7.5),
                corner_dots("#888888", 1.5, 4.0),
                cardinal_dots("#888888", 1.2, 4.0),
            ],
        ),
        RecipeFrame::new(
            "metal-bronze",
            "Bronze",
            Metal,
            vec![
                ring("#daa06d", 3.5, 2.0),
                ring("#5a351588", 0.5, 2.0),
                ring("#5a351588", 0.5, 7.0),
                diamonds("#cd7f32", 2.5, 4.0),
            ],
        ),
        // Minimal & clean
        RecipeFrame::new("thin", "Thin Border", Minimal, vec![ring("#ffffff", 1.5, 3.0)]),
        RecipeFrame::new(
            "double",
            "Double Line",
            Minimal,
            vec![ring("#cccccc", 1.0, 2.0), ring("#cccccc", 1.0, 6.0)],
        ),
        RecipeFrame::new(
            "elegant",
            "Elegant",
            Minimal,
            vec![ring("#d4af37", 1.0, 4.0), diamonds("#d4af37", 2.5, 4.0)],
        ),
        RecipeFrame::new(
            "shadow",
            "Shadow Ring",
            Minimal,
            vec![ring("#444444", 3.0, 2.5), ring("#666666", 1.0, 2.5)],
        ),
        RecipeFrame::new(
            "dotted",
            "Dotted",
            Minimal,
            vec![Part::Ring {
                color: c("#cccccc"),
                width: 2.0,
                inset: 3.0,
                dash: Some([1.5, 2.5]),
            }],
        ),
    ]
}
