//! Option catalogs: the legal values for every configuration axis.
//!
//! Each axis is a closed enum with a stable wire id (`as_str`), a label for
//! display and an ordered `ALL` list in catalog order.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates a catalog enum with its id/label tables.
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => ($id:tt, $label:tt)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $id)] $variant),+
        }

        impl $name {
            /// Every option, in catalog order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable identifier used in stored carts.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }

            /// Human readable label.
            pub fn display_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CommerceError;

            /// Look an option up by its identifier.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok($name::$variant),)+
                    _ => Err(CommerceError::UnknownOption {
                        axis: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}

option_enum! {
    /// Ring cross-section profile.
    Profile {
        Flat => ("flat", "Flat"),
        FlatBevelled => ("flat-bevelled", "Flat, bevelled"),
        FlatRounded => ("flat-rounded", "Flat, rounded edges"),
        SlightlyDomed => ("slightly-domed", "Slightly domed"),
        Domed => ("domed", "Domed"),
        HalfRound => ("half-round", "Half round"),
        Oval => ("oval", "Oval"),
        Comfort => ("comfort", "Comfort fit"),
        ComfortDomed => ("comfort-domed", "Comfort fit, domed"),
        Concave => ("concave", "Concave"),
        ConcaveBevelled => ("concave-bevelled", "Concave, bevelled"),
        Triangle => ("triangle", "Triangle"),
        Ridge => ("ridge", "Ridge"),
        DoubleBevel => ("double-bevel", "Double bevel"),
        Knife => ("knife", "Knife edge"),
        Square => ("square", "Square"),
        Cushion => ("cushion", "Cushion"),
    }
}

option_enum! {
    /// Ring size measuring system.
    RingSizeSystem {
        Universal => ("universal", "Universal"),
        Uk => ("uk", "UK"),
        Usa => ("usa", "USA"),
    }
}

option_enum! {
    /// How many metal colors the ring is made of.
    ColorType {
        Single => ("single", "Single color"),
        Two => ("two", "Two colors"),
        Three => ("three", "Three colors"),
    }
}

option_enum! {
    /// Precious metal color.
    MetalColor {
        Yellow => ("yellow", "Yellow gold"),
        White => ("white", "White gold"),
        Rose => ("rose", "Rose gold"),
        Red => ("red", "Red gold"),
        Grey => ("grey", "Grey gold"),
    }
}

option_enum! {
    /// Surface finish, used for metal polish as well as grooves and edges.
    Surface {
        Polished => ("polished", "Polished"),
        Matte => ("matte", "Matte"),
        Satin => ("satin", "Satin"),
        Hammered => ("hammered", "Hammered"),
        Ice => ("ice", "Ice matte"),
        Sandblasted => ("sandblasted", "Sandblasted"),
    }
}

option_enum! {
    /// Gold purity.
    Fineness {
        K8 => ("333", "8 karat (333)"),
        K14 => ("585", "14 karat (585)"),
        K18 => ("750", "18 karat (750)"),
        K22 => ("916", "22 karat (916)"),
    }
}

option_enum! {
    /// How a multi-color ring divides its colors.
    ShapeCategory {
        Straight => ("straight", "Straight"),
        Sine => ("sine", "Sine wave"),
        Diagonal => ("diagonal", "Diagonal"),
    }
}

option_enum! {
    /// Layout variant within a shape category.
    ShapeVariant {
        Halves => ("halves", "Side by side"),
        Inlay => ("inlay", "Center inlay"),
        Bands => ("bands", "Equal bands"),
    }
}

option_enum! {
    /// Stone setting style.
    SettingType {
        NoStone => ("no-stone", "No stone"),
        Channel => ("channel", "Channel setting"),
        Bezel => ("bezel", "Bezel setting"),
        Tension => ("tension", "Tension setting"),
        Pave => ("pave", "Pave setting"),
        FreeStoneSpreading => ("free-stone-spreading", "Free Stone Spreading"),
    }
}

option_enum! {
    /// Gemstone type.
    StoneType {
        Diamond => ("diamond", "Diamond"),
        Sapphire => ("sapphire", "Sapphire"),
        Ruby => ("ruby", "Ruby"),
        Emerald => ("emerald", "Emerald"),
        Zirconia => ("zirconia", "Zirconia"),
    }
}

option_enum! {
    /// Stone diameter.
    StoneSize {
        Mm1_0 => ("1.0", "1.0 mm"),
        Mm1_5 => ("1.5", "1.5 mm"),
        Mm2_0 => ("2.0", "2.0 mm"),
        Mm2_5 => ("2.5", "2.5 mm"),
        Mm3_0 => ("3.0", "3.0 mm"),
    }
}

option_enum! {
    /// Stone color/clarity grade.
    StoneQuality {
        TwVvs => ("tw-vvs", "TW/VVS"),
        TwVs => ("tw-vs", "TW/VS"),
        TwSi => ("tw-si", "TW/SI"),
        WSi => ("w-si", "W/SI"),
    }
}

option_enum! {
    /// Gap between neighbouring stones.
    StoneSpacing {
        Touching => ("touching", "Touching"),
        Narrow => ("narrow", "Narrow"),
        Wide => ("wide", "Wide"),
    }
}

option_enum! {
    /// Where the stone row sits across the ring width.
    StonePosition {
        Center => ("center", "Center"),
        Left => ("left", "Left"),
        Right => ("right", "Right"),
        Free => ("free", "Free"),
    }
}

option_enum! {
    /// Groove cut.
    GrooveType {
        Plain => ("none", "No groove"),
        U => ("u", "U groove"),
        V => ("v", "V groove"),
        Square => ("square", "Square groove"),
        Milgrain => ("milgrain", "Milgrain groove"),
    }
}

option_enum! {
    /// Path a groove takes around the ring.
    GrooveDirection {
        Vertical => ("vertical", "Straight"),
        Wave => ("wave", "Wave"),
    }
}

option_enum! {
    /// Edge treatment.
    EdgeType {
        Plain => ("none", "None"),
        Step => ("step", "Step edge"),
        Carbon => ("carbon", "Carbon edge"),
        Milgrain => ("milgrain", "Milgrain edge"),
    }
}

option_enum! {
    /// Engraving typeface.
    Font {
        Arial => ("arial", "Arial"),
        TimesNewRoman => ("times-new-roman", "Times New Roman"),
        CenturyGothic => ("century-gothic", "Century Gothic"),
        LucidaHandwriting => ("lucida-handwriting", "Lucida Handwriting"),
        MonotypeCorsiva => ("monotype-corsiva", "Monotype Corsiva"),
    }
}

option_enum! {
    /// Symbols that can be inserted into an engraving.
    EngravingSymbol {
        Heart => ("heart", "Heart"),
        Infinity => ("infinity", "Infinity"),
        Star => ("star", "Star"),
        Clover => ("clover", "Clover"),
        Rings => ("rings", "Interlocked rings"),
    }
}

impl ColorType {
    /// Number of color zones this color type requires.
    pub fn color_count(&self) -> usize {
        match self {
            ColorType::Single => 1,
            ColorType::Two => 2,
            ColorType::Three => 3,
        }
    }
}

impl Fineness {
    pub fn karats(&self) -> u8 {
        match self {
            Fineness::K8 => 8,
            Fineness::K14 => 14,
            Fineness::K18 => 18,
            Fineness::K22 => 22,
        }
    }
}

impl StoneSize {
    pub fn millimeters(&self) -> f64 {
        match self {
            StoneSize::Mm1_0 => 1.0,
            StoneSize::Mm1_5 => 1.5,
            StoneSize::Mm2_0 => 2.0,
            StoneSize::Mm2_5 => 2.5,
            StoneSize::Mm3_0 => 3.0,
        }
    }
}

impl EngravingSymbol {
    /// Character inserted into the engraving text.
    pub fn glyph(&self) -> char {
        match self {
            EngravingSymbol::Heart => '\u{2665}',
            EngravingSymbol::Infinity => '\u{221e}',
            EngravingSymbol::Star => '\u{2605}',
            EngravingSymbol::Clover => '\u{2618}',
            EngravingSymbol::Rings => '\u{26ad}',
        }
    }
}

/// Selectable profile widths in millimeters.
pub const PROFILE_WIDTHS: &[f64] = &[2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

/// Selectable profile heights in millimeters.
pub const PROFILE_HEIGHTS: &[f64] = &[1.0, 1.2, 1.4, 1.6, 1.8, 2.0];

/// Whether `value` is one of `choices` (catalog values are exact literals).
pub fn is_catalog_value(choices: &[f64], value: f64) -> bool {
    choices.iter().any(|c| (c - value).abs() < 1e-9)
}

/// A ring size. Universal and US sizes are numeric, UK sizes are letters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RingSize {
    Number(f64),
    Label(String),
}

impl fmt::Display for RingSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingSize::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            RingSize::Number(n) => write!(f, "{}", n),
            RingSize::Label(s) => f.write_str(s),
        }
    }
}

/// Ring sizes offered for a measuring system, smallest first.
pub fn ring_sizes(system: RingSizeSystem) -> Vec<RingSize> {
    match system {
        // inner circumference in millimeters
        RingSizeSystem::Universal => (44..=72).map(|n| RingSize::Number(n as f64)).collect(),
        RingSizeSystem::Usa => (6..=26)
            .map(|half| RingSize::Number(half as f64 / 2.0))
            .collect(),
        RingSizeSystem::Uk => ('F'..='Z').map(|c| RingSize::Label(c.to_string())).collect(),
    }
}

/// First (default) size of a measuring system.
pub fn default_ring_size(system: RingSizeSystem) -> RingSize {
    match system {
        RingSizeSystem::Universal => RingSize::Number(44.0),
        RingSizeSystem::Usa => RingSize::Number(3.0),
        RingSizeSystem::Uk => RingSize::Label("F".to_string()),
    }
}

/// Whether `size` is offered in `system`.
pub fn is_ring_size_of(system: RingSizeSystem, size: &RingSize) -> bool {
    ring_sizes(system).iter().any(|s| s == size)
}

/// Shape category/variant pairs offered for a color type.
pub fn shape_options(color_type: ColorType) -> &'static [(ShapeCategory, ShapeVariant)] {
    use ShapeCategory::*;
    use ShapeVariant::*;
    match color_type {
        ColorType::Single => &[],
        ColorType::Two => &[
            (Straight, Halves),
            (Straight, Inlay),
            (Sine, Halves),
            (Diagonal, Halves),
        ],
        ColorType::Three => &[
            (Straight, Bands),
            (Straight, Inlay),
            (Sine, Bands),
            (Diagonal, Bands),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_catalog_size() {
        assert_eq!(Profile::ALL.len(), 17);
    }

    #[test]
    fn test_ids_round_trip_through_lookup() {
        for setting in SettingType::ALL {
            assert_eq!(setting.as_str().parse::<SettingType>().ok(), Some(*setting));
        }
        assert!(matches!(
            "Step".parse::<EdgeType>(),
            Err(CommerceError::UnknownOption { axis: "EdgeType", .. })
        ));
    }

    #[test]
    fn test_serde_uses_catalog_ids() {
        let json = serde_json::to_string(&SettingType::NoStone).unwrap();
        assert_eq!(json, "\"no-stone\"");
        let parsed: Fineness = serde_json::from_str("\"750\"").unwrap();
        assert_eq!(parsed, Fineness::K18);
    }

    #[test]
    fn test_ring_sizes_per_system() {
        assert_eq!(ring_sizes(RingSizeSystem::Universal).len(), 29);
        assert_eq!(ring_sizes(RingSizeSystem::Usa)[1], RingSize::Number(3.5));
        assert_eq!(
            ring_sizes(RingSizeSystem::Uk).last(),
            Some(&RingSize::Label("Z".to_string()))
        );
        for system in RingSizeSystem::ALL {
            assert_eq!(ring_sizes(*system)[0], default_ring_size(*system));
        }
    }

    #[test]
    fn test_ring_size_untagged_serde() {
        let n: RingSize = serde_json::from_str("54").unwrap();
        assert_eq!(n, RingSize::Number(54.0));
        let l: RingSize = serde_json::from_str("\"M\"").unwrap();
        assert!(is_ring_size_of(RingSizeSystem::Uk, &l));
        assert!(!is_ring_size_of(RingSizeSystem::Usa, &l));
        assert_eq!(RingSize::Number(6.5).to_string(), "6.5");
        assert_eq!(RingSize::Number(54.0).to_string(), "54");
    }

    #[test]
    fn test_shape_options_by_color_type() {
        assert!(shape_options(ColorType::Single).is_empty());
        let sine_halves = (ShapeCategory::Sine, ShapeVariant::Halves);
        assert!(shape_options(ColorType::Two).contains(&sine_halves));
        assert!(!shape_options(ColorType::Three).contains(&sine_halves));
    }

    #[test]
    fn test_catalog_value_membership() {
        assert!(is_catalog_value(PROFILE_WIDTHS, 3.5));
        assert!(!is_catalog_value(PROFILE_WIDTHS, 3.25));
        assert!(is_catalog_value(PROFILE_HEIGHTS, 1.4));
    }
}
