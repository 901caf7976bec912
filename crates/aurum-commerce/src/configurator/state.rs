//! Ring configuration state and its pure update operations.
//!
//! Every update consumes a [`ConfiguratorState`] and returns the next one
//! with the cross-field invariants re-established. Nothing here persists
//! anything; write-back to the cart happens in the storefront service.

use crate::catalog::WeightRange;
use crate::configurator::options::{
    default_ring_size, is_catalog_value, is_ring_size_of, shape_options, ColorType, EdgeType,
    EngravingSymbol, Fineness, Font, GrooveDirection, GrooveType, MetalColor, Profile, RingSize,
    RingSizeSystem, SettingType, ShapeCategory, ShapeVariant, StonePosition, StoneQuality,
    StoneSize, StoneSpacing, StoneType, Surface, PROFILE_HEIGHTS, PROFILE_WIDTHS,
};
use crate::error::CommerceError;
use crate::ids::StoneId;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// Maximum number of grooves on one ring.
pub const MAX_GROOVES: usize = 5;

/// Wave count given to a freshly selected sine shape.
pub const DEFAULT_SHAPE_WAVE_COUNT: u8 = 3;

/// Height percentage given to a freshly selected diagonal shape.
pub const DEFAULT_SHAPE_HEIGHT_PERCENTAGE: u8 = 50;

/// Waves given to a groove switched to the wave direction.
pub const DEFAULT_GROOVE_WAVES: u8 = 1;

/// Wave height (percent) given to a groove switched to the wave direction.
pub const DEFAULT_GROOVE_WAVE_HEIGHT: u8 = 5;

const DEFAULT_EDGE_WIDTH: f64 = 0.5;

/// A complete ring build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguratorState {
    pub selected_profile: Option<Profile>,
    pub dimensions: Dimensions,
    pub precious_metal: PreciousMetal,
    pub stone_settings: StoneSettings,
    pub grooves_and_edges: GroovesAndEdges,
    pub engraving: Engraving,
    /// Grams.
    pub weight: f64,
}

impl Default for ConfiguratorState {
    fn default() -> Self {
        Self {
            selected_profile: None,
            dimensions: Dimensions::default(),
            precious_metal: PreciousMetal::default(),
            stone_settings: StoneSettings::default(),
            grooves_and_edges: GroovesAndEdges::default(),
            engraving: Engraving::default(),
            weight: 0.0,
        }
    }
}

/// A stored ring size that the stored system does not offer is reset to
/// that system's default on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DimensionsRepr")]
pub struct Dimensions {
    /// Millimeters, one of [`PROFILE_WIDTHS`].
    pub profile_width: Option<f64>,
    /// Millimeters, one of [`PROFILE_HEIGHTS`].
    pub profile_height: Option<f64>,
    pub ring_size: Option<RingSize>,
    pub ring_size_system: RingSizeSystem,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DimensionsRepr {
    profile_width: Option<f64>,
    profile_height: Option<f64>,
    ring_size: Option<RingSize>,
    ring_size_system: RingSizeSystem,
}

impl From<DimensionsRepr> for Dimensions {
    fn from(repr: DimensionsRepr) -> Self {
        Dimensions {
            profile_width: repr.profile_width,
            profile_height: repr.profile_height,
            ring_size: repr.ring_size,
            ring_size_system: repr.ring_size_system,
        }
        .normalized()
    }
}

impl Dimensions {
    fn normalized(mut self) -> Self {
        let system = self.ring_size_system;
        if let Some(size) = &self.ring_size {
            if !is_ring_size_of(system, size) {
                self.ring_size = Some(default_ring_size(system));
            }
        }
        self
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            profile_width: Some(PROFILE_WIDTHS[0]),
            profile_height: Some(PROFILE_HEIGHTS[0]),
            ring_size: Some(default_ring_size(RingSizeSystem::Universal)),
            ring_size_system: RingSizeSystem::Universal,
        }
    }
}

/// One metal color zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConfig {
    pub color: MetalColor,
    pub polish: Surface,
    pub fineness: Fineness,
}

impl ColorConfig {
    /// Default for the zone at `index`; neighbouring zones get distinct colors.
    pub fn for_zone(index: usize) -> Self {
        const PALETTE: [MetalColor; 3] = [MetalColor::Yellow, MetalColor::White, MetalColor::Rose];
        Self {
            color: PALETTE[index % PALETTE.len()],
            polish: Surface::Polished,
            fineness: Fineness::K14,
        }
    }
}

/// How the colors of a multi-color ring are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeConfig {
    pub category: ShapeCategory,
    pub variant: ShapeVariant,
    /// Only for [`ShapeCategory::Sine`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_count: Option<u8>,
    /// Only for [`ShapeCategory::Diagonal`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_percentage: Option<u8>,
}

impl ShapeConfig {
    pub fn new(category: ShapeCategory, variant: ShapeVariant) -> Self {
        Self {
            category,
            variant,
            wave_count: (category == ShapeCategory::Sine).then_some(DEFAULT_SHAPE_WAVE_COUNT),
            height_percentage: (category == ShapeCategory::Diagonal)
                .then_some(DEFAULT_SHAPE_HEIGHT_PERCENTAGE),
        }
    }

    /// Keep only the fields the category uses, filling missing ones.
    fn normalized(self) -> Self {
        let defaults = ShapeConfig::new(self.category, self.variant);
        Self {
            wave_count: defaults
                .wave_count
                .map(|d| self.wave_count.filter(|&n| n > 0).unwrap_or(d)),
            height_percentage: defaults.height_percentage.map(|d| {
                self.height_percentage
                    .filter(|pct| (1..=100).contains(pct))
                    .unwrap_or(d)
            }),
            ..self
        }
    }
}

/// Metal colors. With a color type set there is exactly one zone per color
/// and the shape is one the type offers; both are repaired on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PreciousMetalRepr")]
pub struct PreciousMetal {
    pub color_type: Option<ColorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeConfig>,
    pub colors: Vec<ColorConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreciousMetalRepr {
    color_type: Option<ColorType>,
    #[serde(default)]
    shape: Option<ShapeConfig>,
    colors: Vec<ColorConfig>,
}

impl From<PreciousMetalRepr> for PreciousMetal {
    fn from(repr: PreciousMetalRepr) -> Self {
        PreciousMetal {
            color_type: repr.color_type,
            shape: repr.shape,
            colors: repr.colors,
        }
        .normalized()
    }
}

impl PreciousMetal {
    /// Resize the color zones to the color type and keep the shape only
    /// where the type offers it, falling back to the type's first shape.
    fn normalized(mut self) -> Self {
        let Some(color_type) = self.color_type else {
            self.shape = None;
            return self;
        };
        let count = color_type.color_count();
        self.colors.truncate(count);
        while self.colors.len() < count {
            self.colors.push(ColorConfig::for_zone(self.colors.len()));
        }

        let options = shape_options(color_type);
        self.shape = match (options.first(), self.shape) {
            (None, _) => None,
            (Some(_), Some(shape)) if options.contains(&(shape.category, shape.variant)) => {
                Some(shape.normalized())
            }
            (Some(&(category, variant)), _) => Some(ShapeConfig::new(category, variant)),
        };
        self
    }
}

impl Default for PreciousMetal {
    fn default() -> Self {
        Self {
            color_type: Some(ColorType::Single),
            shape: None,
            colors: vec![ColorConfig::for_zone(0)],
        }
    }
}

/// A stone placed individually in Free Stone Spreading mode.
///
/// `x` and `y` are percentages of the unrolled ring surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeStone {
    pub id: StoneId,
    pub size: StoneSize,
    pub quality: StoneQuality,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoneSettingsRepr")]
pub struct StoneSettings {
    pub setting_type: SettingType,
    pub stone_type: Option<StoneType>,
    pub stone_size: Option<StoneSize>,
    pub stone_quality: Option<StoneQuality>,
    pub number_of_stones: u8,
    pub spacing: StoneSpacing,
    pub position: StonePosition,
    /// Millimeters from center; only with [`StonePosition::Free`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    /// Only with [`SettingType::FreeStoneSpreading`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stones: Vec<FreeStone>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoneSettingsRepr {
    setting_type: SettingType,
    stone_type: Option<StoneType>,
    stone_size: Option<StoneSize>,
    stone_quality: Option<StoneQuality>,
    number_of_stones: u8,
    spacing: StoneSpacing,
    position: StonePosition,
    #[serde(default)]
    offset: Option<f64>,
    #[serde(default)]
    stones: Vec<FreeStone>,
}

impl From<StoneSettingsRepr> for StoneSettings {
    fn from(repr: StoneSettingsRepr) -> Self {
        StoneSettings {
            setting_type: repr.setting_type,
            stone_type: repr.stone_type,
            stone_size: repr.stone_size,
            stone_quality: repr.stone_quality,
            number_of_stones: repr.number_of_stones,
            spacing: repr.spacing,
            position: repr.position,
            offset: repr.offset,
            stones: repr.stones,
        }
        .normalized()
    }
}

impl StoneSettings {
    /// Offset only with the free position, placed stones only when spreading.
    fn normalized(mut self) -> Self {
        self.offset = match self.position {
            StonePosition::Free => Some(self.offset.unwrap_or(0.0)),
            _ => None,
        };
        if self.setting_type != SettingType::FreeStoneSpreading {
            self.stones.clear();
        }
        self
    }
}

impl Default for StoneSettings {
    fn default() -> Self {
        Self {
            setting_type: SettingType::NoStone,
            stone_type: Some(StoneType::Diamond),
            stone_size: Some(StoneSize::Mm1_5),
            stone_quality: Some(StoneQuality::TwVs),
            number_of_stones: 1,
            spacing: StoneSpacing::Narrow,
            position: StonePosition::Center,
            offset: None,
            stones: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrooveSettings {
    #[serde(rename = "type")]
    pub groove_type: Option<GrooveType>,
    /// Millimeters.
    pub width: f64,
    /// Millimeters.
    pub depth: f64,
    pub surface: Surface,
    pub direction: GrooveDirection,
    /// Percent of the profile width, measured from the left edge.
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_waves: Option<u8>,
    /// Percent of the profile width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_height: Option<u8>,
}

impl Default for GrooveSettings {
    fn default() -> Self {
        Self {
            groove_type: None,
            width: 0.5,
            depth: 0.3,
            surface: Surface::Polished,
            direction: GrooveDirection::Vertical,
            position: 50.0,
            number_of_waves: None,
            wave_height: None,
        }
    }
}

impl GrooveSettings {
    /// Re-establish the wave fields for the current direction.
    fn normalized(mut self) -> Self {
        match self.direction {
            GrooveDirection::Wave => {
                self.number_of_waves.get_or_insert(DEFAULT_GROOVE_WAVES);
                self.wave_height.get_or_insert(DEFAULT_GROOVE_WAVE_HEIGHT);
            }
            GrooveDirection::Vertical => {
                self.number_of_waves = None;
                self.wave_height = None;
            }
        }
        self
    }
}

/// Depth and surface implied by an edge type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeMetrics {
    /// Millimeters.
    pub depth: f64,
    pub surface: Surface,
}

/// The single table of derived edge metrics. `None` for a plain edge.
pub fn derive_edge_metrics(edge_type: EdgeType) -> Option<EdgeMetrics> {
    let depth = match edge_type {
        EdgeType::Plain => return None,
        EdgeType::Step => 0.30,
        EdgeType::Carbon => 0.46,
        EdgeType::Milgrain => 0.10,
    };
    Some(EdgeMetrics {
        depth,
        surface: Surface::Polished,
    })
}

/// Edge treatment on one side of the ring.
///
/// `depth` and `surface` follow from the type and cannot be set directly;
/// they are re-derived when a stored value is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgeSettingsRepr")]
pub struct EdgeSettings {
    #[serde(rename = "type")]
    edge_type: EdgeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    surface: Option<Surface>,
}

#[derive(Deserialize)]
struct EdgeSettingsRepr {
    #[serde(rename = "type")]
    edge_type: EdgeType,
    #[serde(default)]
    width: Option<f64>,
}

impl From<EdgeSettingsRepr> for EdgeSettings {
    fn from(repr: EdgeSettingsRepr) -> Self {
        let mut edge = EdgeSettings::new(repr.edge_type);
        if edge.edge_type != EdgeType::Plain {
            if let Some(width) = repr.width {
                edge.width = Some(width);
            }
        }
        edge
    }
}

impl EdgeSettings {
    pub fn new(edge_type: EdgeType) -> Self {
        let metrics = derive_edge_metrics(edge_type);
        Self {
            edge_type,
            width: metrics.map(|_| DEFAULT_EDGE_WIDTH),
            depth: metrics.map(|m| m.depth),
            surface: metrics.map(|m| m.surface),
        }
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    pub fn depth(&self) -> Option<f64> {
        self.depth
    }

    pub fn surface(&self) -> Option<Surface> {
        self.surface
    }

    /// Change the type, keeping a custom width when staying non-plain.
    fn retyped(&self, edge_type: EdgeType) -> Self {
        let mut next = EdgeSettings::new(edge_type);
        if next.width.is_some() && self.width.is_some() {
            next.width = self.width;
        }
        next
    }
}

impl Default for EdgeSettings {
    fn default() -> Self {
        EdgeSettings::new(EdgeType::Plain)
    }
}

/// Which edge an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroovesAndEdges {
    /// Accepts a single groove object as well as a list.
    #[serde(rename = "groove", deserialize_with = "one_or_many_grooves")]
    pub grooves: Vec<GrooveSettings>,
    pub left_edge: EdgeSettings,
    pub right_edge: EdgeSettings,
}

impl Default for GroovesAndEdges {
    fn default() -> Self {
        Self {
            grooves: vec![GrooveSettings {
                groove_type: Some(GrooveType::Plain),
                ..GrooveSettings::default()
            }],
            left_edge: EdgeSettings::default(),
            right_edge: EdgeSettings::default(),
        }
    }
}

impl GroovesAndEdges {
    fn edge_mut(&mut self, side: EdgeSide) -> &mut EdgeSettings {
        match side {
            EdgeSide::Left => &mut self.left_edge,
            EdgeSide::Right => &mut self.right_edge,
        }
    }
}

fn one_or_many_grooves<'de, D>(deserializer: D) -> Result<Vec<GrooveSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<GrooveSettings>),
        One(GrooveSettings),
    }

    let grooves = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(groove) => vec![groove],
        OneOrMany::Many(grooves) => grooves,
    };
    if grooves.len() > MAX_GROOVES {
        return Err(D::Error::custom(format!(
            "at most {} grooves are allowed, found {}",
            MAX_GROOVES,
            grooves.len()
        )));
    }
    Ok(grooves.into_iter().map(GrooveSettings::normalized).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engraving {
    pub text: String,
    pub font_family: Font,
}

impl Default for Engraving {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: Font::Arial,
        }
    }
}

/// One edit to a configuration, as raised by a configurator step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ConfigUpdate {
    Weight(f64),
    Profile(Option<Profile>),
    ProfileWidth(f64),
    ProfileHeight(f64),
    RingSizeSystem(RingSizeSystem),
    RingSize(RingSize),
    ColorType(ColorType),
    Shape(ShapeCategory, ShapeVariant),
    ShapeWaveCount(u8),
    ShapeHeightPercentage(u8),
    Color(usize, ColorConfig),
    SettingType(SettingType),
    StoneType(Option<StoneType>),
    StoneSize(Option<StoneSize>),
    StoneQuality(Option<StoneQuality>),
    NumberOfStones(u8),
    StoneSpacing(StoneSpacing),
    StonePosition(StonePosition),
    StoneOffset(f64),
    AddFreeStone { x: f64, y: f64 },
    MoveFreeStone { id: StoneId, x: f64, y: f64 },
    RemoveFreeStone(StoneId),
    AddGroove,
    RemoveGroove(usize),
    Groove(usize, GrooveSettings),
    GrooveDirection(usize, GrooveDirection),
    EdgeType(EdgeSide, EdgeType),
    EdgeWidth(EdgeSide, f64),
    EngravingText(String),
    Font(Font),
    InsertSymbol(EngravingSymbol),
}

impl ConfigUpdate {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigUpdate::Weight(_) => "weight",
            ConfigUpdate::Profile(_) => "profile",
            ConfigUpdate::ProfileWidth(_) => "profile_width",
            ConfigUpdate::ProfileHeight(_) => "profile_height",
            ConfigUpdate::RingSizeSystem(_) => "ring_size_system",
            ConfigUpdate::RingSize(_) => "ring_size",
            ConfigUpdate::ColorType(_) => "color_type",
            ConfigUpdate::Shape(..) => "shape",
            ConfigUpdate::ShapeWaveCount(_) => "shape_wave_count",
            ConfigUpdate::ShapeHeightPercentage(_) => "shape_height_percentage",
            ConfigUpdate::Color(..) => "color",
            ConfigUpdate::SettingType(_) => "setting_type",
            ConfigUpdate::StoneType(_) => "stone_type",
            ConfigUpdate::StoneSize(_) => "stone_size",
            ConfigUpdate::StoneQuality(_) => "stone_quality",
            ConfigUpdate::NumberOfStones(_) => "number_of_stones",
            ConfigUpdate::StoneSpacing(_) => "stone_spacing",
            ConfigUpdate::StonePosition(_) => "stone_position",
            ConfigUpdate::StoneOffset(_) => "stone_offset",
            ConfigUpdate::AddFreeStone { .. } => "add_free_stone",
            ConfigUpdate::MoveFreeStone { .. } => "move_free_stone",
            ConfigUpdate::RemoveFreeStone(_) => "remove_free_stone",
            ConfigUpdate::AddGroove => "add_groove",
            ConfigUpdate::RemoveGroove(_) => "remove_groove",
            ConfigUpdate::Groove(..) => "groove",
            ConfigUpdate::GrooveDirection(..) => "groove_direction",
            ConfigUpdate::EdgeType(..) => "edge_type",
            ConfigUpdate::EdgeWidth(..) => "edge_width",
            ConfigUpdate::EngravingText(_) => "engraving_text",
            ConfigUpdate::Font(_) => "font",
            ConfigUpdate::InsertSymbol(_) => "insert_symbol",
        }
    }
}

impl ConfiguratorState {
    /// Apply one edit. `weight_range` bounds weight entry for the product
    /// being configured.
    pub fn apply(
        self,
        update: ConfigUpdate,
        weight_range: &WeightRange,
    ) -> Result<Self, CommerceError> {
        match update {
            ConfigUpdate::Weight(grams) => self.with_weight(grams, weight_range),
            ConfigUpdate::Profile(profile) => Ok(self.with_profile(profile)),
            ConfigUpdate::ProfileWidth(mm) => self.with_profile_width(mm),
            ConfigUpdate::ProfileHeight(mm) => self.with_profile_height(mm),
            ConfigUpdate::RingSizeSystem(system) => Ok(self.with_ring_size_system(system)),
            ConfigUpdate::RingSize(size) => self.with_ring_size(size),
            ConfigUpdate::ColorType(color_type) => Ok(self.with_color_type(color_type)),
            ConfigUpdate::Shape(category, variant) => self.with_shape(category, variant),
            ConfigUpdate::ShapeWaveCount(count) => self.with_shape_wave_count(count),
            ConfigUpdate::ShapeHeightPercentage(pct) => self.with_shape_height_percentage(pct),
            ConfigUpdate::Color(index, color) => self.with_color(index, color),
            ConfigUpdate::SettingType(setting) => Ok(self.with_setting_type(setting)),
            ConfigUpdate::StoneType(stone_type) => {
                let mut next = self;
                next.stone_settings.stone_type = stone_type;
                Ok(next)
            }
            ConfigUpdate::StoneSize(size) => {
                let mut next = self;
                next.stone_settings.stone_size = size;
                Ok(next)
            }
            ConfigUpdate::StoneQuality(quality) => {
                let mut next = self;
                next.stone_settings.stone_quality = quality;
                Ok(next)
            }
            ConfigUpdate::NumberOfStones(count) => self.with_number_of_stones(count),
            ConfigUpdate::StoneSpacing(spacing) => {
                let mut next = self;
                next.stone_settings.spacing = spacing;
                Ok(next)
            }
            ConfigUpdate::StonePosition(position) => Ok(self.with_stone_position(position)),
            ConfigUpdate::StoneOffset(mm) => self.with_stone_offset(mm),
            ConfigUpdate::AddFreeStone { x, y } => self.with_free_stone(x, y),
            ConfigUpdate::MoveFreeStone { id, x, y } => self.with_free_stone_moved(&id, x, y),
            ConfigUpdate::RemoveFreeStone(id) => self.without_free_stone(&id),
            ConfigUpdate::AddGroove => self.with_groove_added(),
            ConfigUpdate::RemoveGroove(index) => self.without_groove(index),
            ConfigUpdate::Groove(index, groove) => self.with_groove(index, groove),
            ConfigUpdate::GrooveDirection(index, direction) => {
                self.with_groove_direction(index, direction)
            }
            ConfigUpdate::EdgeType(side, edge_type) => Ok(self.with_edge_type(side, edge_type)),
            ConfigUpdate::EdgeWidth(side, mm) => self.with_edge_width(side, mm),
            ConfigUpdate::EngravingText(text) => Ok(self.with_engraving_text(text)),
            ConfigUpdate::Font(font) => {
                let mut next = self;
                next.engraving.font_family = font;
                Ok(next)
            }
            ConfigUpdate::InsertSymbol(symbol) => Ok(self.with_symbol(symbol)),
        }
    }

    /// Set the weight, clamped into the product's declared range.
    pub fn with_weight(mut self, grams: f64, range: &WeightRange) -> Result<Self, CommerceError> {
        if !grams.is_finite() {
            return Err(CommerceError::InvalidConfiguration(format!(
                "weight must be a number of grams, got {}",
                grams
            )));
        }
        self.weight = range.clamp(grams);
        Ok(self)
    }

    pub fn with_profile(mut self, profile: Option<Profile>) -> Self {
        self.selected_profile = profile;
        self
    }

    pub fn with_profile_width(mut self, mm: f64) -> Result<Self, CommerceError> {
        if !is_catalog_value(PROFILE_WIDTHS, mm) {
            return Err(unknown("profile width", mm));
        }
        self.dimensions.profile_width = Some(mm);
        Ok(self)
    }

    pub fn with_profile_height(mut self, mm: f64) -> Result<Self, CommerceError> {
        if !is_catalog_value(PROFILE_HEIGHTS, mm) {
            return Err(unknown("profile height", mm));
        }
        self.dimensions.profile_height = Some(mm);
        Ok(self)
    }

    /// Switch measuring system. The size resets to the system's first
    /// option unless it is already one of that system's sizes.
    pub fn with_ring_size_system(mut self, system: RingSizeSystem) -> Self {
        let dims = &mut self.dimensions;
        if dims.ring_size_system != system || dims.ring_size.is_none() {
            dims.ring_size = Some(default_ring_size(system));
        }
        dims.ring_size_system = system;
        self.dimensions = self.dimensions.normalized();
        self
    }

    pub fn with_ring_size(mut self, size: RingSize) -> Result<Self, CommerceError> {
        if !is_ring_size_of(self.dimensions.ring_size_system, &size) {
            return Err(unknown(
                self.dimensions.ring_size_system.display_name(),
                format!("ring size {}", size),
            ));
        }
        self.dimensions.ring_size = Some(size);
        Ok(self)
    }

    /// Set the color type, resizing the color zones to match and keeping
    /// the shape only where the new type offers it.
    pub fn with_color_type(mut self, color_type: ColorType) -> Self {
        self.precious_metal.color_type = Some(color_type);
        self.precious_metal = self.precious_metal.normalized();
        self
    }

    pub fn with_shape(
        mut self,
        category: ShapeCategory,
        variant: ShapeVariant,
    ) -> Result<Self, CommerceError> {
        let color_type = self
            .precious_metal
            .color_type
            .ok_or_else(|| invalid("choose a color type before a shape"))?;
        if !shape_options(color_type).contains(&(category, variant)) {
            return Err(unknown(
                "shape",
                format!("{}/{} for {}", category.as_str(), variant.as_str(), color_type.as_str()),
            ));
        }
        self.precious_metal.shape = Some(ShapeConfig::new(category, variant));
        Ok(self)
    }

    pub fn with_shape_wave_count(mut self, count: u8) -> Result<Self, CommerceError> {
        let shape = match self.precious_metal.shape.as_mut() {
            Some(shape) if shape.category == ShapeCategory::Sine => shape,
            _ => return Err(invalid("wave count applies to sine shapes only")),
        };
        if count == 0 {
            return Err(invalid("a sine shape needs at least one wave"));
        }
        shape.wave_count = Some(count);
        Ok(self)
    }

    pub fn with_shape_height_percentage(mut self, pct: u8) -> Result<Self, CommerceError> {
        let shape = match self.precious_metal.shape.as_mut() {
            Some(shape) if shape.category == ShapeCategory::Diagonal => shape,
            _ => return Err(invalid("height percentage applies to diagonal shapes only")),
        };
        if !(1..=100).contains(&pct) {
            return Err(invalid(format!(
                "height percentage must be within 1..=100, got {}",
                pct
            )));
        }
        shape.height_percentage = Some(pct);
        Ok(self)
    }

    pub fn with_color(mut self, index: usize, color: ColorConfig) -> Result<Self, CommerceError> {
        let zones = self.precious_metal.colors.len();
        let slot = self
            .precious_metal
            .colors
            .get_mut(index)
            .ok_or_else(|| invalid(format!("color zone {} of {} does not exist", index, zones)))?;
        *slot = color;
        Ok(self)
    }

    /// Change the setting style. Leaving Free Stone Spreading drops the
    /// individually placed stones.
    pub fn with_setting_type(mut self, setting_type: SettingType) -> Self {
        self.stone_settings.setting_type = setting_type;
        self.stone_settings = self.stone_settings.normalized();
        self
    }

    pub fn with_number_of_stones(mut self, count: u8) -> Result<Self, CommerceError> {
        if count == 0 {
            return Err(invalid("number of stones must be at least 1"));
        }
        self.stone_settings.number_of_stones = count;
        Ok(self)
    }

    /// Change the row position. `Free` starts at offset 0; any other
    /// position has no offset.
    pub fn with_stone_position(mut self, position: StonePosition) -> Self {
        self.stone_settings.position = position;
        self.stone_settings = self.stone_settings.normalized();
        self
    }

    pub fn with_stone_offset(mut self, mm: f64) -> Result<Self, CommerceError> {
        if self.stone_settings.position != StonePosition::Free {
            return Err(invalid("offset requires the free stone position"));
        }
        if !mm.is_finite() {
            return Err(invalid(format!("offset must be a number, got {}", mm)));
        }
        self.stone_settings.offset = Some(mm);
        Ok(self)
    }

    /// Place a stone at (`x`, `y`) using the current size and quality.
    pub fn with_free_stone(mut self, x: f64, y: f64) -> Result<Self, CommerceError> {
        self.require_free_spreading()?;
        check_coordinates(x, y)?;
        let stones = &mut self.stone_settings;
        stones.stones.push(FreeStone {
            id: StoneId::generate(),
            size: stones.stone_size.unwrap_or(StoneSize::Mm1_5),
            quality: stones.stone_quality.unwrap_or(StoneQuality::TwVs),
            x,
            y,
        });
        Ok(self)
    }

    pub fn with_free_stone_moved(
        mut self,
        id: &StoneId,
        x: f64,
        y: f64,
    ) -> Result<Self, CommerceError> {
        self.require_free_spreading()?;
        check_coordinates(x, y)?;
        let stone = self
            .stone_settings
            .stones
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| invalid(format!("no stone {}", id)))?;
        stone.x = x;
        stone.y = y;
        Ok(self)
    }

    pub fn without_free_stone(mut self, id: &StoneId) -> Result<Self, CommerceError> {
        let before = self.stone_settings.stones.len();
        self.stone_settings.stones.retain(|s| &s.id != id);
        if self.stone_settings.stones.len() == before {
            return Err(invalid(format!("no stone {}", id)));
        }
        Ok(self)
    }

    fn require_free_spreading(&self) -> Result<(), CommerceError> {
        if self.stone_settings.setting_type != SettingType::FreeStoneSpreading {
            return Err(invalid("individual stones need Free Stone Spreading"));
        }
        Ok(())
    }

    /// Append a groove with no type chosen yet.
    pub fn with_groove_added(mut self) -> Result<Self, CommerceError> {
        if self.grooves_and_edges.grooves.len() >= MAX_GROOVES {
            return Err(CommerceError::TooManyGrooves(MAX_GROOVES));
        }
        self.grooves_and_edges.grooves.push(GrooveSettings::default());
        Ok(self)
    }

    pub fn without_groove(mut self, index: usize) -> Result<Self, CommerceError> {
        self.groove_index(index)?;
        self.grooves_and_edges.grooves.remove(index);
        Ok(self)
    }

    /// Replace the groove at `index`; wave fields follow its direction.
    pub fn with_groove(
        mut self,
        index: usize,
        groove: GrooveSettings,
    ) -> Result<Self, CommerceError> {
        self.groove_index(index)?;
        self.grooves_and_edges.grooves[index] = groove.normalized();
        Ok(self)
    }

    pub fn with_groove_direction(
        mut self,
        index: usize,
        direction: GrooveDirection,
    ) -> Result<Self, CommerceError> {
        self.groove_index(index)?;
        let groove = &mut self.grooves_and_edges.grooves[index];
        groove.direction = direction;
        *groove = groove.clone().normalized();
        Ok(self)
    }

    fn groove_index(&self, index: usize) -> Result<(), CommerceError> {
        let count = self.grooves_and_edges.grooves.len();
        if index >= count {
            return Err(invalid(format!("groove {} of {} does not exist", index, count)));
        }
        Ok(())
    }

    /// Change an edge type; depth and surface are re-derived.
    pub fn with_edge_type(mut self, side: EdgeSide, edge_type: EdgeType) -> Self {
        let edge = self.grooves_and_edges.edge_mut(side);
        *edge = edge.retyped(edge_type);
        self
    }

    pub fn with_edge_width(mut self, side: EdgeSide, mm: f64) -> Result<Self, CommerceError> {
        let edge = self.grooves_and_edges.edge_mut(side);
        if edge.edge_type == EdgeType::Plain {
            return Err(invalid("a plain edge has no width"));
        }
        if !(mm.is_finite() && mm > 0.0) {
            return Err(invalid(format!("edge width must be positive, got {}", mm)));
        }
        edge.width = Some(mm);
        Ok(self)
    }

    pub fn with_engraving_text(mut self, text: impl Into<String>) -> Self {
        self.engraving.text = text.into();
        self
    }

    pub fn with_symbol(mut self, symbol: EngravingSymbol) -> Self {
        self.engraving.text.push(symbol.glyph());
        self
    }

    /// Ordered (label, value) description of the build.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let mut lines = Vec::new();
        let dims = &self.dimensions;
        lines.push(("Weight", format!("{:.1} g", self.weight)));
        lines.push((
            "Profile",
            self.selected_profile
                .map(|p| p.display_name().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
        lines.push((
            "Dimensions",
            format!(
                "{} x {} mm, size {} ({})",
                opt_mm(dims.profile_width),
                opt_mm(dims.profile_height),
                dims.ring_size
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                dims.ring_size_system
            ),
        ));

        let metal = &self.precious_metal;
        let colors = metal
            .colors
            .iter()
            .map(|c| format!("{} {} {}", c.color, c.fineness.as_str(), c.polish))
            .collect::<Vec<_>>()
            .join(" / ");
        let shape = metal
            .shape
            .map(|s| format!(", {} {}", s.category, s.variant))
            .unwrap_or_default();
        lines.push(("Metal", format!("{}{}", colors, shape)));

        let stones = &self.stone_settings;
        let stone_line = match stones.setting_type {
            SettingType::NoStone => SettingType::NoStone.display_name().to_string(),
            SettingType::FreeStoneSpreading => {
                format!("{}, {} stones", stones.setting_type, stones.stones.len())
            }
            setting => format!(
                "{}, {} x {} {} {}",
                setting,
                stones.number_of_stones,
                stones.stone_type.map(|t| t.display_name()).unwrap_or("-"),
                stones.stone_size.map(|s| s.display_name()).unwrap_or("-"),
                stones.stone_quality.map(|q| q.display_name()).unwrap_or("-"),
            ),
        };
        lines.push(("Stones", stone_line));

        let ge = &self.grooves_and_edges;
        let grooves = ge
            .grooves
            .iter()
            .map(|g| g.groove_type.map(|t| t.display_name()).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push((
            "Grooves & edges",
            format!(
                "[{}], left {}, right {}",
                grooves,
                ge.left_edge.edge_type(),
                ge.right_edge.edge_type()
            ),
        ));

        if !self.engraving.text.is_empty() {
            lines.push((
                "Engraving",
                format!("\"{}\" in {}", self.engraving.text, self.engraving.font_family),
            ));
        }
        lines
    }
}

fn opt_mm(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

fn check_coordinates(x: f64, y: f64) -> Result<(), CommerceError> {
    let range = 0.0..=100.0;
    if range.contains(&x) && range.contains(&y) {
        Ok(())
    } else {
        Err(invalid(format!("stone position ({}, {}) is off the ring", x, y)))
    }
}

fn unknown(axis: &'static str, value: impl ToString) -> CommerceError {
    CommerceError::UnknownOption {
        axis,
        value: value.to_string(),
    }
}

fn invalid(reason: impl Into<String>) -> CommerceError {
    CommerceError::InvalidConfiguration(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::options::ring_sizes;

    fn any_weight() -> WeightRange {
        WeightRange::unbounded()
    }

    #[test]
    fn test_defaults() {
        let state = ConfiguratorState::default();
        assert_eq!(state.selected_profile, None);
        assert_eq!(state.weight, 0.0);
        assert_eq!(state.precious_metal.color_type, Some(ColorType::Single));
        assert_eq!(state.precious_metal.colors.len(), 1);
        assert_eq!(state.stone_settings.setting_type, SettingType::NoStone);
    }

    #[test]
    fn test_color_count_follows_color_type() {
        let sequence = [
            ColorType::Three,
            ColorType::Single,
            ColorType::Two,
            ColorType::Three,
            ColorType::Two,
            ColorType::Single,
        ];
        let mut state = ConfiguratorState::default();
        for color_type in sequence {
            state = state.with_color_type(color_type);
            assert_eq!(state.precious_metal.colors.len(), color_type.color_count());
            assert_eq!(
                state.precious_metal.shape.is_some(),
                color_type != ColorType::Single
            );
        }
    }

    #[test]
    fn test_color_type_keeps_existing_zones() {
        let white = ColorConfig {
            color: MetalColor::White,
            polish: Surface::Matte,
            fineness: Fineness::K18,
        };
        let state = ConfiguratorState::default()
            .with_color(0, white)
            .unwrap()
            .with_color_type(ColorType::Two);
        assert_eq!(state.precious_metal.colors[0], white);
        assert_eq!(state.precious_metal.colors[1], ColorConfig::for_zone(1));
    }

    #[test]
    fn test_ring_size_system_resets_size() {
        let mut state = ConfiguratorState::default()
            .with_ring_size(RingSize::Number(60.0))
            .unwrap();
        for system in [RingSizeSystem::Uk, RingSizeSystem::Usa, RingSizeSystem::Universal] {
            state = state.with_ring_size_system(system);
            let size = state.dimensions.ring_size.clone().unwrap();
            assert!(ring_sizes(system).contains(&size));
            assert_eq!(size, ring_sizes(system)[0]);
        }
    }

    #[test]
    fn test_reselecting_same_system_keeps_size() {
        let state = ConfiguratorState::default()
            .with_ring_size(RingSize::Number(58.0))
            .unwrap()
            .with_ring_size_system(RingSizeSystem::Universal);
        assert_eq!(state.dimensions.ring_size, Some(RingSize::Number(58.0)));
    }

    #[test]
    fn test_ring_size_must_belong_to_system() {
        let result = ConfiguratorState::default().with_ring_size(RingSize::Label("K".into()));
        assert!(matches!(result, Err(CommerceError::UnknownOption { .. })));
    }

    #[test]
    fn test_dimension_choices_are_closed() {
        assert!(ConfiguratorState::default().with_profile_width(3.25).is_err());
        let state = ConfiguratorState::default()
            .with_profile_width(4.5)
            .unwrap()
            .with_profile_height(1.6)
            .unwrap();
        assert_eq!(state.dimensions.profile_width, Some(4.5));
        assert_eq!(state.dimensions.profile_height, Some(1.6));
    }

    #[test]
    fn test_weight_is_clamped_to_product_range() {
        let range = WeightRange::new(3.0, 6.0).unwrap();
        let state = ConfiguratorState::default().with_weight(9.0, &range).unwrap();
        assert_eq!(state.weight, 6.0);
        let state = state.with_weight(1.0, &range).unwrap();
        assert_eq!(state.weight, 3.0);
        assert!(state.with_weight(f64::NAN, &range).is_err());
    }

    #[test]
    fn test_edge_type_derives_metrics() {
        let mut state = ConfiguratorState::default();
        state.grooves_and_edges.left_edge.depth = Some(9.9);
        state.grooves_and_edges.left_edge.surface = Some(Surface::Hammered);

        let state = state.with_edge_type(EdgeSide::Left, EdgeType::Step);
        let left = &state.grooves_and_edges.left_edge;
        assert_eq!(left.depth(), Some(0.30));
        assert_eq!(left.surface(), Some(Surface::Polished));

        let state = state.with_edge_type(EdgeSide::Left, EdgeType::Carbon);
        assert_eq!(state.grooves_and_edges.left_edge.depth(), Some(0.46));

        let state = state.with_edge_type(EdgeSide::Left, EdgeType::Plain);
        let left = &state.grooves_and_edges.left_edge;
        assert_eq!(left.depth(), None);
        assert_eq!(left.surface(), None);
        assert_eq!(left.width(), None);
    }

    #[test]
    fn test_edge_metrics_rederived_on_load() {
        let json = r#"{"type":"milgrain","width":0.8,"depth":2.0,"surface":"matte"}"#;
        let edge: EdgeSettings = serde_json::from_str(json).unwrap();
        assert_eq!(edge.depth(), Some(0.10));
        assert_eq!(edge.surface(), Some(Surface::Polished));
        assert_eq!(edge.width(), Some(0.8));
    }

    #[test]
    fn test_edge_width_keeps_across_retype() {
        let state = ConfiguratorState::default()
            .with_edge_type(EdgeSide::Right, EdgeType::Step)
            .with_edge_width(EdgeSide::Right, 0.7)
            .unwrap()
            .with_edge_type(EdgeSide::Right, EdgeType::Milgrain);
        assert_eq!(state.grooves_and_edges.right_edge.width(), Some(0.7));
        assert!(ConfiguratorState::default()
            .with_edge_width(EdgeSide::Left, 0.7)
            .is_err());
    }

    #[test]
    fn test_groove_wave_defaults_and_clearing() {
        let state = ConfiguratorState::default()
            .with_groove_direction(0, GrooveDirection::Wave)
            .unwrap();
        let groove = &state.grooves_and_edges.grooves[0];
        assert_eq!(groove.number_of_waves, Some(DEFAULT_GROOVE_WAVES));
        assert_eq!(groove.wave_height, Some(DEFAULT_GROOVE_WAVE_HEIGHT));

        let state = state.with_groove_direction(0, GrooveDirection::Vertical).unwrap();
        let groove = &state.grooves_and_edges.grooves[0];
        assert_eq!(groove.number_of_waves, None);
        assert_eq!(groove.wave_height, None);
    }

    #[test]
    fn test_groove_replacement_is_normalized() {
        let groove = GrooveSettings {
            groove_type: Some(GrooveType::V),
            direction: GrooveDirection::Vertical,
            number_of_waves: Some(4),
            wave_height: Some(20),
            ..GrooveSettings::default()
        };
        let state = ConfiguratorState::default().with_groove(0, groove).unwrap();
        assert_eq!(state.grooves_and_edges.grooves[0].number_of_waves, None);
    }

    #[test]
    fn test_at_most_five_grooves() {
        let mut state = ConfiguratorState::default();
        while state.grooves_and_edges.grooves.len() < MAX_GROOVES {
            state = state.with_groove_added().unwrap();
        }
        assert!(matches!(
            state.clone().with_groove_added(),
            Err(CommerceError::TooManyGrooves(5))
        ));
        let state = state.without_groove(4).unwrap();
        assert_eq!(state.grooves_and_edges.grooves.len(), 4);
        assert!(state.without_groove(9).is_err());
    }

    #[test]
    fn test_single_groove_payload_becomes_list() {
        let json = r#"{
            "groove": {"type": "u", "direction": "wave"},
            "leftEdge": {"type": "none"},
            "rightEdge": {"type": "step"}
        }"#;
        let ge: GroovesAndEdges = serde_json::from_str(json).unwrap();
        assert_eq!(ge.grooves.len(), 1);
        assert_eq!(ge.grooves[0].groove_type, Some(GrooveType::U));
        assert_eq!(ge.grooves[0].number_of_waves, Some(DEFAULT_GROOVE_WAVES));
        assert_eq!(ge.right_edge.depth(), Some(0.30));
    }

    #[test]
    fn test_too_many_grooves_rejected_on_load() {
        let grooves = vec![serde_json::json!({"type": "v"}); 6];
        let json = serde_json::json!({
            "groove": grooves,
            "leftEdge": {"type": "none"},
            "rightEdge": {"type": "none"}
        });
        assert!(serde_json::from_value::<GroovesAndEdges>(json).is_err());
    }

    #[test]
    fn test_stored_metal_is_repaired_on_load() {
        let json = serde_json::json!({
            "colorType": "three",
            "shape": {"category": "sine", "variant": "halves", "heightPercentage": 40},
            "colors": [{"color": "rose", "polish": "matte", "fineness": "750"}]
        });
        let metal: PreciousMetal = serde_json::from_value(json).unwrap();
        assert_eq!(metal.colors.len(), 3);
        assert_eq!(metal.colors[0].color, MetalColor::Rose);
        assert_eq!(metal.colors[1], ColorConfig::for_zone(1));
        // sine/halves is a two-color shape
        assert_eq!(
            metal.shape,
            Some(ShapeConfig::new(ShapeCategory::Straight, ShapeVariant::Bands))
        );

        let json = serde_json::json!({
            "colorType": "two",
            "shape": {"category": "sine", "variant": "halves", "heightPercentage": 40},
            "colors": [
                {"color": "rose", "polish": "matte", "fineness": "750"},
                {"color": "white", "polish": "matte", "fineness": "750"},
                {"color": "red", "polish": "matte", "fineness": "750"}
            ]
        });
        let metal: PreciousMetal = serde_json::from_value(json).unwrap();
        assert_eq!(metal.colors.len(), 2);
        let shape = metal.shape.unwrap();
        assert_eq!(shape.wave_count, Some(DEFAULT_SHAPE_WAVE_COUNT));
        assert_eq!(shape.height_percentage, None);

        let json = serde_json::json!({
            "colorType": "single",
            "shape": {"category": "straight", "variant": "halves"},
            "colors": [{"color": "yellow", "polish": "polished", "fineness": "585"}]
        });
        let metal: PreciousMetal = serde_json::from_value(json).unwrap();
        assert_eq!(metal.shape, None);
    }

    #[test]
    fn test_stored_ring_size_outside_system_is_reset() {
        let json = serde_json::json!({
            "profileWidth": 3.0,
            "profileHeight": 1.4,
            "ringSize": "K",
            "ringSizeSystem": "universal"
        });
        let dims: Dimensions = serde_json::from_value(json).unwrap();
        assert_eq!(dims.ring_size, Some(RingSize::Number(44.0)));
        assert_eq!(dims.profile_width, Some(3.0));

        let json = serde_json::json!({
            "profileWidth": null,
            "profileHeight": null,
            "ringSize": "K",
            "ringSizeSystem": "uk"
        });
        let dims: Dimensions = serde_json::from_value(json).unwrap();
        assert_eq!(dims.ring_size, Some(RingSize::Label("K".into())));
    }

    #[test]
    fn test_stored_stone_extras_are_dropped_on_load() {
        let json = serde_json::json!({
            "settingType": "channel",
            "stoneType": "diamond",
            "stoneSize": "1.5",
            "stoneQuality": "tw-vs",
            "numberOfStones": 3,
            "spacing": "narrow",
            "position": "center",
            "offset": 2.5,
            "stones": [{"id": "stone_1", "size": "1.5", "quality": "tw-vs", "x": 10.0, "y": 50.0}]
        });
        let stones: StoneSettings = serde_json::from_value(json).unwrap();
        assert_eq!(stones.offset, None);
        assert!(stones.stones.is_empty());

        let json = serde_json::json!({
            "settingType": "free-stone-spreading",
            "stoneType": "diamond",
            "stoneSize": "1.5",
            "stoneQuality": "tw-vs",
            "numberOfStones": 1,
            "spacing": "narrow",
            "position": "free",
            "stones": [{"id": "stone_1", "size": "1.5", "quality": "tw-vs", "x": 10.0, "y": 50.0}]
        });
        let stones: StoneSettings = serde_json::from_value(json).unwrap();
        assert_eq!(stones.offset, Some(0.0));
        assert_eq!(stones.stones.len(), 1);
    }

    #[test]
    fn test_free_position_offset() {
        let state = ConfiguratorState::default().with_stone_position(StonePosition::Free);
        assert_eq!(state.stone_settings.offset, Some(0.0));
        let state = state.with_stone_offset(1.25).unwrap();
        assert_eq!(state.stone_settings.offset, Some(1.25));

        let state = state.with_stone_position(StonePosition::Left);
        assert_eq!(state.stone_settings.offset, None);
        assert!(state.with_stone_offset(1.0).is_err());
    }

    #[test]
    fn test_free_stone_spreading() {
        assert!(ConfiguratorState::default().with_free_stone(10.0, 10.0).is_err());

        let state = ConfiguratorState::default()
            .with_setting_type(SettingType::FreeStoneSpreading)
            .with_free_stone(10.0, 20.0)
            .unwrap()
            .with_free_stone(30.0, 40.0)
            .unwrap();
        assert_eq!(state.stone_settings.stones.len(), 2);

        let id = state.stone_settings.stones[0].id.clone();
        let state = state.with_free_stone_moved(&id, 15.0, 25.0).unwrap();
        assert_eq!(state.stone_settings.stones[0].x, 15.0);
        assert!(state.clone().with_free_stone(120.0, 0.0).is_err());

        let state = state.without_free_stone(&id).unwrap();
        assert_eq!(state.stone_settings.stones.len(), 1);

        let state = state.with_setting_type(SettingType::Channel);
        assert!(state.stone_settings.stones.is_empty());
    }

    #[test]
    fn test_shape_rules() {
        assert!(ConfiguratorState::default()
            .with_shape(ShapeCategory::Sine, ShapeVariant::Halves)
            .is_err());

        let state = ConfiguratorState::default()
            .with_color_type(ColorType::Two)
            .with_shape(ShapeCategory::Sine, ShapeVariant::Halves)
            .unwrap();
        let shape = state.precious_metal.shape.unwrap();
        assert_eq!(shape.wave_count, Some(DEFAULT_SHAPE_WAVE_COUNT));
        assert_eq!(shape.height_percentage, None);

        let state = state.with_shape_wave_count(5).unwrap();
        assert_eq!(state.precious_metal.shape.unwrap().wave_count, Some(5));
        assert!(state.clone().with_shape_height_percentage(40).is_err());

        let state = state
            .with_shape(ShapeCategory::Diagonal, ShapeVariant::Halves)
            .unwrap()
            .with_shape_height_percentage(40)
            .unwrap();
        let shape = state.precious_metal.shape.unwrap();
        assert_eq!(shape.wave_count, None);
        assert_eq!(shape.height_percentage, Some(40));
    }

    #[test]
    fn test_color_type_drops_unavailable_shape() {
        let state = ConfiguratorState::default()
            .with_color_type(ColorType::Two)
            .with_shape(ShapeCategory::Sine, ShapeVariant::Halves)
            .unwrap()
            .with_color_type(ColorType::Three);
        let shape = state.precious_metal.shape.unwrap();
        assert_eq!(
            (shape.category, shape.variant),
            (ShapeCategory::Straight, ShapeVariant::Bands)
        );
    }

    #[test]
    fn test_symbols_append_glyphs() {
        let state = ConfiguratorState::default()
            .with_engraving_text("A & B ")
            .with_symbol(EngravingSymbol::Heart);
        assert_eq!(state.engraving.text, "A & B \u{2665}");
    }

    #[test]
    fn test_apply_dispatches_updates() {
        let state = ConfiguratorState::default()
            .apply(ConfigUpdate::Profile(Some(Profile::Comfort)), &any_weight())
            .unwrap()
            .apply(ConfigUpdate::ColorType(ColorType::Three), &any_weight())
            .unwrap()
            .apply(ConfigUpdate::Font(Font::Arial), &any_weight())
            .unwrap();
        assert_eq!(state.selected_profile, Some(Profile::Comfort));
        assert_eq!(state.precious_metal.colors.len(), 3);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(ConfiguratorState::default()).unwrap();
        assert!(json.get("selectedProfile").is_some());
        assert_eq!(json["dimensions"]["ringSizeSystem"], "universal");
        assert_eq!(json["preciousMetal"]["colorType"], "single");
        assert!(json["groovesAndEdges"]["groove"].is_array());

        let back: ConfiguratorState = serde_json::from_value(json).unwrap();
        assert_eq!(back, ConfiguratorState::default());
    }

    #[test]
    fn test_summary_mentions_each_axis() {
        let labels: Vec<_> = ConfiguratorState::default()
            .summary()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(
            labels,
            vec!["Weight", "Profile", "Dimensions", "Metal", "Stones", "Grooves & edges"]
        );
    }
}
