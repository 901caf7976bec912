//! Configurator step sequence and forward-navigation gating.

use crate::configurator::options::SettingType;
use crate::configurator::state::ConfiguratorState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Steps of the ring configurator, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfiguratorStep {
    Weight,
    Profile,
    Dimensions,
    PreciousMetal,
    Stones,
    GroovesAndEdges,
    Engraving,
}

impl ConfiguratorStep {
    /// All steps in visiting order.
    pub const ALL: [ConfiguratorStep; 7] = [
        ConfiguratorStep::Weight,
        ConfiguratorStep::Profile,
        ConfiguratorStep::Dimensions,
        ConfiguratorStep::PreciousMetal,
        ConfiguratorStep::Stones,
        ConfiguratorStep::GroovesAndEdges,
        ConfiguratorStep::Engraving,
    ];

    pub const FIRST: ConfiguratorStep = ConfiguratorStep::Weight;
    pub const LAST: ConfiguratorStep = ConfiguratorStep::Engraving;

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfiguratorStep::Weight => "weight",
            ConfiguratorStep::Profile => "profile",
            ConfiguratorStep::Dimensions => "dimensions",
            ConfiguratorStep::PreciousMetal => "preciousMetal",
            ConfiguratorStep::Stones => "stones",
            ConfiguratorStep::GroovesAndEdges => "groovesAndEdges",
            ConfiguratorStep::Engraving => "engraving",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConfiguratorStep::Weight => "Weight",
            ConfiguratorStep::Profile => "Profile",
            ConfiguratorStep::Dimensions => "Dimensions",
            ConfiguratorStep::PreciousMetal => "Precious metal",
            ConfiguratorStep::Stones => "Stones",
            ConfiguratorStep::GroovesAndEdges => "Grooves & edges",
            ConfiguratorStep::Engraving => "Engraving",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            ConfiguratorStep::Weight => 1,
            ConfiguratorStep::Profile => 2,
            ConfiguratorStep::Dimensions => 3,
            ConfiguratorStep::PreciousMetal => 4,
            ConfiguratorStep::Stones => 5,
            ConfiguratorStep::GroovesAndEdges => 6,
            ConfiguratorStep::Engraving => 7,
        }
    }

    /// Step for a 1-indexed number.
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// Following step; `None` on the last one.
    pub fn following(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// Preceding step; `None` on the first one.
    pub fn preceding(&self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    /// The requirement this step enforces, if any.
    pub fn requirement(&self) -> Option<ValidationReason> {
        match self {
            ConfiguratorStep::Profile => Some(ValidationReason::SelectProfile),
            ConfiguratorStep::Dimensions => Some(ValidationReason::EnterDimensions),
            ConfiguratorStep::PreciousMetal => Some(ValidationReason::SelectMetal),
            ConfiguratorStep::Stones => Some(ValidationReason::SelectStoneSettings),
            ConfiguratorStep::GroovesAndEdges => Some(ValidationReason::CompleteGroovesAndEdges),
            ConfiguratorStep::Weight | ConfiguratorStep::Engraving => None,
        }
    }
}

/// What the shopper still has to do on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationReason {
    SelectProfile,
    EnterDimensions,
    SelectMetal,
    SelectStoneSettings,
    CompleteGroovesAndEdges,
}

impl ValidationReason {
    /// Message key handed to the notification layer.
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationReason::SelectProfile => "selectProfile",
            ValidationReason::EnterDimensions => "enterDimensions",
            ValidationReason::SelectMetal => "selectMetal",
            ValidationReason::SelectStoneSettings => "selectStoneSettings",
            ValidationReason::CompleteGroovesAndEdges => "completeGroovesAndEdges",
        }
    }

    /// Default English text.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationReason::SelectProfile => "Please select a profile",
            ValidationReason::EnterDimensions => "Please enter width, height and ring size",
            ValidationReason::SelectMetal => "Please select a metal color type",
            ValidationReason::SelectStoneSettings => "Please choose stone type, size and quality",
            ValidationReason::CompleteGroovesAndEdges => "Please choose a type for every groove",
        }
    }
}

/// A step that is not complete enough to move on from.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{} step incomplete: {}", .step.display_name(), .reason.message())]
pub struct StepValidationError {
    pub step: ConfiguratorStep,
    pub reason: ValidationReason,
}

/// Quick gate used to enable the "Next" control.
pub fn can_proceed(step: ConfiguratorStep, state: &ConfiguratorState) -> bool {
    match step {
        ConfiguratorStep::Weight => true,
        ConfiguratorStep::Profile => state.selected_profile.is_some(),
        ConfiguratorStep::Dimensions => dimensions_complete(state),
        ConfiguratorStep::PreciousMetal => !state.precious_metal.colors.is_empty(),
        ConfiguratorStep::Stones
        | ConfiguratorStep::GroovesAndEdges
        | ConfiguratorStep::Engraving => true,
    }
}

/// User-facing check run when "Next" is pressed.
pub fn validate_step(
    step: ConfiguratorStep,
    state: &ConfiguratorState,
) -> Result<(), StepValidationError> {
    let complete = match step {
        ConfiguratorStep::Weight | ConfiguratorStep::Engraving => true,
        ConfiguratorStep::Profile => state.selected_profile.is_some(),
        ConfiguratorStep::Dimensions => dimensions_complete(state),
        ConfiguratorStep::PreciousMetal => state.precious_metal.color_type.is_some(),
        ConfiguratorStep::Stones => {
            let stones = &state.stone_settings;
            stones.setting_type == SettingType::NoStone
                || (stones.stone_type.is_some()
                    && stones.stone_size.is_some()
                    && stones.stone_quality.is_some())
        }
        ConfiguratorStep::GroovesAndEdges => state
            .grooves_and_edges
            .grooves
            .iter()
            .all(|g| g.groove_type.is_some()),
    };
    match (complete, step.requirement()) {
        (false, Some(reason)) => Err(StepValidationError { step, reason }),
        _ => Ok(()),
    }
}

fn dimensions_complete(state: &ConfiguratorState) -> bool {
    let dims = &state.dimensions;
    dims.profile_width.is_some() && dims.profile_height.is_some() && dims.ring_size.is_some()
}

/// Outcome of pressing "Next".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTransition {
    /// Moved forward to this step.
    Advanced(ConfiguratorStep),
    /// Already on the last step; the build is complete.
    Completed,
    /// The current step is incomplete; the cursor did not move.
    Blocked(StepValidationError),
}

/// Which step the configurator is showing.
///
/// Any step can be opened directly; only `next` is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCursor {
    current: ConfiguratorStep,
}

impl Default for StepCursor {
    fn default() -> Self {
        Self {
            current: ConfiguratorStep::FIRST,
        }
    }
}

impl StepCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ConfiguratorStep {
        self.current
    }

    /// Advance if the current step passes both the gate and validation.
    pub fn next(&mut self, state: &ConfiguratorState) -> StepTransition {
        let step = self.current;
        if let Err(err) = validate_step(step, state) {
            return StepTransition::Blocked(err);
        }
        if !can_proceed(step, state) {
            if let Some(reason) = step.requirement() {
                return StepTransition::Blocked(StepValidationError { step, reason });
            }
        }
        match step.following() {
            Some(next) => {
                self.current = next;
                StepTransition::Advanced(next)
            }
            None => StepTransition::Completed,
        }
    }

    /// Go back one step, staying on the first.
    pub fn prev(&mut self) -> ConfiguratorStep {
        if let Some(prev) = self.current.preceding() {
            self.current = prev;
        }
        self.current
    }

    /// Open a step directly.
    pub fn go_to(&mut self, step: ConfiguratorStep) {
        self.current = step;
    }

    /// Back to the first step.
    pub fn reset(&mut self) {
        self.current = ConfiguratorStep::FIRST;
    }

    /// Get progress percentage.
    pub fn progress_percent(&self) -> u8 {
        ((self.current.number() as f64 / ConfiguratorStep::ALL.len() as f64) * 100.0) as u8
    }
}
