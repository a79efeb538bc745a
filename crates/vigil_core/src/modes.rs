//! # Mode Controller
//!
//! The two process-wide settings that parameterize the physics:
//!
//! - [`SystemMode`] selects the distance metric (planar vs. geographic)
//! - [`ControlMode`] selects the reaction-time multiplier
//!
//! Both live in atomics, so a reader always sees either the previous or
//! the newly stored value. Unrecognized values are a silent no-op.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Distance metric selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum SystemMode {
    /// Euclidean distance over `x`/`y`.
    #[default]
    Indoor = 0,
    /// Scaled Euclidean distance over `lat`/`lng`.
    Outdoor = 1,
}

impl SystemMode {
    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indoor => "INDOOR",
            Self::Outdoor => "OUTDOOR",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Outdoor,
            _ => Self::Indoor,
        }
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemMode {
    type Err = ();

    /// Case-insensitive; the input is upper-cased before matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INDOOR" => Ok(Self::Indoor),
            "OUTDOOR" => Ok(Self::Outdoor),
            _ => Err(()),
        }
    }
}

/// Who (or what) is driving, modeled as a reaction-time multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum ControlMode {
    /// Unassisted human driver.
    #[default]
    Human = 0,
    /// Driver assistance systems.
    Adas = 1,
    /// Fully autonomous control.
    Autonomous = 2,
}

impl ControlMode {
    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "HUMAN",
            Self::Adas => "ADAS",
            Self::Autonomous => "AUTONOMOUS",
        }
    }

    /// Factor applied to the base reaction time.
    #[must_use]
    pub const fn reaction_multiplier(self) -> f64 {
        match self {
            Self::Human => 1.0,
            Self::Adas => 0.6,
            Self::Autonomous => 0.3,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Adas,
            2 => Self::Autonomous,
            _ => Self::Human,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlMode {
    type Err = ();

    /// Case-insensitive; the input is upper-cased before matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HUMAN" => Ok(Self::Human),
            "ADAS" => Ok(Self::Adas),
            "AUTONOMOUS" => Ok(Self::Autonomous),
            _ => Err(()),
        }
    }
}

/// Holder of the global mode settings.
///
/// Setters are last-writer-wins. There is no cross-field atomicity: a
/// reader may observe a new system mode with an old control mode.
#[derive(Debug)]
pub struct ModeController {
    system_mode: AtomicU8,
    control_mode: AtomicU8,
}

impl ModeController {
    /// Creates a controller with the given initial settings.
    #[must_use]
    pub const fn new(system_mode: SystemMode, control_mode: ControlMode) -> Self {
        Self {
            system_mode: AtomicU8::new(system_mode as u8),
            control_mode: AtomicU8::new(control_mode as u8),
        }
    }

    /// Parses and applies a system mode.
    ///
    /// Returns `false` and leaves the setting untouched on unknown input.
    pub fn set_system_mode(&self, value: &str) -> bool {
        match value.parse::<SystemMode>() {
            Ok(mode) => {
                self.store_system_mode(mode);
                true
            }
            Err(()) => {
                tracing::debug!(value, "ignoring unrecognized system mode");
                false
            }
        }
    }

    /// Parses and applies a control mode.
    ///
    /// Returns `false` and leaves the setting untouched on unknown input.
    pub fn set_control_mode(&self, value: &str) -> bool {
        match value.parse::<ControlMode>() {
            Ok(mode) => {
                self.store_control_mode(mode);
                true
            }
            Err(()) => {
                tracing::debug!(value, "ignoring unrecognized control mode");
                false
            }
        }
    }

    /// Stores an already-typed system mode.
    #[inline]
    pub fn store_system_mode(&self, mode: SystemMode) {
        self.system_mode.store(mode as u8, Ordering::Release);
    }

    /// Stores an already-typed control mode.
    #[inline]
    pub fn store_control_mode(&self, mode: ControlMode) {
        self.control_mode.store(mode as u8, Ordering::Release);
    }

    /// Returns the active system mode.
    #[inline]
    #[must_use]
    pub fn current_system_mode(&self) -> SystemMode {
        SystemMode::from_u8(self.system_mode.load(Ordering::Acquire))
    }

    /// Returns the active control mode.
    #[inline]
    #[must_use]
    pub fn current_control_mode(&self) -> ControlMode {
        ControlMode::from_u8(self.control_mode.load(Ordering::Acquire))
    }

    /// Reaction-time multiplier of the active control mode.
    #[inline]
    #[must_use]
    pub fn reaction_time_multiplier(&self) -> f64 {
        self.current_control_mode().reaction_multiplier()
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(SystemMode::default(), ControlMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let modes = ModeController::default();
        assert_eq!(modes.current_system_mode(), SystemMode::Indoor);
        assert_eq!(modes.current_control_mode(), ControlMode::Human);
        assert!((modes.reaction_time_multiplier() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_case_insensitive_setters() {
        let modes = ModeController::default();

        assert!(modes.set_system_mode("outdoor"));
        assert_eq!(modes.current_system_mode(), SystemMode::Outdoor);

        assert!(modes.set_control_mode("Adas"));
        assert_eq!(modes.current_control_mode(), ControlMode::Adas);
        assert!((modes.reaction_time_multiplier() - 0.6).abs() < f64::EPSILON);

        assert!(modes.set_control_mode("AUTONOMOUS"));
        assert!((modes.reaction_time_multiplier() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unrecognized_value_is_noop() {
        let modes = ModeController::new(SystemMode::Outdoor, ControlMode::Adas);

        assert!(!modes.set_system_mode("underwater"));
        assert!(!modes.set_control_mode("remote"));
        assert!(!modes.set_control_mode(""));
        assert!(!modes.set_control_mode(" adas "));
        assert!(!modes.set_system_mode("INDOOR\n"));

        assert_eq!(modes.current_system_mode(), SystemMode::Outdoor);
        assert_eq!(modes.current_control_mode(), ControlMode::Adas);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ControlMode::Autonomous).unwrap();
        assert_eq!(json, "\"AUTONOMOUS\"");

        let mode: SystemMode = serde_json::from_str("\"OUTDOOR\"").unwrap();
        assert_eq!(mode, SystemMode::Outdoor);
    }
}
