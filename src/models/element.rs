//! Element identifiers and geometry used by the observers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{ValidationError, ValidationErrorKind};

/// Stable identifier of an observed element
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vertical extent of an element relative to the top of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Fraction of the element inside `[0, root_bottom]`
    ///
    /// Zero-height elements count as fully visible when their top edge lies
    /// inside the root.
    pub fn visible_ratio(&self, root_bottom: f64) -> f64 {
        if self.height <= 0.0 {
            return if self.top >= 0.0 && self.top <= root_bottom { 1.0 } else { 0.0 };
        }
        let visible = self.bottom().min(root_bottom) - self.top.max(0.0);
        (visible / self.height).clamp(0.0, 1.0)
    }
}

/// One intersection observation delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub bounds: Bounds,
    pub viewport_height: f64,
}

/// Presentation state of a fade-in target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeState {
    /// Never prepared; rendered as authored
    #[default]
    Untouched,
    /// Zero opacity and shifted down
    Hidden,
    /// Full opacity at natural position
    Visible,
}

/// Fill percentage of a skill bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillLevel(u8);

impl SkillLevel {
    pub const EMPTY: SkillLevel = SkillLevel(0);

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl FromStr for SkillLevel {
    type Err = ValidationError;

    /// Parses progress attributes such as `85%` or `85`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('%').trim();
        match digits.parse::<u8>() {
            Ok(value) if value <= 100 => Ok(SkillLevel(value)),
            _ => Err(ValidationError::with_context(
                ValidationErrorKind::InvalidProgress,
                "progress",
                format!("Expected a percentage between 0 and 100, got: {}", s),
            )),
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_ratio() {
        // Fully inside
        assert_eq!(Bounds::new(100.0, 200.0).visible_ratio(800.0), 1.0);
        // Entirely below the root
        assert_eq!(Bounds::new(900.0, 200.0).visible_ratio(800.0), 0.0);
        // Entirely above the viewport
        assert_eq!(Bounds::new(-300.0, 200.0).visible_ratio(800.0), 0.0);
        // Half peeking in at the bottom
        assert_eq!(Bounds::new(700.0, 200.0).visible_ratio(800.0), 0.5);
        // Half scrolled off the top
        assert_eq!(Bounds::new(-100.0, 200.0).visible_ratio(800.0), 0.5);
    }

    #[test]
    fn test_zero_height_bounds() {
        assert_eq!(Bounds::new(10.0, 0.0).visible_ratio(800.0), 1.0);
        assert_eq!(Bounds::new(810.0, 0.0).visible_ratio(800.0), 0.0);
    }

    #[test]
    fn test_skill_level_parse() {
        assert_eq!("85%".parse::<SkillLevel>().unwrap().percent(), 85);
        assert_eq!(" 40 ".parse::<SkillLevel>().unwrap().percent(), 40);
        assert_eq!("100%".parse::<SkillLevel>().unwrap().to_string(), "100%");

        assert!("101%".parse::<SkillLevel>().is_err());
        assert!("-5%".parse::<SkillLevel>().is_err());
        assert!("lots".parse::<SkillLevel>().is_err());
        assert!("".parse::<SkillLevel>().is_err());
    }
}
