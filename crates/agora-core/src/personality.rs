//! Fixed personality traits and their mapping onto generation options

use agora_llm::GenerationOptions;
use serde::{Deserialize, Serialize};

use crate::error::{unit_interval, AgentResult};

/// Maximum change applied to a trait by a single learning event
pub const NUDGE_STEP: f64 = 0.05;

/// A named personality trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Assertiveness,
    Openness,
    Analytical,
    Empathy,
    Adaptability,
}

impl Trait {
    pub const ALL: [Trait; 5] = [
        Trait::Assertiveness,
        Trait::Openness,
        Trait::Analytical,
        Trait::Empathy,
        Trait::Adaptability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Assertiveness => "assertiveness",
            Trait::Openness => "openness",
            Trait::Analytical => "analytical",
            Trait::Empathy => "empathy",
            Trait::Adaptability => "adaptability",
        }
    }
}

impl std::fmt::Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait record; every value stays within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    assertiveness: f64,
    openness: f64,
    analytical: f64,
    empathy: f64,
    adaptability: f64,
}

impl Personality {
    /// Build a personality, rejecting out-of-range values
    pub fn new(
        assertiveness: f64,
        openness: f64,
        analytical: f64,
        empathy: f64,
        adaptability: f64,
    ) -> AgentResult<Self> {
        Ok(Self {
            assertiveness: unit_interval("assertiveness", assertiveness)?,
            openness: unit_interval("openness", openness)?,
            analytical: unit_interval("analytical", analytical)?,
            empathy: unit_interval("empathy", empathy)?,
            adaptability: unit_interval("adaptability", adaptability)?,
        })
    }

    /// Assertive, analytical profile used by debaters
    pub fn debater() -> Self {
        Self {
            assertiveness: 0.8,
            openness: 0.6,
            analytical: 0.7,
            empathy: 0.5,
            adaptability: 0.6,
        }
    }

    /// Cautious, highly analytical profile used by fact verification
    pub fn fact_checker() -> Self {
        Self {
            assertiveness: 0.3,
            openness: 0.4,
            analytical: 0.9,
            empathy: 0.3,
            adaptability: 0.5,
        }
    }

    /// Balanced, empathetic profile used by moderation
    pub fn moderator() -> Self {
        Self {
            assertiveness: 0.6,
            openness: 0.7,
            analytical: 0.6,
            empathy: 0.8,
            adaptability: 0.7,
        }
    }

    pub fn get(&self, t: Trait) -> f64 {
        match t {
            Trait::Assertiveness => self.assertiveness,
            Trait::Openness => self.openness,
            Trait::Analytical => self.analytical,
            Trait::Empathy => self.empathy,
            Trait::Adaptability => self.adaptability,
        }
    }

    fn slot(&mut self, t: Trait) -> &mut f64 {
        match t {
            Trait::Assertiveness => &mut self.assertiveness,
            Trait::Openness => &mut self.openness,
            Trait::Analytical => &mut self.analytical,
            Trait::Empathy => &mut self.empathy,
            Trait::Adaptability => &mut self.adaptability,
        }
    }

    /// Move a trait toward `target` by at most [`NUDGE_STEP`], returning the new value
    pub fn nudge(&mut self, t: Trait, target: f64) -> f64 {
        let target = if target.is_finite() {
            target.clamp(0.0, 1.0)
        } else {
            return self.get(t);
        };
        let slot = self.slot(t);
        let delta = (target - *slot).clamp(-NUDGE_STEP, NUDGE_STEP);
        *slot = (*slot + delta).clamp(0.0, 1.0);
        *slot
    }

    /// Mean of the given traits; 0.5 when none are named
    pub fn alignment(&self, traits: &[Trait]) -> f64 {
        if traits.is_empty() {
            return 0.5;
        }
        traits.iter().map(|t| self.get(*t)).sum::<f64>() / traits.len() as f64
    }

    /// Shape generation options: openness drives temperature, assertiveness
    /// drives length, low adaptability raises the repetition penalty
    pub fn generation_options(&self, base: &GenerationOptions) -> GenerationOptions {
        let length_factor = 0.75 + 0.5 * self.assertiveness;
        GenerationOptions {
            max_tokens: ((base.max_tokens as f64) * length_factor).round().max(16.0) as u32,
            temperature: (0.3 + 0.6 * self.openness) as f32,
            repetition_penalty: (1.0 + 0.2 * (1.0 - self.adaptability)) as f32,
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            assertiveness: 0.5,
            openness: 0.5,
            analytical: 0.5,
            empathy: 0.5,
            adaptability: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Personality::new(0.5, 0.5, 0.5, 0.5, 0.5).is_ok());
        assert!(Personality::new(1.5, 0.5, 0.5, 0.5, 0.5).is_err());
        assert!(Personality::new(0.5, -0.1, 0.5, 0.5, 0.5).is_err());
    }

    #[test]
    fn test_nudge_is_bounded() {
        let mut p = Personality::default();
        assert!((p.nudge(Trait::Openness, 1.0) - 0.55).abs() < 1e-9);
        assert!((p.nudge(Trait::Openness, 0.56) - 0.56).abs() < 1e-9);
        assert!((p.nudge(Trait::Empathy, 0.0) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_generation_options_mapping() {
        let base = GenerationOptions::default();
        let opts = Personality::debater().generation_options(&base);
        assert!(opts.temperature > 0.6 && opts.temperature < 0.7);
        assert!(opts.max_tokens > base.max_tokens);

        let cautious = Personality::fact_checker().generation_options(&base);
        assert!(cautious.temperature < opts.temperature);
    }

    #[test]
    fn test_alignment() {
        let p = Personality::debater();
        assert!((p.alignment(&[Trait::Assertiveness, Trait::Analytical]) - 0.75).abs() < 1e-9);
        assert_eq!(p.alignment(&[]), 0.5);
    }
}
