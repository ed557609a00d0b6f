//! Content-safety gate for the Voxway pipeline.
//!
//! The gate classifies a text string against a caller-selected
//! [`SafetyLevel`] and returns an allow/block [`SafetyVerdict`]. It is
//! called twice per pipeline run: once on the STT transcript (input
//! safety) and once on the AI reply (output safety).
//!
//! Policy, not mechanism: rules are grouped into tiers, and the requested
//! level decides which tiers block. Sexual content involving minors is in
//! the universal tier and blocks at every level without exception.

mod patterns;

use regex::Regex;
use voxway_types::{SafetyLevel, SafetyVerdict};

/// How far down the permissiveness scale a rule keeps blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTier {
    /// Blocked at every level, non-negotiable.
    Universal,
    /// Clearly harmful content; blocked at every level including permissive.
    Harmful,
    /// Explicit content; blocked at moderate and strict.
    Explicit,
    /// Adult or ambiguous content; blocked at strict only.
    Sensitive,
}

impl RuleTier {
    /// Whether a rule of this tier blocks under the given level.
    fn blocks_at(self, level: SafetyLevel) -> bool {
        match self {
            Self::Universal | Self::Harmful => true,
            Self::Explicit => matches!(level, SafetyLevel::Strict | SafetyLevel::Moderate),
            Self::Sensitive => level == SafetyLevel::Strict,
        }
    }
}

/// A single classification rule.
pub struct SafetyRule {
    /// Short category label surfaced as the block reason.
    pub category: &'static str,
    /// Tier deciding at which levels this rule blocks.
    pub tier: RuleTier,
    /// Compiled match pattern.
    pub pattern: Regex,
}

/// The safety gate: an ordered rule set evaluated per request level.
///
/// Construction compiles every pattern once; the gate is then shared
/// read-only across concurrent pipeline runs.
pub struct SafetyGate {
    rules: Vec<SafetyRule>,
}

impl SafetyGate {
    /// Builds the gate with the built-in rule set.
    pub fn new() -> Self {
        Self {
            rules: patterns::all_rules(),
        }
    }

    /// Classifies `text` at the given level.
    ///
    /// Rules are evaluated universal-tier first so the most severe
    /// category wins the reported reason when several match.
    pub fn check(&self, text: &str, level: SafetyLevel) -> SafetyVerdict {
        for rule in &self.rules {
            if rule.tier.blocks_at(level) && rule.pattern.is_match(text) {
                tracing::debug!(
                    category = rule.category,
                    level = level.as_str(),
                    "safety gate blocked text"
                );
                return SafetyVerdict::block(level, rule.category);
            }
        }
        SafetyVerdict::allow(level)
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LEVELS: [SafetyLevel; 3] = [
        SafetyLevel::Strict,
        SafetyLevel::Moderate,
        SafetyLevel::Permissive,
    ];

    #[test]
    fn minors_rule_blocks_at_every_level() {
        let gate = SafetyGate::new();
        for level in ALL_LEVELS {
            let verdict = gate.check("explicit sexual content involving a minor", level);
            assert!(!verdict.allowed, "must block at {}", level.as_str());
            assert_eq!(verdict.reason, "sexual content involving minors");
        }
    }

    #[test]
    fn self_harm_instructions_block_even_when_permissive() {
        let gate = SafetyGate::new();
        let verdict = gate.check(
            "here is how to kill yourself painlessly",
            SafetyLevel::Permissive,
        );
        assert!(!verdict.allowed);
    }

    #[test]
    fn illegal_activity_instructions_block_even_when_permissive() {
        let gate = SafetyGate::new();
        let verdict = gate.check(
            "step by step instructions to make a pipe bomb at home",
            SafetyLevel::Permissive,
        );
        assert!(!verdict.allowed);
    }

    #[test]
    fn explicit_content_blocks_at_moderate_but_not_permissive() {
        let gate = SafetyGate::new();
        let text = "graphic depiction of hardcore pornography";
        assert!(!gate.check(text, SafetyLevel::Strict).allowed);
        assert!(!gate.check(text, SafetyLevel::Moderate).allowed);
        assert!(gate.check(text, SafetyLevel::Permissive).allowed);
    }

    #[test]
    fn sensitive_content_blocks_only_at_strict() {
        let gate = SafetyGate::new();
        let text = "let's get drunk and talk about recreational drug use";
        assert!(!gate.check(text, SafetyLevel::Strict).allowed);
        assert!(gate.check(text, SafetyLevel::Moderate).allowed);
        assert!(gate.check(text, SafetyLevel::Permissive).allowed);
    }

    #[test]
    fn benign_text_passes_every_level() {
        let gate = SafetyGate::new();
        for level in ALL_LEVELS {
            let verdict = gate.check("what is the weather like in lisbon today?", level);
            assert!(verdict.allowed, "benign text blocked at {}", level.as_str());
            assert!(verdict.reason.is_empty());
        }
    }

    #[test]
    fn verdict_echoes_requested_level() {
        let gate = SafetyGate::new();
        let verdict = gate.check("hello there", SafetyLevel::Moderate);
        assert_eq!(verdict.level, SafetyLevel::Moderate);
    }
}
