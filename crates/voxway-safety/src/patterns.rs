//! Rule definitions for the safety gate, grouped by category.
//!
//! Patterns are intentionally coarse keyword/phrase matchers: the gate is a
//! policy checkpoint, not a research-grade classifier. Over-matching at the
//! strict level is acceptable; the universal and harmful tiers aim for
//! precision on unambiguous phrasing.

use crate::{RuleTier, SafetyRule};
use regex::Regex;

/// Builds the complete ordered rule set, most severe tier first.
pub(crate) fn all_rules() -> Vec<SafetyRule> {
    let mut rules = Vec::new();
    rules.extend(minors_rules());
    rules.extend(self_harm_rules());
    rules.extend(illegal_activity_rules());
    rules.extend(violent_threat_rules());
    rules.extend(explicit_sexual_rules());
    rules.extend(graphic_violence_rules());
    rules.extend(harassment_rules());
    rules.extend(adult_theme_rules());
    rules
}

fn rule(category: &'static str, tier: RuleTier, pattern: &str) -> SafetyRule {
    SafetyRule {
        category,
        tier,
        pattern: Regex::new(pattern).expect("built-in safety pattern must compile"),
    }
}

// ---- Universal tier: blocked at every level, no exceptions ----

fn minors_rules() -> Vec<SafetyRule> {
    vec![
        rule(
            "sexual content involving minors",
            RuleTier::Universal,
            r"(?i)\b(sexual|sexually|explicit|nude|naked|porn\w*)\b.{0,60}\b(minor|minors|child|children|underage|preteen|kid|kids)\b",
        ),
        rule(
            "sexual content involving minors",
            RuleTier::Universal,
            r"(?i)\b(minor|minors|child|children|underage|preteen)\b.{0,60}\b(sexual|sexually|explicit|nude|naked|porn\w*)\b",
        ),
        rule(
            "sexual content involving minors",
            RuleTier::Universal,
            r"(?i)\b(csam|child\s+porn\w*|loli\w*)\b",
        ),
    ]
}

// ---- Harmful tier: blocked at every level including permissive ----

fn self_harm_rules() -> Vec<SafetyRule> {
    vec![
        rule(
            "self-harm",
            RuleTier::Harmful,
            r"(?i)\b(how\s+to|ways?\s+to|best\s+way\s+to)\b.{0,40}\b(kill\s+(yourself|myself|themselves)|commit\s+suicide|end\s+(your|my)\s+life)\b",
        ),
        rule(
            "self-harm",
            RuleTier::Harmful,
            r"(?i)\b(kill\s+(yourself|myself)|suicide\s+method|painless(ly)?\s+(suicide|death)|self[-\s]?harm\s+(technique|method))\b",
        ),
    ]
}

fn illegal_activity_rules() -> Vec<SafetyRule> {
    vec![
        rule(
            "illegal-activity instructions",
            RuleTier::Harmful,
            r"(?i)\b(how\s+to|instructions?\s+(to|for)|step[-\s]by[-\s]step)\b.{0,50}\b(make|build|synthesize|manufacture|cook)\b.{0,40}\b(bomb|explosive|meth\w*|napalm|nerve\s+agent|ghost\s+gun)\b",
        ),
        rule(
            "illegal-activity instructions",
            RuleTier::Harmful,
            r"(?i)\b(how\s+to)\b.{0,40}\b(launder\s+money|steal\s+a\s+car|pick\s+a\s+lock\s+to\s+break\s+in|hotwire)\b",
        ),
    ]
}

fn violent_threat_rules() -> Vec<SafetyRule> {
    vec![rule(
        "violent threat",
        RuleTier::Harmful,
        r"(?i)\b(i\s+(will|am\s+going\s+to)|we\s+(will|are\s+going\s+to))\s+(kill|murder|shoot|stab|hurt)\s+(you|him|her|them)\b",
    )]
}

// ---- Explicit tier: blocked at moderate and strict ----

fn explicit_sexual_rules() -> Vec<SafetyRule> {
    vec![rule(
        "explicit sexual content",
        RuleTier::Explicit,
        r"(?i)\b(hardcore\s+porn\w*|pornograph\w*|explicit\s+sex(ual)?\s+(act|scene|content)|xxx[-\s]rated)\b",
    )]
}

fn graphic_violence_rules() -> Vec<SafetyRule> {
    vec![rule(
        "graphic violence",
        RuleTier::Explicit,
        r"(?i)\b(graphic(ally)?\s+(violence|violent|gore)|dismember\w*|torture\s+(scene|in\s+detail)|mutilat\w*)\b",
    )]
}

fn harassment_rules() -> Vec<SafetyRule> {
    vec![rule(
        "harassment",
        RuleTier::Explicit,
        r"(?i)\b(you\s+(worthless|pathetic)\s+(piece\s+of\s+\w+|waste)|go\s+die|nobody\s+would\s+miss\s+you)\b",
    )]
}

// ---- Sensitive tier: blocked at strict only ----

fn adult_theme_rules() -> Vec<SafetyRule> {
    vec![
        rule(
            "adult themes",
            RuleTier::Sensitive,
            r"(?i)\b(get\s+(drunk|wasted|high)|recreational\s+drug\s+use|strip\s+club|one[-\s]night\s+stand)\b",
        ),
        rule(
            "adult themes",
            RuleTier::Sensitive,
            r"(?i)\b(gambling\s+(tips|strategy)|how\s+to\s+win\s+at\s+(poker|blackjack)\s+for\s+money)\b",
        ),
        rule(
            "ambiguous violence",
            RuleTier::Sensitive,
            r"(?i)\b(fight\s+club|beat\s+(him|her|them)\s+up|get\s+revenge\s+on)\b",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile_and_are_ordered_by_severity() {
        let rules = all_rules();
        assert!(rules.len() >= 12);

        // Universal rules must come first so they win reason reporting.
        let first_non_universal = rules
            .iter()
            .position(|r| r.tier != RuleTier::Universal)
            .expect("rule set has non-universal tiers");
        assert!(rules[..first_non_universal]
            .iter()
            .all(|r| r.tier == RuleTier::Universal));
    }

    #[test]
    fn minors_patterns_match_both_word_orders() {
        let rules = minors_rules();
        let forward = "explicit images of a child";
        let backward = "a child shown in explicit images";
        assert!(rules.iter().any(|r| r.pattern.is_match(forward)));
        assert!(rules.iter().any(|r| r.pattern.is_match(backward)));
    }

    #[test]
    fn benign_mentions_of_children_do_not_match() {
        let rules = minors_rules();
        let benign = "my children love the playground near our house";
        assert!(!rules.iter().any(|r| r.pattern.is_match(benign)));
    }
}
