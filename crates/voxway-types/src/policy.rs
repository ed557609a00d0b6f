//! Gateway policy configuration.

use crate::{Tier, MAX_AUDIO_BYTES};
use serde::{Deserialize, Serialize};

/// Defines the operational policy of a Voxway gateway.
///
/// Loaded from configuration at startup and shared read-only across
/// request handlers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayPolicy {
    /// Daily call limit for free-tier keys.
    pub free_daily_limit: u32,
    /// Daily call limit for professional-tier keys.
    pub professional_daily_limit: u32,
    /// Daily call limit for enterprise-tier keys.
    pub enterprise_daily_limit: u32,
    /// Maximum decoded audio payload size in bytes.
    pub max_audio_bytes: usize,
}

impl GatewayPolicy {
    /// Returns the daily limit for the given tier.
    pub fn daily_limit(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Free => self.free_daily_limit,
            Tier::Professional => self.professional_daily_limit,
            Tier::Enterprise => self.enterprise_daily_limit,
        }
    }
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self {
            free_daily_limit: 20,
            professional_daily_limit: 200,
            enterprise_daily_limit: 2000,
            max_audio_bytes: MAX_AUDIO_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_values() {
        let policy = GatewayPolicy::default();
        assert_eq!(policy.daily_limit(Tier::Free), 20);
        assert_eq!(policy.daily_limit(Tier::Professional), 200);
        assert_eq!(policy.daily_limit(Tier::Enterprise), 2000);
        assert_eq!(policy.max_audio_bytes, MAX_AUDIO_BYTES);
    }

    #[test]
    fn serialization_round_trip() {
        let policy = GatewayPolicy::default();
        let json = serde_json::to_string(&policy).expect("should serialize");
        let decoded: GatewayPolicy = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(policy, decoded);
    }
}
