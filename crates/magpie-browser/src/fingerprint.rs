//! Randomized browser identity.
//!
//! Job boards block traffic that presents the same automation fingerprint
//! on every run. Each launch assembles a user agent from pools of common
//! desktop platforms and recent Chrome builds instead of reusing a fixed
//! string.

use rand::seq::SliceRandom;
use rand::Rng;

const PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
];

const CHROME_MAJORS: &[u32] = &[122, 123, 124];

/// Browser identity presented to the remote site for one launch.
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    /// User agent applied to every page the engine opens
    pub user_agent: String,
}

impl FingerprintConfig {
    /// Assemble a fingerprint from the common-desktop pools.
    #[must_use]
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();
        let platform = PLATFORMS
            .choose(&mut rng)
            .expect("platform pool is non-empty");
        let major = CHROME_MAJORS
            .choose(&mut rng)
            .expect("version pool is non-empty");
        let build = rng.gen_range(6200..6500);

        Self {
            user_agent: format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/{major}.0.{build}.0 Safari/537.36"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randomized_user_agent_shape() {
        let config = FingerprintConfig::randomized();
        assert!(config.user_agent.starts_with("Mozilla/5.0 ("));
        assert!(config.user_agent.contains("Chrome/"));
        assert!(config.user_agent.ends_with("Safari/537.36"));
    }

    #[test]
    fn test_fingerprints_vary_across_launches() {
        // Probabilistic but very unlikely to fail
        let agents: Vec<_> = (0..20)
            .map(|_| FingerprintConfig::randomized().user_agent)
            .collect();
        let first = &agents[0];
        assert!(agents.iter().any(|ua| ua != first));
    }
}
