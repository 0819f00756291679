//! Configuration for the wallet session and quest form

use std::time::Duration;

/// User-agent fragments that identify a mobile browser.
const MOBILE_MARKERS: &[&str] = &[
    "Android",
    "webOS",
    "iPhone",
    "iPad",
    "iPod",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

/// Platform the front-end believes it runs on.
///
/// Only affects timeouts and the wording of status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformHint {
    #[default]
    Desktop,
    Mobile,
}

impl PlatformHint {
    /// Guesses the platform from a user-agent string.
    pub fn detect(user_agent: &str) -> Self {
        let lowered = user_agent.to_lowercase();
        if MOBILE_MARKERS
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
        {
            PlatformHint::Mobile
        } else {
            PlatformHint::Desktop
        }
    }

    /// Returns whether this is a mobile platform.
    pub fn is_mobile(&self) -> bool {
        matches!(self, PlatformHint::Mobile)
    }

    /// Default provider round-trip budget for this platform.
    pub fn default_request_timeout(&self) -> Duration {
        match self {
            PlatformHint::Desktop => Duration::from_secs(15),
            PlatformHint::Mobile => Duration::from_secs(25),
        }
    }
}

/// Configuration for a [`WalletSession`](crate::WalletSession)
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Platform the session runs on
    pub platform_hint: PlatformHint,
    /// Budget for each provider round trip
    pub request_timeout: Duration,
    /// Consecutive failed attempts allowed before `connect` is refused
    pub max_attempts: u32,
    /// Base of the exponential retry delay
    pub retry_base: Duration,
    /// Ceiling of the retry delay
    pub retry_cap: Duration,
    /// Wait before polling accounts after a pending-request error
    pub pending_poll_delay: Duration,
    /// Delay before the single chain id retry
    pub network_retry_delay: Duration,
    /// Interval of the connection health check, `None` disables it
    pub health_check_interval: Option<Duration>,
    /// How long the disconnect notice stays on the status line
    pub notice_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_platform(PlatformHint::Desktop)
    }
}

impl SessionConfig {
    /// Create a configuration tuned for a platform
    pub fn for_platform(platform_hint: PlatformHint) -> Self {
        Self {
            platform_hint,
            request_timeout: platform_hint.default_request_timeout(),
            max_attempts: 3,
            retry_base: Duration::from_millis(1500),
            retry_cap: Duration::from_secs(10),
            pending_poll_delay: Duration::from_secs(2),
            network_retry_delay: Duration::from_secs(2),
            health_check_interval: Some(Duration::from_secs(5)),
            notice_duration: Duration::from_secs(2),
        }
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the maximum number of consecutive attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the retry backoff base and ceiling
    pub fn with_retry_backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.retry_base = base;
        self.retry_cap = cap.max(base);
        self
    }

    /// Set the health check interval
    pub fn with_health_check(mut self, interval: Option<Duration>) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Set the pending-request poll delay
    pub fn with_pending_poll_delay(mut self, delay: Duration) -> Self {
        self.pending_poll_delay = delay;
        self
    }

    /// Set how long the disconnect notice is shown
    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    /// Delay before the automatic retry that follows `attempts` failures.
    pub fn retry_delay(&self, attempts: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempts);
        self.retry_base.saturating_mul(factor).min(self.retry_cap)
    }
}

/// How long quest form feedback and claim notices stay visible
#[derive(Debug, Clone, Copy)]
pub struct FormTimings {
    pub success_flash: Duration,
    pub error_flash: Duration,
    pub claim_flash: Duration,
}

impl Default for FormTimings {
    fn default() -> Self {
        Self {
            success_flash: Duration::from_secs(2),
            error_flash: Duration::from_secs(3),
            claim_flash: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_platform() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36";
        assert_eq!(PlatformHint::detect(iphone), PlatformHint::Mobile);
        assert_eq!(PlatformHint::detect(desktop), PlatformHint::Desktop);
        assert!(PlatformHint::detect("Opera Mini/8.0").is_mobile());
    }

    #[test]
    fn test_platform_timeouts() {
        assert_eq!(SessionConfig::default().request_timeout, Duration::from_secs(15));
        assert_eq!(
            SessionConfig::for_platform(PlatformHint::Mobile).request_timeout,
            Duration::from_secs(25)
        );
    }

    #[test]
    fn test_retry_delay_backoff_and_cap() {
        let config = SessionConfig::default();
        assert_eq!(config.retry_delay(1), Duration::from_millis(3000));
        assert_eq!(config.retry_delay(2), Duration::from_millis(6000));
        assert_eq!(config.retry_delay(3), Duration::from_secs(10));
        assert_eq!(config.retry_delay(40), Duration::from_secs(10));
    }

    #[test]
    fn test_max_attempts_floor() {
        assert_eq!(SessionConfig::default().with_max_attempts(0).max_attempts, 1);
    }
}
