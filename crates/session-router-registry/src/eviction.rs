use std::fmt;
use std::time::Duration;

/// When a session is dropped from the registry without an explicit close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Sessions live until closed or the process exits
    Never,
    /// Sessions idle for longer than the duration are swept
    IdleTimeout(Duration),
}

impl EvictionPolicy {
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    /// `0` means never evict
    pub fn from_idle_secs(secs: u64) -> Self {
        if secs == 0 {
            EvictionPolicy::Never
        } else {
            EvictionPolicy::IdleTimeout(Duration::from_secs(secs))
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        match self {
            EvictionPolicy::Never => None,
            EvictionPolicy::IdleTimeout(timeout) => Some(*timeout),
        }
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::IdleTimeout(Self::DEFAULT_IDLE_TIMEOUT)
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Never => write!(f, "never"),
            EvictionPolicy::IdleTimeout(timeout) => {
                write!(f, "idle timeout {}s", timeout.as_secs())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_secs() {
        assert_eq!(EvictionPolicy::from_idle_secs(0), EvictionPolicy::Never);
        assert_eq!(
            EvictionPolicy::from_idle_secs(90).idle_timeout(),
            Some(Duration::from_secs(90))
        );
        assert_eq!(
            EvictionPolicy::default().idle_timeout(),
            Some(Duration::from_secs(1800))
        );
    }
}
