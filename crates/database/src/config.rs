use chrono::Duration;

/// Tunables for the lifecycle guards.
///
/// The delete window bounds how long after creation a course may still be
/// physically removed; past it only deactivation remains possible.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub course_delete_window: Duration,
}

impl LifecycleConfig {
    pub const DEFAULT_DELETE_WINDOW_MINUTES: i64 = 1;

    /// Reads `COURSE_DELETE_WINDOW_MINUTES` from the environment, falling
    /// back to the default when unset or unparsable
    pub fn from_env() -> Self {
        let minutes = dotenvy::var("COURSE_DELETE_WINDOW_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(Self::DEFAULT_DELETE_WINDOW_MINUTES);

        Self::with_window_minutes(minutes)
    }

    pub fn with_window_minutes(minutes: i64) -> Self {
        Self {
            course_delete_window: Duration::minutes(minutes),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::with_window_minutes(Self::DEFAULT_DELETE_WINDOW_MINUTES)
    }
}
