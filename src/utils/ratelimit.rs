use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Per-user, per-command cooldown table
pub struct CommandCooldowns {
    cooldown: Duration,
    /// Key: (user id, command), value: when the command last ran
    last_used: Mutex<HashMap<(u64, String), Instant>>,
    /// Key: (user id, command), value: when the user was last told to wait
    warned: Mutex<HashMap<(u64, String), Instant>>,
}

impl CommandCooldowns {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_used: Mutex::new(HashMap::new()),
            warned: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Check if a user can execute a command.
    /// Returns Err((remaining, should_warn)) while on cooldown; `should_warn` is true only
    /// for the first blocked attempt of each cooldown period.
    pub async fn check(&self, user_id: u64, command: &str) -> Result<(), (Duration, bool)> {
        self.check_at(user_id, command, Instant::now()).await
    }

    async fn check_at(
        &self,
        user_id: u64,
        command: &str,
        now: Instant,
    ) -> Result<(), (Duration, bool)> {
        if self.cooldown.is_zero() {
            return Ok(());
        }

        let key = (user_id, command.to_string());
        let mut last_used = self.last_used.lock().await;

        if let Some(&last_time) = last_used.get(&key) {
            let elapsed = now.saturating_duration_since(last_time);
            if elapsed < self.cooldown {
                let mut warned = self.warned.lock().await;
                // Only warn if the last warning belongs to an earlier cooldown period
                let should_warn = warned
                    .get(&key)
                    .map_or(true, |&last_warning| last_warning < last_time);
                if should_warn {
                    warned.insert(key, now);
                }
                return Err((self.cooldown - elapsed, should_warn));
            }
        }

        last_used.insert(key, now);
        Ok(())
    }
}
