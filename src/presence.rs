use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Absent,
    Present(Duration),
    Exceeded(Duration),
}

/// Tracks how long someone has stayed in front of the camera.
///
/// A session starts with the first detection and survives gaps shorter than
/// `grace`; a longer gap ends it.
#[derive(Debug, Clone)]
pub struct PresenceTimer {
    limit: Duration,
    grace: Duration,
    session_start: Option<Instant>,
    last_seen: Option<Instant>,
}

impl PresenceTimer {
    pub fn new(limit: Duration, grace: Duration) -> Self {
        Self {
            limit,
            grace,
            session_start: None,
            last_seen: None,
        }
    }

    pub fn from_minutes(minutes: u32, grace: Duration) -> Self {
        Self::new(Duration::from_secs(u64::from(minutes) * 60), grace)
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn observe(&mut self, detected: bool, now: Instant) -> PresenceState {
        if let Some(last_seen) = self.last_seen {
            if now.saturating_duration_since(last_seen) > self.grace {
                self.session_start = None;
                self.last_seen = None;
            }
        }

        if detected {
            self.session_start.get_or_insert(now);
            self.last_seen = Some(now);
        }

        match self.session_start {
            None => PresenceState::Absent,
            Some(start) => {
                let elapsed = now.saturating_duration_since(start);
                if elapsed >= self.limit {
                    PresenceState::Exceeded(elapsed)
                } else {
                    PresenceState::Present(elapsed)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn absent_until_first_detection() {
        let mut timer = PresenceTimer::new(secs(60), secs(5));
        let t0 = Instant::now();
        assert_eq!(timer.observe(false, t0), PresenceState::Absent);
        assert_eq!(timer.observe(true, t0 + secs(1)), PresenceState::Present(secs(0)));
    }

    #[test]
    fn short_gaps_keep_the_session() {
        let mut timer = PresenceTimer::new(secs(60), secs(5));
        let t0 = Instant::now();
        timer.observe(true, t0);
        assert_eq!(timer.observe(false, t0 + secs(3)), PresenceState::Present(secs(3)));
        assert_eq!(timer.observe(true, t0 + secs(4)), PresenceState::Present(secs(4)));
    }

    #[test]
    fn long_gaps_end_the_session() {
        let mut timer = PresenceTimer::new(secs(60), secs(5));
        let t0 = Instant::now();
        timer.observe(true, t0);
        assert_eq!(timer.observe(false, t0 + secs(10)), PresenceState::Absent);
        assert_eq!(timer.observe(true, t0 + secs(11)), PresenceState::Present(secs(0)));
    }

    #[test]
    fn reports_exceeded_past_the_limit() {
        let mut timer = PresenceTimer::from_minutes(1, secs(5));
        let t0 = Instant::now();
        for step in 0..=12 {
            timer.observe(true, t0 + secs(step * 5));
        }
        assert_eq!(timer.observe(true, t0 + secs(61)), PresenceState::Exceeded(secs(61)));
    }
}
