use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

/// per-key sliding window: a hit is admitted while fewer than `cap`
/// hits landed inside the trailing window
pub struct SlidingWindow {
    cap: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindow {
    pub fn new(cap: usize, window: Duration) -> Self {
        Self {
            cap,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap();
        let queue = hits.entry(key.to_string()).or_default();
        while queue
            .front()
            .is_some_and(|t| now.duration_since(*t) > self.window)
        {
            queue.pop_front();
        }
        if queue.len() < self.cap {
            queue.push_back(now);
            true
        } else {
            false
        }
    }
}

/// single fixed window that resets wholesale on expiry
pub struct FixedWindow {
    cap: usize,
    window: Duration,
    state: Mutex<(Instant, usize)>,
}

impl FixedWindow {
    pub fn new(cap: usize, window: Duration) -> Self {
        Self {
            cap,
            window,
            state: Mutex::new((Instant::now(), 0)),
        }
    }

    pub fn allow(&self) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        if now.duration_since(state.0) > self.window {
            *state = (now, 0);
        }
        if state.1 < self.cap {
            state.1 += 1;
            true
        } else {
            false
        }
    }
}

/// the advisory limits in front of client-initiated mutations. the
/// global window is canonical; the others are courtesies. none of
/// these guard the autonomous loop.
pub struct Limits {
    pub per_ip: SlidingWindow,
    pub per_game: SlidingWindow,
    pub global: FixedWindow,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            per_ip: SlidingWindow::new(crate::RATE_IP_PER_MIN, Duration::from_secs(60)),
            per_game: SlidingWindow::new(crate::RATE_GAME_PER_10_MIN, Duration::from_secs(600)),
            global: FixedWindow::new(crate::RATE_GLOBAL_PER_HOUR, Duration::from_secs(3600)),
        }
    }
}

impl Limits {
    pub fn admit(&self, ip: &str, game: Option<&str>) -> bool {
        let per_game = match game {
            Some(id) => self.per_game.allow(id),
            None => true,
        };
        // evaluate every window so each records the hit
        let per_ip = self.per_ip.allow(ip);
        let global = self.global.allow();
        per_game && per_ip && global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sliding_window_caps_per_key() {
        let window = SlidingWindow::new(3, Duration::from_secs(60));
        assert!(window.allow("a"));
        assert!(window.allow("a"));
        assert!(window.allow("a"));
        assert!(!window.allow("a"));
        // other keys are unaffected
        assert!(window.allow("b"));
    }

    #[test]
    fn fixed_window_caps_globally() {
        let window = FixedWindow::new(2, Duration::from_secs(3600));
        assert!(window.allow());
        assert!(window.allow());
        assert!(!window.allow());
    }

    #[test]
    fn limits_admit_until_any_window_trips() {
        let limits = Limits {
            per_ip: SlidingWindow::new(1, Duration::from_secs(60)),
            per_game: SlidingWindow::new(10, Duration::from_secs(60)),
            global: FixedWindow::new(10, Duration::from_secs(60)),
        };
        assert!(limits.admit("1.2.3.4", Some("g")));
        assert!(!limits.admit("1.2.3.4", Some("g")));
        assert!(limits.admit("4.3.2.1", Some("g")));
    }
}
