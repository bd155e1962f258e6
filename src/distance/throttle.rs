//! Cool-down enforcement between provider requests.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;

/// Blocks the caller until the next provider request is allowed.
pub trait Throttle {
    /// Called immediately before every provider request.
    fn wait(&mut self);
}

/// Sleeps so consecutive requests start at least `cooldown` apart.
///
/// The first request goes out immediately; each later one waits out
/// whatever remains of the cool-down since the previous request started.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use u_canvass::distance::{SleepThrottle, Throttle};
///
/// let mut throttle = SleepThrottle::new(Duration::from_millis(5));
/// throttle.wait();
/// let first = Instant::now();
/// throttle.wait();
/// assert!(first.elapsed() >= Duration::from_millis(4));
/// ```
#[derive(Debug, Clone)]
pub struct SleepThrottle {
    cooldown: Duration,
    last: Option<Instant>,
}

impl SleepThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Throttle for SleepThrottle {
    fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                let remaining = self.cooldown - elapsed;
                debug!("provider cool-down: sleeping {remaining:?}");
                thread::sleep(remaining);
            }
        }
        self.last = Some(Instant::now());
    }
}
