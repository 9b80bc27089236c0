//! Fixed-period scheduling driven by the render loop.
//!
//! `draw_web()` calls at ~60fps with variable delta. A `Cadence` turns the
//! wall-clock timestamps it is fed into "fire now" decisions at a fixed
//! period, so periodic work needs no JS timers and stays fully testable.

pub struct Cadence {
    /// Milliseconds between firings
    period_ms: u64,
    /// Timestamp of the last firing (ms), None until first fed
    last_fired: Option<u64>,
    /// Total firings since creation
    pub fired: u64,
}

impl Cadence {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            last_fired: None,
            fired: 0,
        }
    }

    /// Feed the current wall-clock time. Returns true when a period has
    /// elapsed since the last firing.
    ///
    /// The first call only arms the cadence. Missed periods (tab in the
    /// background) collapse into a single firing. A clock that jumps
    /// backwards re-arms instead of stalling until it catches up.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let prev = match self.last_fired {
            Some(prev) if now_ms >= prev => prev,
            _ => {
                self.last_fired = Some(now_ms);
                return false;
            }
        };

        let elapsed = now_ms - prev;
        if elapsed < self.period_ms {
            return false;
        }

        // Stay on the grid while we keep up; resync after a long stall.
        self.last_fired = Some(if elapsed < self.period_ms * 2 {
            prev + self.period_ms
        } else {
            now_ms
        });
        self.fired += 1;
        true
    }
}
