/// Logical phase a hide timer belongs to. Scheduling into a slot replaces
/// whatever was pending there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
    Media,
    SafetyNet,
    PageLoad,
}

#[derive(Debug)]
struct Pending {
    slot: TimerSlot,
    deadline_ms: u64,
}

/// Virtual-clock deadlines, advanced by the frame loop.
#[derive(Debug, Default)]
pub struct Timers {
    now_ms: u64,
    pending: Vec<Pending>,
}

impl Timers {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, slot: TimerSlot, delay_ms: u64) {
        self.cancel(slot);
        self.pending.push(Pending { slot, deadline_ms: self.now_ms + delay_ms });
    }

    pub fn cancel(&mut self, slot: TimerSlot) {
        self.pending.retain(|p| p.slot != slot);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Moves the clock forward and returns the slots that came due, earliest first.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<TimerSlot> {
        self.now_ms += dt_ms;
        let now = self.now_ms;
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.deadline_ms <= now {
                due.push(Pending { slot: p.slot, deadline_ms: p.deadline_ms });
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| p.deadline_ms);
        due.into_iter().map(|p| p.slot).collect()
    }
}

/// Turns per-frame deltas in seconds into whole milliseconds without drifting.
#[derive(Debug, Default)]
pub struct FrameClock {
    carry: f64,
}

impl FrameClock {
    pub fn tick(&mut self, dt_seconds: f32) -> u64 {
        let total = self.carry + f64::from(dt_seconds.max(0.0)) * 1000.0;
        let whole = total.floor();
        self.carry = total - whole;
        whole as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_exactly_at_deadline() {
        let mut timers = Timers::default();
        timers.schedule(TimerSlot::Media, 800);
        assert!(timers.advance(799).is_empty());
        assert_eq!(timers.advance(1), vec![TimerSlot::Media]);
        assert!(timers.is_empty());
    }

    #[test]
    fn same_slot_replaces_previous_timer() {
        let mut timers = Timers::default();
        timers.schedule(TimerSlot::Media, 100);
        timers.schedule(TimerSlot::Media, 500);
        assert_eq!(timers.len(), 1);
        assert!(timers.advance(200).is_empty());
        assert_eq!(timers.advance(300), vec![TimerSlot::Media]);
    }

    #[test]
    fn slots_are_independent_and_ordered() {
        let mut timers = Timers::default();
        timers.schedule(TimerSlot::SafetyNet, 7000);
        timers.schedule(TimerSlot::PageLoad, 1200);
        assert_eq!(timers.advance(10_000), vec![TimerSlot::PageLoad, TimerSlot::SafetyNet]);
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut timers = Timers::default();
        timers.advance(1000);
        timers.schedule(TimerSlot::Media, 300);
        assert!(timers.advance(299).is_empty());
        assert_eq!(timers.advance(1), vec![TimerSlot::Media]);
        assert_eq!(timers.now_ms(), 1300);
    }

    #[test]
    fn frame_clock_carries_fractions() {
        let mut clock = FrameClock::default();
        let total: u64 = (0..60).map(|_| clock.tick(1.0 / 60.0)).sum();
        assert!((999..=1000).contains(&total));
    }
}
