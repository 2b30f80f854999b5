use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A participant's freeze state. Single-writer (the participant clears
/// its own `FrozenUntil`; only the dealer imposes freezes and clears
/// `FrozenUntilWoken`), multi-reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    Active,
    /// Self-clears once `Instant::now()` passes the deadline.
    FrozenUntil(Instant),
    /// Cleared only by the dealer, once the pending claim is adjudicated.
    FrozenUntilWoken,
}

impl FreezeState {
    pub fn until(millis: u64) -> Self {
        Self::FrozenUntil(Instant::now() + Duration::from_millis(millis))
    }

    /// Ticks the freeze clock. Returns the (possibly unchanged) new state.
    /// `FrozenUntilWoken` never self-clears here — only the dealer's wake
    /// call transitions it back to `Active`.
    pub fn tick(self) -> Self {
        match self {
            Self::FrozenUntil(deadline) if Instant::now() >= deadline => Self::Active,
            other => other,
        }
    }

    pub fn is_frozen(self) -> bool {
        !matches!(self.tick(), Self::Active)
    }

    /// Milliseconds remaining, for display purposes. `0` once expired or
    /// not frozen, since the dealer hasn't necessarily woken the
    /// participant to publish the transition yet.
    pub fn remaining_millis(self) -> u64 {
        match self {
            Self::FrozenUntil(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .as_millis() as u64,
            Self::FrozenUntilWoken | Self::Active => 0,
        }
    }
}

/// A participant's freeze state plus the condition variable the dealer
/// and the participant's own tick loop use to avoid busy-polling.
///
/// This replaces the source's combination of a shared mutable flag and a
/// 10ms polling loop with the redesign spec.md §9 recommends: a
/// per-participant condition variable, woken precisely when the dealer
/// rewards, penalizes, or invalidates a claim, with the tick duration
/// used only as the max wait so a self-clearing `FrozenUntil` deadline is
/// still observed promptly.
#[derive(Debug)]
pub struct FreezeCell {
    state: Mutex<FreezeState>,
    condvar: Condvar,
}

impl Default for FreezeCell {
    fn default() -> Self {
        Self {
            state: Mutex::new(FreezeState::Active),
            condvar: Condvar::new(),
        }
    }
}

impl FreezeCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set by the dealer only: impose or clear a freeze and wake whoever
    /// is waiting on it.
    pub fn set(&self, new: FreezeState) {
        *self.state.lock() = new;
        self.condvar.notify_all();
    }

    /// Current state, with a self-clearing `FrozenUntil` ticked first.
    pub fn get(&self) -> FreezeState {
        let mut guard = self.state.lock();
        tick_locked(&mut guard)
    }

    /// Blocks for up to `tick` waiting for a dealer-driven wake, then
    /// re-evaluates self-clearing deadlines. Spurious wakes (a dealer
    /// notification for a *different* transition, or none at all) are
    /// harmless: the caller just re-checks the returned state.
    pub fn wait_tick(&self, tick: Duration) -> FreezeState {
        let mut guard = self.state.lock();
        if matches!(*guard, FreezeState::Active) {
            return *guard;
        }
        let _ = self.condvar.wait_for(&mut guard, tick);
        tick_locked(&mut guard)
    }
}

fn tick_locked(guard: &mut MutexGuard<'_, FreezeState>) -> FreezeState {
    **guard = guard.tick();
    **guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_until_self_clears() {
        let f = FreezeState::until(0);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(f.tick(), FreezeState::Active);
    }

    #[test]
    fn frozen_until_woken_never_self_clears() {
        let f = FreezeState::FrozenUntilWoken;
        assert_eq!(f.tick(), FreezeState::FrozenUntilWoken);
        assert!(f.is_frozen());
    }

    #[test]
    fn active_is_not_frozen() {
        assert!(!FreezeState::Active.is_frozen());
    }

    #[test]
    fn cell_wakes_on_set() {
        let cell = std::sync::Arc::new(FreezeCell::new());
        cell.set(FreezeState::FrozenUntilWoken);
        let c2 = cell.clone();
        let handle = std::thread::spawn(move || c2.wait_tick(Duration::from_secs(5)));
        std::thread::sleep(Duration::from_millis(10));
        cell.set(FreezeState::Active);
        assert_eq!(handle.join().unwrap(), FreezeState::Active);
    }

    #[test]
    fn cell_wait_tick_times_out_and_self_clears() {
        let cell = FreezeCell::new();
        cell.set(FreezeState::until(5));
        let got = cell.wait_tick(Duration::from_millis(50));
        assert_eq!(got, FreezeState::Active);
    }
}
