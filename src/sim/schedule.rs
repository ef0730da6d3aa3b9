//! Deferred match timers
//!
//! Timers are plain data owned by the match and polled each playing tick. They
//! are never cancelled; instead each carries the match generation it was
//! scheduled under and is dropped when it falls due in a later generation.

use serde::{Deserialize, Serialize};

use super::state::MatchState;
use super::spawn;

/// What to do when a timer falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Hide the boss warning banner
    EndBossWarning,
    /// Materialise the boss at an arena edge
    SpawnBoss,
}

/// A pending timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub due_ms: f64,
    pub generation: u32,
    pub action: ScheduledAction,
}

/// Pending timers in scheduling order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    events: Vec<ScheduledEvent>,
}

impl Schedule {
    pub fn push(&mut self, event: ScheduledEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return every event due at `now_ms`, earliest first.
    ///
    /// Events due at the same time keep their scheduling order.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<ScheduledEvent> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.events.drain(..).partition(|e| e.due_ms <= now_ms);
        self.events = pending;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due
    }
}

/// Fire every due timer belonging to the current generation
pub fn run_due(state: &mut MatchState) {
    let due = state.scheduled.take_due(state.clock_ms);
    for event in due {
        if event.generation != state.generation {
            log::warn!(
                "Discarding stale {:?} from generation {} (current {})",
                event.action,
                event.generation,
                state.generation
            );
            continue;
        }
        match event.action {
            ScheduledAction::EndBossWarning => state.boss_warning = false,
            ScheduledAction::SpawnBoss => spawn::spawn_boss(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Phase;

    #[test]
    fn test_take_due_orders_by_time() {
        let mut schedule = Schedule::default();
        let at = |due_ms, action| ScheduledEvent {
            due_ms,
            generation: 0,
            action,
        };
        schedule.push(at(3000.0, ScheduledAction::EndBossWarning));
        schedule.push(at(2000.0, ScheduledAction::SpawnBoss));
        schedule.push(at(9000.0, ScheduledAction::SpawnBoss));

        assert!(schedule.take_due(1999.0).is_empty());
        let due = schedule.take_due(5000.0);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].action, ScheduledAction::SpawnBoss);
        assert_eq!(due[1].action, ScheduledAction::EndBossWarning);
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_boss_warning_sequence() {
        let mut state = MatchState::new(8);
        state.phase = Phase::Playing;
        state.boss_warning = true;
        state.schedule(ScheduledAction::EndBossWarning, 3000.0);
        state.schedule(ScheduledAction::SpawnBoss, 2000.0);

        state.clock_ms = 2000.0;
        run_due(&mut state);
        assert_eq!(state.bosses.len(), 1);
        assert!(state.boss_warning);

        state.clock_ms = 3000.0;
        run_due(&mut state);
        assert!(!state.boss_warning);
        assert!(state.scheduled.is_empty());
    }

    #[test]
    fn test_stale_generation_discarded() {
        let mut state = MatchState::new(8);
        state.schedule(ScheduledAction::SpawnBoss, 2000.0);
        state.restart();
        assert_eq!(state.scheduled.len(), 1);

        state.clock_ms = 5000.0;
        run_due(&mut state);
        assert!(state.bosses.is_empty());
        assert!(state.scheduled.is_empty());
    }
}
