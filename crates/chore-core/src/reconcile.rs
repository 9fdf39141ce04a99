//! Event-to-interval reconciliation.
//!
//! Turns an ordered perception history into the completed intervals that
//! measure how long a task takes to come due again.
//!
//! # Algorithm Summary
//!
//! A single left-to-right pass carrying the last accepted perception:
//!
//! | last accepted | current     | emit interval | advance |
//! |---------------|-------------|---------------|---------|
//! | (none)        | any         | no            | yes     |
//! | Execution     | Execution   | yes           | yes     |
//! | Execution     | Observation | yes           | yes     |
//! | Observation   | Execution   | no            | yes     |
//! | Observation   | Observation | no            | no      |
//!
//! A run of observations collapses to its first entry, so a later execution
//! or interval is anchored on the first time the need was noticed.

use crate::interval::{CompletedInterval, IntervalError};
use crate::perception::{Perception, PerceptionKind};

/// Incremental reconciliation state.
///
/// [`reconcile`] drives this over a full history; it is exposed so callers can
/// inspect which perception the next pairing would be anchored on.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    last_accepted: Option<Perception>,
}

impl Reconciler {
    pub const fn new() -> Self {
        Self {
            last_accepted: None,
        }
    }

    /// The perception the next event will be paired against, if any.
    pub const fn last_accepted(&self) -> Option<&Perception> {
        self.last_accepted.as_ref()
    }

    /// Feeds one perception, returning the interval it completes, if any.
    ///
    /// Fails only when the pairing would produce an invalid interval: an
    /// inverted one, which can happen when the input is not in timestamp
    /// order, or one too long for its duration to fit in an `i64`.
    pub fn step(
        &mut self,
        current: Perception,
    ) -> Result<Option<CompletedInterval>, IntervalError> {
        let Some(last) = self.last_accepted else {
            tracing::trace!(
                kind = %current.kind,
                ts = current.timestamp,
                "first perception accepted"
            );
            self.last_accepted = Some(current);
            return Ok(None);
        };

        let emitted = match (last.kind, current.kind) {
            // Did it, then did it again / did it, then noticed it again.
            (PerceptionKind::Execution, _) => {
                Some(CompletedInterval::new(last.timestamp, current.timestamp)?)
            }
            // Noticed it, then did it: restart the chain at the execution.
            (PerceptionKind::Observation, PerceptionKind::Execution) => None,
            // Still needs doing: keep the earliest observation of the run.
            (PerceptionKind::Observation, PerceptionKind::Observation) => {
                tracing::trace!(
                    anchor = last.timestamp,
                    ts = current.timestamp,
                    "repeated observation collapsed"
                );
                return Ok(None);
            }
        };

        tracing::trace!(
            previous = %last.kind,
            current = %current.kind,
            emitted = emitted.is_some(),
            "perception accepted"
        );
        self.last_accepted = Some(current);
        Ok(emitted)
    }
}

/// Reconciles a full perception history into completed intervals.
///
/// Pure function of its input: the result is recomputed from scratch on every
/// call. An empty history yields no intervals.
pub fn reconcile(perceptions: &[Perception]) -> Result<Vec<CompletedInterval>, IntervalError> {
    let mut reconciler = Reconciler::new();
    let mut intervals = Vec::new();
    for perception in perceptions {
        if let Some(interval) = reconciler.step(*perception)? {
            intervals.push(interval);
        }
    }
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(ts: i64) -> Perception {
        Perception::observation(ts)
    }

    fn exec(ts: i64) -> Perception {
        Perception::execution(ts)
    }

    fn spans(intervals: &[CompletedInterval]) -> Vec<(i64, i64)> {
        intervals.iter().map(|i| (i.start(), i.end())).collect()
    }

    #[test]
    fn empty_history_yields_no_intervals() {
        assert!(reconcile(&[]).unwrap().is_empty());
    }

    #[test]
    fn single_perception_yields_no_intervals() {
        assert!(reconcile(&[exec(5)]).unwrap().is_empty());
        assert!(reconcile(&[obs(5)]).unwrap().is_empty());
    }

    #[test]
    fn execution_then_observation_is_an_interval() {
        let intervals = reconcile(&[exec(100), obs(150)]).unwrap();
        assert_eq!(spans(&intervals), vec![(100, 150)]);
    }

    #[test]
    fn consecutive_executions_form_one_interval() {
        let intervals = reconcile(&[exec(10), exec(25)]).unwrap();
        assert_eq!(spans(&intervals), vec![(10, 25)]);
    }

    #[test]
    fn observation_then_execution_is_not_an_interval() {
        let intervals = reconcile(&[obs(10), obs(20), exec(30)]).unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn observation_only_history_yields_no_intervals() {
        let history: Vec<Perception> = (0..6).map(|i| obs(i * 10)).collect();
        assert!(reconcile(&history).unwrap().is_empty());
    }

    #[test]
    fn observation_run_collapses_to_first() {
        let mut reconciler = Reconciler::new();
        for ts in [10, 20, 30] {
            assert_eq!(reconciler.step(obs(ts)).unwrap(), None);
        }
        assert_eq!(reconciler.last_accepted(), Some(&obs(10)));
    }

    #[test]
    fn execution_after_observation_run_becomes_anchor() {
        for k in 1..=4 {
            let mut history: Vec<Perception> = (0..k).map(|i| obs(i * 10)).collect();
            history.push(exec(100));
            history.push(obs(160));

            let intervals = reconcile(&history).unwrap();
            assert_eq!(spans(&intervals), vec![(100, 160)], "k = {k}");
        }
    }

    #[test]
    fn mixed_history() {
        let intervals = reconcile(&[exec(0), exec(100), obs(130)]).unwrap();
        assert_eq!(spans(&intervals), vec![(0, 100), (100, 130)]);
    }

    #[test]
    fn long_history_in_emission_order() {
        let history = [
            obs(0),
            exec(10),
            obs(40),
            obs(45),
            exec(50),
            exec(70),
            obs(95),
        ];
        let intervals = reconcile(&history).unwrap();
        assert_eq!(spans(&intervals), vec![(10, 40), (50, 70), (70, 95)]);
    }

    #[test]
    fn out_of_order_history_reports_inversion() {
        let err = reconcile(&[exec(200), obs(100)]).unwrap_err();
        assert_eq!(
            err,
            IntervalError::Inverted {
                start: 200,
                end: 100
            }
        );
    }

    #[test]
    fn out_of_order_pair_that_emits_nothing_is_tolerated() {
        let intervals = reconcile(&[obs(200), exec(100)]).unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn reconcile_is_repeatable() {
        let history = [exec(0), obs(30), exec(40), exec(90)];
        assert_eq!(reconcile(&history).unwrap(), reconcile(&history).unwrap());
    }
}
