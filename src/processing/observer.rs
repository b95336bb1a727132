//! Observer hooks for query and reduce runs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::types::Value;

/// Events emitted while a query or column reduction runs.
#[derive(Debug, Clone)]
pub enum QueryEvent {
    /// The select spec was resolved; `columns` are the destination names in output order.
    QueryStarted { columns: Vec<String> },
    /// A select entry matched no rule and was left out of the plan.
    ColumnIgnored { key: String },
    /// A group key was seen for the first time.
    GroupOpened { key: String },
    QueryFinished { stats: QueryStats },
    /// A reducer, predicate or key function failed; no table is produced.
    QueryFailed { message: String },
    ReduceStarted { column: String, op: String },
    ReduceFinished { result: Value },
}

/// Counters for one finished query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    /// Rows in the source table.
    pub input_rows: usize,
    /// Rows accepted by the `where` predicate.
    pub matched_rows: usize,
    /// Distinct groups (= output rows).
    pub groups: usize,
    pub elapsed: Duration,
}

impl fmt::Display for QueryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input_rows={}, matched_rows={}, groups={}, elapsed={:?}",
            self.input_rows, self.matched_rows, self.groups, self.elapsed
        )
    }
}

/// Observer hook for query events.
pub trait QueryObserver: Send + Sync {
    fn on_event(&self, event: &QueryEvent);
}

/// A simple stderr logger for query events.
#[derive(Debug, Default)]
pub struct StdErrQueryObserver;

impl QueryObserver for StdErrQueryObserver {
    fn on_event(&self, event: &QueryEvent) {
        eprintln!("[query] {event:?}");
    }
}

/// Forwards query events to the `log` facade.
///
/// Progress goes to `debug`/`trace`, ignored select entries and failures to `warn`.
#[derive(Debug, Default)]
pub struct LogQueryObserver;

impl QueryObserver for LogQueryObserver {
    fn on_event(&self, event: &QueryEvent) {
        match event {
            QueryEvent::QueryStarted { columns } => log::debug!("query started columns={columns:?}"),
            QueryEvent::ColumnIgnored { key } => log::warn!("select entry '{key}' ignored: unsupported shape"),
            QueryEvent::GroupOpened { key } => log::trace!("group opened key={key}"),
            QueryEvent::QueryFinished { stats } => log::debug!("query finished {stats}"),
            QueryEvent::QueryFailed { message } => log::warn!("query failed: {message}"),
            QueryEvent::ReduceStarted { column, op } => log::debug!("reduce started column={column} op={op}"),
            QueryEvent::ReduceFinished { result } => log::debug!("reduce finished result={result:?}"),
        }
    }
}

/// Fans events out to a list of observers.
#[derive(Default)]
pub struct CompositeQueryObserver {
    observers: Vec<Arc<dyn QueryObserver>>,
}

impl CompositeQueryObserver {
    pub fn new(observers: Vec<Arc<dyn QueryObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeQueryObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeQueryObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl QueryObserver for CompositeQueryObserver {
    fn on_event(&self, event: &QueryEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::{
        CompositeQueryObserver, LogQueryObserver, QueryEvent, QueryObserver, QueryStats, StdErrQueryObserver,
    };

    #[derive(Default)]
    struct Counter {
        seen: Mutex<usize>,
    }

    impl QueryObserver for Counter {
        fn on_event(&self, _event: &QueryEvent) {
            *self.seen.lock().unwrap() += 1;
        }
    }

    #[test]
    fn composite_fans_out_to_every_observer() {
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let observers: Vec<Arc<dyn QueryObserver>> = vec![
            a.clone(),
            b.clone(),
            Arc::new(LogQueryObserver),
            Arc::new(StdErrQueryObserver),
        ];
        let composite = CompositeQueryObserver::new(observers);

        composite.on_event(&QueryEvent::GroupOpened { key: "x".to_string() });
        composite.on_event(&QueryEvent::QueryFailed {
            message: "boom".to_string(),
        });

        assert_eq!(*a.seen.lock().unwrap(), 2);
        assert_eq!(*b.seen.lock().unwrap(), 2);
    }

    #[test]
    fn stats_display_lists_counters() {
        let stats = QueryStats {
            input_rows: 10,
            matched_rows: 4,
            groups: 2,
            elapsed: Duration::from_millis(3),
        };
        assert_eq!(stats.to_string(), "input_rows=10, matched_rows=4, groups=2, elapsed=3ms");
    }
}
