//! Collects the statsd lines the server under test sends.

use cadence::{SpyMetricSink, StatsdClient};
use crossbeam_channel::Receiver;
use statsd_parser::{Message, Metric};

/// Receives every metric a [`StatsdClient`] sends, so tests can look for
/// the ones they expect.
///
/// ```
/// # use colabora_integration_tests::MetricsWatcher;
/// # use cadence::CountedExt;
/// let (mut metrics_watcher, metrics_client) = MetricsWatcher::new_with_client();
/// metrics_client.incr("login.granted").unwrap();
/// assert!(metrics_watcher.has_incr("login.granted"));
/// assert_eq!(metrics_watcher.counter_total("login.granted"), 1.0);
/// ```
pub struct MetricsWatcher {
    /// Raw lines from the spy sink, not yet parsed.
    rx: Receiver<Vec<u8>>,

    /// Every metric parsed so far, in the order it was sent.
    seen: Vec<Message>,
}

impl MetricsWatcher {
    /// Make a watcher, and the client whose metrics it will see.
    ///
    /// The client has no prefix, so names match exactly what the server passes
    /// to `incr`, `histogram` and friends.
    pub fn new_with_client() -> (Self, StatsdClient) {
        let (rx, sink) = SpyMetricSink::new();
        let watcher = Self {
            rx,
            seen: Vec::new(),
        };
        (watcher, StatsdClient::from_sink("", sink))
    }

    /// Every metric received so far. Useful in assertion messages.
    pub fn all_messages(&mut self) -> &[Message] {
        for line in self.rx.try_iter() {
            let line = String::from_utf8(line).expect("metric line was not UTF-8");
            let message = statsd_parser::parse(line).expect("metric line did not parse");
            self.seen.push(message);
        }
        &self.seen
    }

    /// Whether any metric received so far satisfies `predicate`.
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&Message) -> bool,
    {
        self.all_messages().iter().any(predicate)
    }

    /// Whether the counter `name` was incremented at least once.
    pub fn has_incr(&mut self, name: &str) -> bool {
        self.has(|message| message.name == name && matches!(message.metric, Metric::Counter(_)))
    }

    /// The sum of every increment of the counter `name`.
    pub fn counter_total(&mut self, name: &str) -> f64 {
        self.all_messages()
            .iter()
            .filter(|message| message.name == name)
            .filter_map(|message| match &message.metric {
                Metric::Counter(counter) => Some(counter.value),
                _ => None,
            })
            .sum()
    }

    /// Whether the histogram `name` recorded `expected_value`, give or take
    /// 0.0001.
    pub fn has_histogram(&mut self, name: &str, expected_value: f64) -> bool {
        self.has(|message| match &message.metric {
            Metric::Histogram(histogram) if message.name == name => {
                (histogram.value - expected_value).abs() <= 0.0001
            }
            _ => false,
        })
    }
}
