//! Per-collection request counters, exposed in Prometheus text format.

use crate::types::{CallMethod, Collection};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Metrics {
    // One slot per Collection::ALL entry, per dispatch method.
    queries: [AtomicU64; Collection::ALL.len()],
    gets: [AtomicU64; Collection::ALL.len()],
    streams: [AtomicU64; Collection::ALL.len()],
    pub rpc_calls: AtomicU64,
    pub upstream_errors: AtomicU64,
    pub tree_misses: AtomicU64,
}

pub static METRICS: once_cell::sync::Lazy<&'static Metrics> =
    once_cell::sync::Lazy::new(|| Box::leak(Box::new(Metrics::default())));

fn slot(collection: Collection) -> usize {
    Collection::ALL
        .iter()
        .position(|c| *c == collection)
        .unwrap_or(0)
}

impl Metrics {
    pub fn record_call(&self, collection: Collection, method: CallMethod) {
        let counters = match method {
            CallMethod::Query => &self.queries,
            CallMethod::Get => &self.gets,
            CallMethod::Stream => &self.streams,
        };
        counters[slot(collection)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn calls(&self, collection: Collection, method: CallMethod) -> u64 {
        let counters = match method {
            CallMethod::Query => &self.queries,
            CallMethod::Get => &self.gets,
            CallMethod::Stream => &self.streams,
        };
        counters[slot(collection)].load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let mut s = String::with_capacity(2048);
        s.push_str("# HELP genogate_requests_total Backend calls by collection and method\n");
        s.push_str("# TYPE genogate_requests_total counter\n");
        for (i, collection) in Collection::ALL.iter().enumerate() {
            for (method, counters) in [
                ("query", &self.queries),
                ("get", &self.gets),
                ("stream", &self.streams),
            ] {
                s.push_str(&format!(
                    "genogate_requests_total{{collection=\"{}\",method=\"{}\"}} {}\n",
                    collection.as_str(),
                    method,
                    counters[i].load(Ordering::Relaxed)
                ));
            }
        }
        let g = |name: &str, help: &str, val: u64| -> String {
            format!("# HELP {0} {1}\n# TYPE {0} counter\n{0} {2}\n", name, help, val)
        };
        s.push_str(&g(
            "genogate_rpc_calls_total",
            "JSON-RPC method invocations",
            self.rpc_calls.load(Ordering::Relaxed),
        ));
        s.push_str(&g(
            "genogate_upstream_errors_total",
            "Failed backend calls",
            self.upstream_errors.load(Ordering::Relaxed),
        ));
        s.push_str(&g(
            "genogate_tree_misses_total",
            "Taxonomy tree lookups with no file",
            self.tree_misses.load(Ordering::Relaxed),
        ));
        s
    }
}
