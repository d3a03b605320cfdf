//! Shortlist ranking. Orders probe results by latency and diversifies the
//! top picks across transport protocols.

use std::collections::HashSet;

use crate::endpoint::Protocol;

use super::ProbeResult;

/// Build the final shortlist: fastest result per distinct protocol first,
/// then the next-fastest leftovers until `target` entries are collected.
/// Output keeps assembly order; there is no second global sort.
pub fn rank(mut results: Vec<ProbeResult>, target: usize) -> Vec<ProbeResult> {
    results.sort_by(|a, b| {
        a.latency_ms
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.latency_ms.unwrap_or(f64::INFINITY))
    });

    let mut selected = vec![false; results.len()];
    let mut order: Vec<usize> = Vec::with_capacity(target);

    // First pass: fastest entry for each protocol not seen yet
    let mut seen: HashSet<Protocol> = HashSet::new();
    for (i, result) in results.iter().enumerate() {
        if order.len() == target {
            break;
        }
        if seen.insert(result.endpoint.protocol) {
            selected[i] = true;
            order.push(i);
        }
    }

    // Fill pass: next-fastest leftovers regardless of protocol
    for i in 0..results.len() {
        if order.len() == target {
            break;
        }
        if !selected[i] {
            selected[i] = true;
            order.push(i);
        }
    }

    order.into_iter().map(|i| results[i].clone()).collect()
}
