// Refresh requests and the stale-response guard
//
// Every fetch that ends in a swap carries a ticket. Issuing a new fetch for a
// region (or invalidating it) makes every older ticket for that region stale,
// so a late response can never overwrite newer content.

use std::collections::HashMap;
use std::fmt;

use crate::page::{ElementHandle, Page, SwapStyle};

/// Identity of a refresh target that survives outer swaps when the element has
/// an id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionKey {
    Id(String),
    Element(ElementHandle),
}

impl RegionKey {
    pub fn of<P: Page + ?Sized>(page: &P, element: ElementHandle) -> Self {
        page.attribute(element, "id")
            .filter(|id| !id.is_empty())
            .map(RegionKey::Id)
            .unwrap_or(RegionKey::Element(element))
    }

    /// Element currently standing for this region
    pub fn resolve<P: Page + ?Sized>(&self, page: &P) -> Option<ElementHandle> {
        match self {
            RegionKey::Id(id) => page.element_by_id(id),
            RegionKey::Element(h) => page.is_attached(*h).then_some(*h),
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKey::Id(id) => write!(f, "#{}", id),
            RegionKey::Element(h) => write!(f, "element{}", h),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub region: RegionKey,
    pub seq: u64,
}

/// A refresh some component wants, before it is ticketed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshIntent {
    pub region: RegionKey,
    pub url: String,
    pub swap: SwapStyle,
}

/// A ticketed GET whose body replaces the region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub url: String,
    pub swap: SwapStyle,
}

/// Latest sequence number per region
#[derive(Debug, Default)]
pub struct RequestLedger {
    latest: HashMap<RegionKey, u64>,
    next_seq: u64,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, intent: RefreshIntent) -> FetchRequest {
        let seq = self.bump(&intent.region);
        FetchRequest {
            ticket: Ticket {
                region: intent.region,
                seq,
            },
            url: intent.url,
            swap: intent.swap,
        }
    }

    /// Make every outstanding ticket for `region` stale
    pub fn invalidate(&mut self, region: &RegionKey) {
        self.bump(region);
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.region) == Some(&ticket.seq)
    }

    /// Drop every region after a page reload. The sequence keeps counting, so
    /// tickets issued for the previous page never match a new one.
    pub fn reset(&mut self) {
        self.latest.clear();
    }

    pub fn forget(&mut self, region: &RegionKey) {
        self.latest.remove(region);
    }

    pub fn outstanding_regions(&self) -> usize {
        self.latest.len()
    }

    fn bump(&mut self, region: &RegionKey) -> u64 {
        self.next_seq += 1;
        self.latest.insert(region.clone(), self.next_seq);
        self.next_seq
    }
}

/// Append `param=value` to `path`, encoding the value as a URI component
pub fn with_query(path: &str, param: &str, value: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        path,
        separator,
        urlencoding::encode(param),
        urlencoding::encode(value)
    )
}

/// Append `segment` to `path` as one encoded path segment
pub fn with_segment(path: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        path.trim_end_matches('/'),
        urlencoding::encode(segment)
    )
}

// Module for URL encoding
mod urlencoding {
    pub fn encode(s: &str) -> String {
        s.bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                _ => format!("%{:02X}", b),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(id: &str) -> RefreshIntent {
        RefreshIntent {
            region: RegionKey::Id(id.to_string()),
            url: format!("/view/{}", id),
            swap: SwapStyle::Inner,
        }
    }

    #[test]
    fn newer_ticket_supersedes_older_for_same_region_only() {
        let mut ledger = RequestLedger::new();
        let first = ledger.issue(intent("stats"));
        let other = ledger.issue(intent("table"));
        let second = ledger.issue(intent("stats"));

        assert!(!ledger.is_current(&first.ticket));
        assert!(ledger.is_current(&second.ticket));
        assert!(ledger.is_current(&other.ticket));
        assert!(second.ticket.seq > first.ticket.seq);
    }

    #[test]
    fn invalidate_makes_outstanding_ticket_stale() {
        let mut ledger = RequestLedger::new();
        let request = ledger.issue(intent("log"));
        ledger.invalidate(&request.ticket.region);
        assert!(!ledger.is_current(&request.ticket));

        ledger.forget(&request.ticket.region);
        assert_eq!(ledger.outstanding_regions(), 0);
    }

    #[test]
    fn tickets_from_before_a_reset_never_match() {
        let mut ledger = RequestLedger::new();
        let before = ledger.issue(intent("stats"));
        ledger.reset();
        assert_eq!(ledger.outstanding_regions(), 0);
        assert!(!ledger.is_current(&before.ticket));

        let after = ledger.issue(intent("stats"));
        assert!(after.ticket.seq > before.ticket.seq);
        assert!(!ledger.is_current(&before.ticket));
        assert!(ledger.is_current(&after.ticket));
    }

    #[test]
    fn query_values_are_component_encoded() {
        assert_eq!(
            with_query("/view/rows", "node", "http://10.0.0.5:3001/a b"),
            "/view/rows?node=http%3A%2F%2F10.0.0.5%3A3001%2Fa%20b"
        );
        assert_eq!(with_query("/logs/read?path=x", "node", "n"), "/logs/read?path=x&node=n");
        assert_eq!(with_segment("/api/nodes/delete/", "a/b"), "/api/nodes/delete/a%2Fb");
    }
}
