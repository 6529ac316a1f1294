// Polling directives
//
// Interprets the refresh trigger declared on containers for hosts that have no
// fetch library of their own. Only the interval part drives polling; event
// names in the trigger are left to whoever raises them.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::config::PageContract;
use crate::page::Page;
use crate::refresh::{RefreshIntent, RegionKey};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trigger {
    pub interval: Option<Duration>,
    pub disabled: bool,
}

impl Trigger {
    /// Parse a trigger such as `every 5s, refresh` or `off`
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        if spec.eq_ignore_ascii_case("off") {
            return Self {
                interval: None,
                disabled: true,
            };
        }

        let interval = spec.split(',').find_map(|part| {
            let rest = part.trim().strip_prefix("every ")?;
            parse_interval(rest.split_whitespace().next()?)
        });
        Self {
            interval,
            disabled: false,
        }
    }

    /// Polling period, if this trigger polls at all
    pub fn period(&self) -> Option<Duration> {
        if self.disabled {
            None
        } else {
            self.interval.filter(|d| !d.is_zero())
        }
    }
}

fn parse_interval(value: &str) -> Option<Duration> {
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(s) = value.strip_suffix('s') {
        return s.parse::<f64>().ok().filter(|v| *v >= 0.0).map(Duration::from_secs_f64);
    }
    if let Some(m) = value.strip_suffix('m') {
        return m.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60));
    }
    // bare numbers are milliseconds
    value.parse::<u64>().ok().map(Duration::from_millis)
}

/// Tracks when each polling container last fired
#[derive(Debug, Default)]
pub struct Poller {
    last_fired: HashMap<RegionKey, Instant>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Containers whose interval elapsed at `now`. A container seen for the
    /// first time starts its interval at `now`; its initial content came with
    /// the page.
    pub fn due<P: Page + ?Sized>(
        &mut self,
        page: &P,
        contract: &PageContract,
        now: Instant,
    ) -> Vec<RefreshIntent> {
        let mut seen = HashSet::new();
        let mut due = Vec::new();

        for element in page.elements_with_attribute(&contract.trigger_attribute) {
            let Some(spec) = page.attribute(element, &contract.trigger_attribute) else {
                continue;
            };
            let Some(period) = Trigger::parse(&spec).period() else {
                continue;
            };
            let Some(url) = page.attribute(element, &contract.url_attribute) else {
                continue;
            };

            let region = RegionKey::of(page, element);
            seen.insert(region.clone());
            let last = *self.last_fired.entry(region.clone()).or_insert(now);
            if now.saturating_duration_since(last) < period {
                continue;
            }

            self.last_fired.insert(region.clone(), now);
            let swap = page
                .attribute(element, &contract.swap_attribute)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            trace!(target: "poller", region = %region, url = %url, "Poll due");
            due.push(RefreshIntent { region, url, swap });
        }

        self.last_fired.retain(|region, _| seen.contains(region));
        due
    }

    pub fn tracked(&self) -> usize {
        self.last_fired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_intervals_and_off() {
        assert_eq!(
            Trigger::parse("every 5s, refresh").period(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            Trigger::parse("load, every 500ms").period(),
            Some(Duration::from_millis(500))
        );
        assert_eq!(
            Trigger::parse("every 1.5s [document.hasFocus()]").period(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(Trigger::parse("every 2m").period(), Some(Duration::from_secs(120)));
        assert_eq!(Trigger::parse("refresh").period(), None);
        assert!(Trigger::parse(" OFF ").disabled);
        assert_eq!(Trigger::parse("off").period(), None);
    }
}
