// Node switching
//
// Owns the currently selected node address and fans a change out to the
// views scoped to it.

use tracing::{debug, info};

use crate::config::{Endpoints, PageContract};
use crate::page::{Page, SwapStyle};
use crate::refresh::{with_query, RefreshIntent, RegionKey};

#[derive(Debug, Default)]
pub struct NodeSelection {
    current: Option<String>,
}

impl NodeSelection {
    /// Start from whatever the server rendered into the current-node field
    pub fn from_page<P: Page + ?Sized>(page: &P, contract: &PageContract) -> Self {
        let current = page
            .element_by_id(&contract.current_node_field)
            .and_then(|field| page.value(field))
            .filter(|v| !v.is_empty());
        Self { current }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Record `address` and return the stats and process-table refreshes for
    /// it. A view missing from the page is skipped.
    pub fn select<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        contract: &PageContract,
        endpoints: &Endpoints,
        address: &str,
    ) -> Vec<RefreshIntent> {
        info!(target: "selection", node = %address, previous = ?self.current, "Switching node");
        self.current = Some(address.to_string());

        if let Some(field) = page.element_by_id(&contract.current_node_field) {
            page.set_value(field, address);
        }

        let mut intents = Vec::with_capacity(2);
        match page.element_by_id(&contract.stats_view_id) {
            Some(_) => intents.push(RefreshIntent {
                region: RegionKey::Id(contract.stats_view_id.clone()),
                url: with_query(&endpoints.stats_view, &endpoints.node_param, address),
                swap: SwapStyle::Inner,
            }),
            None => debug!(target: "selection", "No stats view on page"),
        }
        // outer swap: the table's own refresh url is node-scoped too
        match page.element_by_id(&contract.process_table_id) {
            Some(_) => intents.push(RefreshIntent {
                region: RegionKey::Id(contract.process_table_id.clone()),
                url: with_query(&endpoints.process_rows, &endpoints.node_param, address),
                swap: SwapStyle::Outer,
            }),
            None => debug!(target: "selection", "No process table on page"),
        }
        intents
    }
}
