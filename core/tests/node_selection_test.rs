//! Node switching tests

mod common;

use std::time::{Duration, Instant};

use sentinel_core::runtime::{Command, Completion};
use sentinel_core::{FetchRequest, Page, RegionKey, StreamState, SwapStyle};

const REMOTE_NODE: &str = "http://10.0.0.7:3001";
const ENCODED_REMOTE: &str = "http%3A%2F%2F10.0.0.7%3A3001";

fn fetches(commands: Vec<Command>) -> Vec<FetchRequest> {
    commands
        .into_iter()
        .filter_map(|c| match c {
            Command::Fetch(r) => Some(r),
            _ => None,
        })
        .collect()
}

#[test]
fn selection_starts_from_rendered_node() {
    let console = common::console();
    assert_eq!(console.selected_node(), Some(common::LOCAL_NODE));
}

#[test]
fn switching_refreshes_stats_and_process_table() {
    let mut console = common::console();
    let requests = fetches(console.select_node(REMOTE_NODE));
    assert_eq!(requests.len(), 2);

    let stats = &requests[0];
    assert_eq!(stats.url, format!("/view/stats?node={}", ENCODED_REMOTE));
    assert_eq!(stats.swap, SwapStyle::Inner);
    assert_eq!(stats.ticket.region, RegionKey::Id("system-stats".into()));

    let rows = &requests[1];
    assert_eq!(rows.url, format!("/view/rows?node={}", ENCODED_REMOTE));
    assert_eq!(rows.swap, SwapStyle::Outer);
    assert_eq!(rows.ticket.region, RegionKey::Id("process-table".into()));

    let page = console.page();
    let field = page.element_by_id("current-node-input").unwrap();
    assert_eq!(page.value(field).as_deref(), Some(REMOTE_NODE));
    assert_eq!(console.selected_node(), Some(REMOTE_NODE));
}

#[test]
fn refreshed_views_are_swapped_in() {
    let mut console = common::console();
    let stats_view = console.page().element_by_id("system-stats").unwrap();
    let old_table = console.page().element_by_id("process-table").unwrap();

    for request in fetches(console.select_node(REMOTE_NODE)) {
        let body = match request.swap {
            SwapStyle::Inner => "<span>stats for remote</span>".to_string(),
            SwapStyle::Outer => common::process_table(ENCODED_REMOTE),
        };
        console.complete(Completion::Fetched {
            request,
            body: Ok(body),
        });
    }

    let page = console.page();
    assert_eq!(page.element_by_id("system-stats"), Some(stats_view));
    assert_eq!(page.text(stats_view), "stats for remote");

    let table = page.element_by_id("process-table").unwrap();
    assert_ne!(table, old_table);
    assert_eq!(
        page.attribute(table, "hx-get"),
        Some(format!("/view/rows?node={}", ENCODED_REMOTE))
    );
}

#[test]
fn later_polls_follow_the_new_node() {
    let mut console = common::console();
    for request in fetches(console.select_node(REMOTE_NODE)) {
        if request.swap == SwapStyle::Outer {
            console.complete(Completion::Fetched {
                request,
                body: Ok(common::process_table(ENCODED_REMOTE)),
            });
        }
    }

    let start = Instant::now();
    console.poll_due(start);
    let polls = fetches(console.poll_due(start + Duration::from_secs(5)));
    let table_poll = polls
        .iter()
        .find(|r| r.ticket.region == RegionKey::Id("process-table".into()))
        .expect("table poll");
    assert_eq!(table_poll.url, format!("/view/rows?node={}", ENCODED_REMOTE));
}

#[test]
fn late_response_for_previous_node_is_discarded() {
    let mut console = common::console();
    let first = fetches(console.select_node("http://10.0.0.8:3001"));
    let second = fetches(console.select_node(REMOTE_NODE));
    let stats_view = console.page().element_by_id("system-stats").unwrap();

    console.complete(Completion::Fetched {
        request: second[0].clone(),
        body: Ok("<span>stats for remote</span>".to_string()),
    });
    console.complete(Completion::Fetched {
        request: first[0].clone(),
        body: Ok("<span>stats for stale</span>".to_string()),
    });

    assert_eq!(console.page().text(stats_view), "stats for remote");
}

#[test]
fn missing_process_table_only_refreshes_stats() {
    let mut console = common::console_with(
        r#"<input type="hidden" id="current-node-input" value=""><div id="system-stats"></div>"#,
    );
    assert_eq!(console.selected_node(), None);

    let requests = fetches(console.select_node(REMOTE_NODE));
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].ticket.region, RegionKey::Id("system-stats".into()));
}

#[test]
fn switching_leaves_stream_state_alone() {
    let mut console = common::console();
    let panel = console.page().element_by_id("log-panel").unwrap();
    let button = console.page().element_by_id("pause-btn").unwrap();
    console.on_click(button);

    let requests = fetches(console.select_node(REMOTE_NODE));
    assert!(requests
        .iter()
        .all(|r| r.ticket.region != RegionKey::Id("log-panel".into())));
    assert_eq!(console.stream_state(panel), StreamState::Paused);
    assert_eq!(console.page().text(button), "RESUME");
}

#[test]
fn response_from_before_a_reload_is_discarded() {
    let mut console = common::console();
    let old = fetches(console.select_node("http://old:3001"));

    console.load_page(common::page());
    let new = fetches(console.select_node("http://new:3001"));
    let stats_view = console.page().element_by_id("system-stats").unwrap();

    console.complete(Completion::Fetched {
        request: old[0].clone(),
        body: Ok("<span>OLD NODE STATS</span>".to_string()),
    });
    assert_eq!(console.page().text(stats_view), "stats for local");

    console.complete(Completion::Fetched {
        request: new[0].clone(),
        body: Ok("<span>new node stats</span>".to_string()),
    });
    assert_eq!(console.page().text(stats_view), "new node stats");
}

#[test]
fn reload_before_any_new_request_still_drops_old_responses() {
    let mut console = common::console();
    let old = fetches(console.select_node(REMOTE_NODE));
    console.load_page(common::page());

    for request in old {
        console.complete(Completion::Fetched {
            request,
            body: Ok("<span>stale</span>".to_string()),
        });
    }
    let stats_view = console.page().element_by_id("system-stats").unwrap();
    assert_eq!(console.page().text(stats_view), "stats for local");
}
