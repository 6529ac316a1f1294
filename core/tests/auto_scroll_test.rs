//! Auto-scroll after swaps

mod common;

use std::time::{Duration, Instant};

use sentinel_core::runtime::{Command, Completion};
use sentinel_core::{AutoScroll, MemoryPage, Page, RegionKey};

#[test]
fn swapped_log_region_lands_at_bottom() {
    let mut console = common::console();
    let start = Instant::now();
    console.poll_due(start);

    let request = console
        .poll_due(start + Duration::from_secs(2))
        .into_iter()
        .find_map(|c| match c {
            Command::Fetch(r) if r.ticket.region == RegionKey::Id("log-panel".into()) => Some(r),
            _ => None,
        })
        .expect("log panel poll");

    console.complete(Completion::Fetched {
        request,
        body: Ok(common::log_panel("log-panel", "every 2s", 55)),
    });

    let page = console.page();
    let panel = page.element_by_id("log-panel").unwrap();
    let pre = page.find_by_tag(panel, "pre").unwrap();
    assert_eq!(page.scroll_height(pre), 55);
    assert_eq!(page.scroll_top(pre), 55 - common::VIEWPORT);
}

#[test]
fn inner_swap_scrolls_region_inside_target() {
    let mut console = common::console();
    let commands = console.select_node("http://10.0.0.7:3001");
    let Some(Command::Fetch(stats)) = commands
        .into_iter()
        .find(|c| matches!(c, Command::Fetch(r) if r.ticket.region == RegionKey::Id("system-stats".into())))
    else {
        panic!("expected a stats fetch");
    };

    console.complete(Completion::Fetched {
        request: stats,
        body: Ok(format!("<h4>dmesg</h4><pre>{}</pre>", common::log_lines(12))),
    });

    let page = console.page();
    let view = page.element_by_id("system-stats").unwrap();
    let pre = page.find_by_tag(view, "pre").unwrap();
    assert_eq!(page.scroll_top(pre), 12 - common::VIEWPORT);
}

#[test]
fn content_without_log_region_is_left_alone() {
    let mut page = MemoryPage::from_markup(r#"<div id="stats"><span>cpu 3%</span></div>"#)
        .unwrap()
        .with_viewport(common::VIEWPORT);
    let root = page.element_by_id("stats").unwrap();

    assert!(!AutoScroll::default().after_swap(&mut page, root));
}

#[test]
fn scrolling_twice_is_stable() {
    let markup = format!("<pre>{}</pre>", common::log_lines(25));
    let mut page = MemoryPage::from_markup(&markup)
        .unwrap()
        .with_viewport(common::VIEWPORT);
    let root = page.root();
    let scroll = AutoScroll::default();

    assert!(scroll.after_swap(&mut page, root));
    let pre = page.find_by_tag(root, "pre").unwrap();
    let first = page.scroll_top(pre);
    assert!(scroll.after_swap(&mut page, root));
    assert_eq!(page.scroll_top(pre), first);
    assert_eq!(first, 15);
}

#[test]
fn short_log_stays_at_top() {
    let markup = format!("<pre>{}</pre>", common::log_lines(3));
    let mut page = MemoryPage::from_markup(&markup)
        .unwrap()
        .with_viewport(common::VIEWPORT);
    let root = page.root();

    AutoScroll::default().after_swap(&mut page, root);
    let pre = page.find_by_tag(root, "pre").unwrap();
    assert_eq!(page.scroll_top(pre), 0);
}

fn two_panels() -> sentinel_core::Console<MemoryPage, common::RecordingHost> {
    common::console_with(&format!(
        "<main>{}{}</main>",
        common::log_panel("panel-a", "every 2s", 30),
        common::log_panel("panel-b", "every 2s", 30)
    ))
}

fn resume_first_panel(
    console: &mut sentinel_core::Console<MemoryPage, common::RecordingHost>,
) -> sentinel_core::FetchRequest {
    let button = console.page().element_by_id("pause-btn").unwrap();
    console.on_click(button);
    match console.on_click(button).pop() {
        Some(Command::Fetch(request)) => request,
        other => panic!("expected a fetch, got {:?}", other),
    }
}

#[test]
fn text_only_replacement_scrolls_nothing_else() {
    let mut console = two_panels();
    let request = resume_first_panel(&mut console);

    console.complete(Completion::Fetched {
        request,
        body: Ok("log unavailable".to_string()),
    });

    let page = console.page();
    assert_eq!(page.element_by_id("panel-a"), None);
    let sibling = page.element_by_id("panel-b").unwrap();
    let pre = page.find_by_tag(sibling, "pre").unwrap();
    assert_eq!(page.scroll_top(pre), 0);
}

#[test]
fn log_region_in_a_later_root_is_scrolled() {
    let mut console = two_panels();
    let request = resume_first_panel(&mut console);

    console.complete(Completion::Fetched {
        request,
        body: Ok(format!(
            "<p>rotated</p>{}",
            common::log_panel("panel-a", "every 2s", 25)
        )),
    });

    let page = console.page();
    let panel = page.element_by_id("panel-a").unwrap();
    let pre = page.find_by_tag(panel, "pre").unwrap();
    assert_eq!(page.scroll_top(pre), 25 - common::VIEWPORT);

    let sibling = page.element_by_id("panel-b").unwrap();
    let other = page.find_by_tag(sibling, "pre").unwrap();
    assert_eq!(page.scroll_top(other), 0);
}
