// Shared fixtures: a dashboard page as the server renders it and a host that
// records prompts and reloads.
#![allow(dead_code)]

use sentinel_core::{Console, ConsoleConfig, Host, MemoryPage};

pub const LOCAL_NODE: &str = "http://127.0.0.1:3001";
pub const VIEWPORT: u32 = 10;

pub fn log_lines(count: usize) -> String {
    (1..=count).map(|i| format!("line {}\n", i)).collect()
}

/// Log panel as the log endpoint renders it
pub fn log_panel(id: &str, trigger: &str, lines: usize) -> String {
    format!(
        r#"<div id="{id}" hx-get="/logs/read?path=/var/log/app.log" hx-trigger="{trigger}" hx-swap="outerHTML">
  <div class="flex">
    <span class="live-badge animate-pulse text-green-500">LIVE</span>
    <button id="pause-btn" class="px-2 border border-gray-600">PAUSE</button>
  </div>
  <pre class="h-96 overflow-y-auto">{lines}</pre>
</div>"#,
        id = id,
        trigger = trigger,
        lines = log_lines(lines)
    )
}

pub fn process_table(node: &str) -> String {
    format!(
        r#"<table id="process-table" hx-get="/view/rows?node={node}" hx-trigger="every 5s, refresh" hx-swap="outerHTML"><tbody><tr><td>1234</td><td>nginx</td></tr></tbody></table>"#,
        node = node
    )
}

pub fn dashboard() -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
<input type="hidden" id="current-node-input" value="{node}">
<div id="system-stats"><span>stats for local</span></div>
{table}
{panel}
<div id="modal-container"><div class="inspector">app.log</div></div>
<div id="node-modal" class="fixed inset-0 hidden">
  <h3 id="node-modal-title">Node</h3>
  <form>
    <input id="node-id" type="hidden">
    <input id="node-name" type="text">
    <input id="node-url" type="text">
    <input id="node-token" type="password">
  </form>
</div>
</body></html>"#,
        node = LOCAL_NODE,
        table = process_table("http%3A%2F%2F127.0.0.1%3A3001"),
        panel = log_panel("log-panel", "every 2s", 30),
    )
}

pub fn page() -> MemoryPage {
    MemoryPage::from_markup(&dashboard())
        .expect("fixture parses")
        .with_viewport(VIEWPORT)
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub answer: bool,
    pub prompts: Vec<String>,
    pub reloads: usize,
}

impl RecordingHost {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Default::default()
        }
    }
}

impl Host for RecordingHost {
    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answer
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }
}

pub fn console() -> Console<MemoryPage, RecordingHost> {
    Console::new(page(), RecordingHost::answering(true), &ConsoleConfig::default())
}

pub fn console_with(markup: &str) -> Console<MemoryPage, RecordingHost> {
    let page = MemoryPage::from_markup(markup)
        .expect("fixture parses")
        .with_viewport(VIEWPORT);
    Console::new(page, RecordingHost::answering(true), &ConsoleConfig::default())
}
