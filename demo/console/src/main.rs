mod host;
mod input;

use std::sync::Arc;
use std::time::{Duration, Instant};

use host::TerminalHost;
use input::{FormField, Input, HELP};
use sentinel_core::console::DELETE_PROMPT;
use sentinel_core::{
    Console, ConsoleConfig, Fetcher, HttpFetcher, HttpNodeStore, Key, MemoryPage, NodeDraft, Page,
    PageContract, Runtime, StreamState, SubmitEvent, UiEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

type TerminalConsole = Console<MemoryPage, TerminalHost>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,sentinel_core=info,node_console=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = ConsoleConfig::from_env();
    info!(target: "node_console", master = %config.base_url, "Starting node console");

    let fetcher = Arc::new(HttpFetcher::new(config.clone()));
    let store = Arc::new(HttpNodeStore::new(config.clone()));
    let mut runtime = Runtime::new(fetcher.clone(), store);

    let page = load_dashboard(fetcher.as_ref(), &config).await?;
    let mut console = Console::new(page, TerminalHost::new(), &config);
    show(&console, &config.contract);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_millis(config.poll_tick_ms));
    let mut pending_delete: Option<String> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if let Some(id) = pending_delete.take() {
                    let yes = matches!(line.trim(), "y" | "Y" | "yes");
                    console.host_mut().answer_next(yes);
                    runtime.dispatch(console.delete_node(&id));
                    continue;
                }
                match input::parse(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Delete(id)) => {
                        println!("{} [y/N]", DELETE_PROMPT);
                        pending_delete = Some(id);
                    }
                    Ok(input) => apply(&mut console, &runtime, &config.contract, input),
                    Err(message) if message.is_empty() => {}
                    Err(message) => println!("{}", message),
                }
            }
            Some(completion) = runtime.next_completion() => {
                console.complete(completion);
                if console.host_mut().take_reload() {
                    match load_dashboard(fetcher.as_ref(), &config).await {
                        Ok(page) => {
                            console.load_page(page);
                            show(&console, &config.contract);
                        }
                        Err(e) => error!(target: "node_console", error = %e, "Reload failed"),
                    }
                }
            }
            _ = tick.tick() => {
                runtime.dispatch(console.poll_due(Instant::now()));
            }
        }
    }

    info!(target: "node_console", "Shutting down...");
    Ok(())
}

async fn load_dashboard(
    fetcher: &dyn Fetcher,
    config: &ConsoleConfig,
) -> sentinel_core::Result<MemoryPage> {
    let body = fetcher.fetch(&config.endpoints.dashboard).await?;
    Ok(MemoryPage::from_markup(&body)?.with_viewport(config.viewport_lines))
}

fn apply(
    console: &mut TerminalConsole,
    runtime: &Runtime,
    contract: &PageContract,
    input: Input,
) {
    match input {
        Input::Select(url) => runtime.dispatch(console.select_node(&url)),
        Input::Pause => {
            match console.page().element_by_id(&contract.pause_control_id) {
                Some(control) => runtime.dispatch(console.handle(UiEvent::Click(control))),
                None => println!("no log stream on this page"),
            }
        }
        Input::Add => {
            if console.open_node_modal(NodeDraft::add()).is_none() {
                println!("no node form on this page");
            }
        }
        Input::Edit(record) => {
            if console.open_node_modal(NodeDraft::edit(&record)).is_none() {
                println!("no node form on this page");
            }
        }
        Input::Set(field, value) => {
            let id = match field {
                FormField::Name => &contract.node_name_field,
                FormField::Url => &contract.node_url_field,
                FormField::Token => &contract.node_token_field,
            };
            match console.page().element_by_id(id) {
                Some(element) => console.page_mut().set_value(element, &value),
                None => warn!(target: "node_console", field = %id, "Form field not on page"),
            }
        }
        Input::Save => runtime.dispatch(console.save_node(&mut SubmitEvent::new())),
        Input::Close => console.close_node_modal(),
        Input::Escape => console.on_key(&Key::Escape),
        Input::Show => show(console, contract),
        Input::Logs(count) => print_logs(console, contract, count),
        Input::Help => println!("{}", HELP),
        Input::Delete(_) | Input::Quit => {}
    }
}

fn show(console: &TerminalConsole, contract: &PageContract) {
    let page = console.page();
    println!(
        "node: {}",
        console.selected_node().unwrap_or("(none selected)")
    );
    if let Some(stats) = page.element_by_id(&contract.stats_view_id) {
        println!("stats: {}", squash(&page.text(stats)));
    }
    if let Some(table) = page.element_by_id(&contract.process_table_id) {
        println!("processes: {}", squash(&page.text(table)));
    }
    if let Some(control) = page.element_by_id(&contract.pause_control_id) {
        let state = page
            .closest_with_attribute(control, &contract.trigger_attribute)
            .map(|container| console.stream_state(container))
            .unwrap_or_default();
        let label = match state {
            StreamState::Live => "live",
            StreamState::Paused => "paused",
            StreamState::Resuming => "loading",
        };
        println!("log stream: {} [{}]", label, page.text(control).trim());
    }
    println!("node form: {:?}", console.modal_visibility());
}

fn print_logs(console: &TerminalConsole, contract: &PageContract, count: usize) {
    let page = console.page();
    let Some(pre) = page.find_by_tag(page.root(), &contract.scroll_tag) else {
        println!("no log output on this page");
        return;
    };
    let text = page.text(pre);
    let lines: Vec<&str> = text.lines().collect();
    for line in &lines[lines.len().saturating_sub(count)..] {
        println!("{}", line);
    }
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
