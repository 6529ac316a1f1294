// Console controller
//
// One object owns the page and every component. Hosts wire their events to
// the named methods (or to `handle`), execute the returned commands, and feed
// completions back through `complete`.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{ConsoleConfig, Endpoints, PageContract};
use crate::host::Host;
use crate::modal::{self, ModalVisibility, NodeDraft, NodeModal};
use crate::node::IdGenerator;
use crate::page::{ElementHandle, Page, SwapStyle};
use crate::poller::Poller;
use crate::refresh::{FetchRequest, RefreshIntent, RegionKey, RequestLedger};
use crate::runtime::{Command, Completion, PersistOp};
use crate::scroll::AutoScroll;
use crate::selection::NodeSelection;
use crate::stream::{StreamControl, StreamState, StreamTransition};
use crate::Result;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this node?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

/// Submission of the node form
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// User-facing events a host forwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click(ElementHandle),
    Key(Key),
    SelectNode(String),
    OpenNodeModal(NodeDraft),
    CloseNodeModal,
    SubmitNodeForm,
    DeleteNode(String),
}

pub struct Console<P: Page, H: Host> {
    page: P,
    host: H,
    contract: PageContract,
    endpoints: Endpoints,
    streams: StreamControl,
    scroll: AutoScroll,
    selection: NodeSelection,
    modal: NodeModal,
    ledger: RequestLedger,
    poller: Poller,
}

impl<P: Page, H: Host> Console<P, H> {
    pub fn new(page: P, host: H, config: &ConsoleConfig) -> Self {
        Self::with_id_generator(page, host, config, IdGenerator::new())
    }

    pub fn with_id_generator(page: P, host: H, config: &ConsoleConfig, ids: IdGenerator) -> Self {
        let selection = NodeSelection::from_page(&page, &config.contract);
        Self {
            page,
            host,
            contract: config.contract.clone(),
            endpoints: config.endpoints.clone(),
            streams: StreamControl::new(),
            scroll: AutoScroll::new(config.contract.scroll_tag.clone()),
            selection,
            modal: NodeModal::new(ids),
            ledger: RequestLedger::new(),
            poller: Poller::new(),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selection.current()
    }

    pub fn stream_state(&self, container: ElementHandle) -> StreamState {
        self.streams.state_of(&self.page, &self.contract, container)
    }

    pub fn modal_visibility(&self) -> ModalVisibility {
        self.modal.visibility()
    }

    /// Replace the page after a reload; per-page state starts over
    pub fn load_page(&mut self, page: P) {
        info!(target: "console", "Page loaded");
        self.page = page;
        self.streams = StreamControl::new();
        self.ledger.reset();
        self.poller = Poller::new();
        self.selection = NodeSelection::from_page(&self.page, &self.contract);
        self.modal.close(&mut self.page, &self.contract);
    }

    /// Dispatch one user event to its entry point
    pub fn handle(&mut self, event: UiEvent) -> Vec<Command> {
        match event {
            UiEvent::Click(target) => self.on_click(target),
            UiEvent::Key(key) => {
                self.on_key(&key);
                Vec::new()
            }
            UiEvent::SelectNode(address) => self.select_node(&address),
            UiEvent::OpenNodeModal(draft) => {
                self.open_node_modal(draft);
                Vec::new()
            }
            UiEvent::CloseNodeModal => {
                self.close_node_modal();
                Vec::new()
            }
            UiEvent::SubmitNodeForm => self.save_node(&mut SubmitEvent::new()),
            UiEvent::DeleteNode(id) => self.delete_node(&id),
        }
    }

    pub fn on_click(&mut self, target: ElementHandle) -> Vec<Command> {
        let is_pause_control = self
            .page
            .attribute(target, "id")
            .is_some_and(|id| id == self.contract.pause_control_id);
        if is_pause_control {
            self.toggle_stream(target)
        } else {
            Vec::new()
        }
    }

    /// Escape closes the log inspector and the node modal, whichever is open
    pub fn on_key(&mut self, key: &Key) {
        if *key == Key::Escape {
            modal::close_inspector(&mut self.page, &self.contract);
            self.modal.close(&mut self.page, &self.contract);
        }
    }

    pub fn toggle_stream(&mut self, control: ElementHandle) -> Vec<Command> {
        match self.streams.toggle(&mut self.page, &self.contract, control) {
            Some(StreamTransition::Paused { container }) => {
                // a poll already in flight must not bring the stream back
                let region = RegionKey::of(&self.page, container);
                self.ledger.invalidate(&region);
                Vec::new()
            }
            Some(StreamTransition::Resume { container, url }) => {
                let region = RegionKey::of(&self.page, container);
                vec![self.issue(RefreshIntent {
                    region,
                    url,
                    swap: SwapStyle::Outer,
                })]
            }
            None => Vec::new(),
        }
    }

    pub fn select_node(&mut self, address: &str) -> Vec<Command> {
        let intents = self
            .selection
            .select(&mut self.page, &self.contract, &self.endpoints, address);
        intents.into_iter().map(|i| self.issue(i)).collect()
    }

    /// Returns the id placed in the form
    pub fn open_node_modal(&mut self, draft: NodeDraft) -> Option<String> {
        self.modal.open(&mut self.page, &self.contract, draft)
    }

    pub fn close_node_modal(&mut self) {
        self.modal.close(&mut self.page, &self.contract);
    }

    pub fn save_node(&mut self, submit: &mut SubmitEvent) -> Vec<Command> {
        submit.prevent_default();
        match self.modal.read_form(&self.page, &self.contract) {
            Some(record) => {
                info!(target: "console", id = %record.id, "Submitting node");
                vec![Command::Save(record)]
            }
            None => {
                debug!(target: "console", "Node form not on page");
                Vec::new()
            }
        }
    }

    pub fn delete_node(&mut self, id: &str) -> Vec<Command> {
        if !self.host.confirm(DELETE_PROMPT) {
            debug!(target: "console", id = %id, "Delete cancelled");
            return Vec::new();
        }
        vec![Command::Delete(id.to_string())]
    }

    /// Fetches for every polling container whose interval elapsed
    pub fn poll_due(&mut self, now: Instant) -> Vec<Command> {
        let intents = self.poller.due(&self.page, &self.contract, now);
        intents.into_iter().map(|i| self.issue(i)).collect()
    }

    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched { request, body } => self.apply_fetch(request, body),
            Completion::Persisted { op, id, result } => {
                if let Err(e) = result {
                    warn!(target: "console", op = ?op, id = %id, error = %e, "Registry request failed");
                }
                if op == PersistOp::Save {
                    self.modal.close(&mut self.page, &self.contract);
                }
                self.host.reload();
            }
        }
    }

    fn issue(&mut self, intent: RefreshIntent) -> Command {
        Command::Fetch(self.ledger.issue(intent))
    }

    fn apply_fetch(&mut self, request: FetchRequest, body: Result<String>) {
        let ticket = &request.ticket;
        if !self.ledger.is_current(ticket) {
            debug!(target: "console", region = %ticket.region, seq = ticket.seq, "Discarding superseded response");
            return;
        }
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                warn!(target: "console", region = %ticket.region, url = %request.url, error = %e, "Refresh failed");
                return;
            }
        };
        let Some(target) = ticket.region.resolve(&self.page) else {
            debug!(target: "console", region = %ticket.region, "Refresh target gone");
            return;
        };

        let roots = match self.page.swap(target, request.swap, &body) {
            Ok(roots) => roots,
            Err(e) => {
                warn!(target: "console", region = %ticket.region, error = %e, "Swap failed");
                return;
            }
        };
        if let RegionKey::Element(_) = ticket.region {
            if request.swap == SwapStyle::Outer {
                self.ledger.forget(&ticket.region);
            }
        }
        self.streams.prune(&self.page);
        // only the content just inserted; the first log region wins
        for root in roots {
            if self.scroll.after_swap(&mut self.page, root) {
                break;
            }
        }
        debug!(target: "console", region = %ticket.region, swap = ?request.swap, "Swap applied");
    }
}
