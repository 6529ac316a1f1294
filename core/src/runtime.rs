// Command execution
//
// The console never awaits. It hands network work to the runtime as
// `Command`s; each one runs on its own task and reports back through a single
// completion channel, which the host loop drains into `Console::complete`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::node::NodeRecord;
use crate::refresh::FetchRequest;
use crate::registry::NodeStore;
use crate::transport::Fetcher;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch(FetchRequest),
    Save(NodeRecord),
    Delete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    Save,
    Delete,
}

#[derive(Debug)]
pub enum Completion {
    Fetched {
        request: FetchRequest,
        body: Result<String>,
    },
    Persisted {
        op: PersistOp,
        id: String,
        result: Result<()>,
    },
}

pub struct Runtime {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn NodeStore>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Runtime {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn NodeStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            store,
            tx,
            rx,
        }
    }

    /// Start every command; none is awaited here
    pub fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            self.spawn(command);
        }
    }

    fn spawn(&self, command: Command) {
        let tx = self.tx.clone();
        match command {
            Command::Fetch(request) => {
                let fetcher = self.fetcher.clone();
                debug!(target: "runtime", region = %request.ticket.region, seq = request.ticket.seq, url = %request.url, "Dispatching fetch");
                tokio::spawn(async move {
                    let body = fetcher.fetch(&request.url).await;
                    let _ = tx.send(Completion::Fetched { request, body });
                });
            }
            Command::Save(record) => {
                let store = self.store.clone();
                debug!(target: "runtime", id = %record.id, "Dispatching save");
                tokio::spawn(async move {
                    let result = store.save(&record).await;
                    let _ = tx.send(Completion::Persisted {
                        op: PersistOp::Save,
                        id: record.id,
                        result,
                    });
                });
            }
            Command::Delete(id) => {
                let store = self.store.clone();
                debug!(target: "runtime", id = %id, "Dispatching delete");
                tokio::spawn(async move {
                    let result = store.delete(&id).await;
                    let _ = tx.send(Completion::Persisted {
                        op: PersistOp::Delete,
                        id,
                        result,
                    });
                });
            }
        }
    }

    /// Wait for the next finished command
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Finished command, if one is ready
    pub fn try_next_completion(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}
