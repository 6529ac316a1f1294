// Node registry modal and log-inspector overlay
use tracing::{debug, info};

use crate::config::PageContract;
use crate::node::{IdGenerator, NodeRecord};
use crate::page::{ElementHandle, Page};

pub const ADD_TITLE: &str = "Add New Node";
pub const EDIT_TITLE: &str = "Edit Node";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalVisibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    Add,
    Edit,
}

/// Values the modal is opened with; no id means add mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDraft {
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    pub token: String,
}

impl NodeDraft {
    pub fn add() -> Self {
        Self::default()
    }

    pub fn edit(record: &NodeRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: record.name.clone(),
            url: record.url.clone(),
            token: record.token.clone().unwrap_or_default(),
        }
    }
}

struct ModalElements {
    modal: ElementHandle,
    title: ElementHandle,
    id: ElementHandle,
    name: ElementHandle,
    url: ElementHandle,
    token: ElementHandle,
}

impl ModalElements {
    fn locate<P: Page + ?Sized>(page: &P, contract: &PageContract) -> Option<Self> {
        Some(Self {
            modal: page.element_by_id(&contract.node_modal_id)?,
            title: page.element_by_id(&contract.node_modal_title_id)?,
            id: page.element_by_id(&contract.node_id_field)?,
            name: page.element_by_id(&contract.node_name_field)?,
            url: page.element_by_id(&contract.node_url_field)?,
            token: page.element_by_id(&contract.node_token_field)?,
        })
    }
}

/// Add/edit form for node records
#[derive(Debug, Default)]
pub struct NodeModal {
    visibility: ModalVisibility,
    mode: Option<ModalMode>,
    ids: IdGenerator,
}

impl NodeModal {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            visibility: ModalVisibility::Hidden,
            mode: None,
            ids,
        }
    }

    pub fn visibility(&self) -> ModalVisibility {
        self.visibility
    }

    /// Mode of the last open
    pub fn mode(&self) -> Option<ModalMode> {
        self.mode
    }

    /// Fill the form from `draft` and show it. Returns the id placed in the
    /// form, or `None` when the modal is not on the page.
    pub fn open<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        contract: &PageContract,
        draft: NodeDraft,
    ) -> Option<String> {
        let Some(elements) = ModalElements::locate(page, contract) else {
            debug!(target: "modal", "Node modal not on page");
            return None;
        };

        let (mode, id) = match draft.id.filter(|id| !id.is_empty()) {
            Some(id) => (ModalMode::Edit, id),
            // generated up front so a retried save overwrites instead of duplicating
            None => (ModalMode::Add, self.ids.generate()),
        };

        page.set_value(elements.id, &id);
        page.set_value(elements.name, &draft.name);
        page.set_value(elements.url, &draft.url);
        page.set_value(elements.token, &draft.token);
        page.set_text(
            elements.title,
            match mode {
                ModalMode::Add => ADD_TITLE,
                ModalMode::Edit => EDIT_TITLE,
            },
        );
        page.remove_class(elements.modal, &contract.hidden_class);

        self.mode = Some(mode);
        self.visibility = ModalVisibility::Visible;
        info!(target: "modal", id = %id, mode = ?mode, "Node modal opened");
        Some(id)
    }

    /// Hide the modal; field values are left in place
    pub fn close<P: Page + ?Sized>(&mut self, page: &mut P, contract: &PageContract) {
        if let Some(modal) = page.element_by_id(&contract.node_modal_id) {
            page.add_class(modal, &contract.hidden_class);
        }
        if self.visibility == ModalVisibility::Visible {
            debug!(target: "modal", "Node modal closed");
        }
        self.visibility = ModalVisibility::Hidden;
    }

    /// Current form contents as a record
    pub fn read_form<P: Page + ?Sized>(
        &self,
        page: &P,
        contract: &PageContract,
    ) -> Option<NodeRecord> {
        let field = |id: &str| {
            page.element_by_id(id)
                .and_then(|h| page.value(h))
                .unwrap_or_default()
        };
        page.element_by_id(&contract.node_id_field)?;
        Some(NodeRecord::from_form(
            &field(&contract.node_id_field),
            &field(&contract.node_name_field),
            &field(&contract.node_url_field),
            &field(&contract.node_token_field),
        ))
    }
}

/// Empty the log-inspector overlay
pub fn close_inspector<P: Page + ?Sized>(page: &mut P, contract: &PageContract) {
    if let Some(container) = page.element_by_id(&contract.inspector_container_id) {
        page.clear_children(container);
    }
}
