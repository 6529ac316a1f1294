// Log stream pause/resume
//
// A stream container is any element declaring a refresh trigger. Its state is
// held here as one enum; the trigger attribute, the control label/styling and
// the badge are all derived from it by `render`, never edited one by one.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::PageContract;
use crate::page::{ElementHandle, Page};
use crate::poller::Trigger;

pub const PAUSE_LABEL: &str = "PAUSE";
pub const RESUME_LABEL: &str = "RESUME";
pub const LOADING_LABEL: &str = "LOADING...";
pub const PAUSED_BADGE: &str = "PAUSED";
pub const TRIGGER_OFF: &str = "off";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Polling as rendered by the server
    #[default]
    Live,
    Paused,
    /// Fresh markup requested, not yet swapped in
    Resuming,
}

/// Classes to add and remove on one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDelta {
    pub add: &'static [&'static str],
    pub remove: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgePresentation {
    pub text: &'static str,
    pub classes: ClassDelta,
}

/// Everything a state shows on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// `None` keeps the trigger the server rendered
    pub trigger: Option<&'static str>,
    pub label: &'static str,
    pub control: ClassDelta,
    /// `None` leaves the badge as it is
    pub badge: Option<BadgePresentation>,
}

const NO_CHANGE: ClassDelta = ClassDelta {
    add: &[],
    remove: &[],
};

impl StreamState {
    pub fn presentation(self) -> Presentation {
        match self {
            StreamState::Live => Presentation {
                trigger: None,
                label: PAUSE_LABEL,
                control: NO_CHANGE,
                badge: None,
            },
            StreamState::Paused => Presentation {
                trigger: Some(TRIGGER_OFF),
                label: RESUME_LABEL,
                control: ClassDelta {
                    add: &["bg-green-600", "text-white", "border-transparent"],
                    remove: &["border-gray-600"],
                },
                badge: Some(BadgePresentation {
                    text: PAUSED_BADGE,
                    classes: ClassDelta {
                        add: &["text-red-500"],
                        remove: &["animate-pulse", "text-green-500"],
                    },
                }),
            },
            StreamState::Resuming => Presentation {
                trigger: Some(TRIGGER_OFF),
                label: LOADING_LABEL,
                control: NO_CHANGE,
                badge: None,
            },
        }
    }
}

fn apply_classes<P: Page + ?Sized>(page: &mut P, element: ElementHandle, delta: ClassDelta) {
    for class in delta.remove {
        page.remove_class(element, class);
    }
    for class in delta.add {
        page.add_class(element, class);
    }
}

/// Write every presentation of `state` for one container
pub fn render<P: Page + ?Sized>(
    page: &mut P,
    contract: &PageContract,
    container: ElementHandle,
    control: ElementHandle,
    state: StreamState,
) {
    let presentation = state.presentation();
    if let Some(trigger) = presentation.trigger {
        page.set_attribute(container, &contract.trigger_attribute, trigger);
    }
    page.set_text(control, presentation.label);
    apply_classes(page, control, presentation.control);

    if let Some(badge) = presentation.badge {
        if let Some(element) = page.find_by_class(container, &contract.live_badge_class) {
            apply_classes(page, element, badge.classes);
            page.set_text(element, badge.text);
        }
    }
}

/// Result of a toggle the console has to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTransition {
    Paused { container: ElementHandle },
    /// Fetch `url` and replace the whole container with it
    Resume { container: ElementHandle, url: String },
}

/// Pause/resume state of every stream container on the page
#[derive(Debug, Default)]
pub struct StreamControl {
    states: HashMap<ElementHandle, StreamState>,
}

impl StreamControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded state, or what the server rendered: a container whose
    /// trigger is `off` arrived paused
    pub fn state_of<P: Page + ?Sized>(
        &self,
        page: &P,
        contract: &PageContract,
        container: ElementHandle,
    ) -> StreamState {
        if let Some(state) = self.states.get(&container) {
            return *state;
        }
        match page.attribute(container, &contract.trigger_attribute) {
            Some(trigger) if Trigger::parse(&trigger).disabled => StreamState::Paused,
            _ => StreamState::Live,
        }
    }

    /// Toggle the container enclosing `control`; `None` when there is nothing
    /// to toggle.
    pub fn toggle<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        contract: &PageContract,
        control: ElementHandle,
    ) -> Option<StreamTransition> {
        let Some(container) = page.closest_with_attribute(control, &contract.trigger_attribute)
        else {
            debug!(target: "stream", control = %control, "No stream container around control");
            return None;
        };

        match self.state_of(page, contract, container) {
            StreamState::Live => {
                render(page, contract, container, control, StreamState::Paused);
                self.states.insert(container, StreamState::Paused);
                info!(target: "stream", container = %container, "Stream paused");
                Some(StreamTransition::Paused { container })
            }
            StreamState::Paused | StreamState::Resuming => {
                let Some(url) = page.attribute(container, &contract.url_attribute) else {
                    debug!(target: "stream", container = %container, "Stream container has no refresh url");
                    return None;
                };
                render(page, contract, container, control, StreamState::Resuming);
                self.states.insert(container, StreamState::Resuming);
                info!(target: "stream", container = %container, url = %url, "Resuming stream");
                Some(StreamTransition::Resume { container, url })
            }
        }
    }

    /// Drop state of containers that were swapped out
    pub fn prune<P: Page + ?Sized>(&mut self, page: &P) {
        self.states.retain(|container, _| page.is_attached(*container));
    }

    pub fn tracked(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::memory::MemoryPage;

    #[test]
    fn paused_presentation_disables_trigger_and_restyles_both_elements() {
        let p = StreamState::Paused.presentation();
        assert_eq!(p.trigger, Some(TRIGGER_OFF));
        assert_eq!(p.label, RESUME_LABEL);
        assert!(p.control.add.contains(&"bg-green-600"));
        let badge = p.badge.unwrap();
        assert_eq!(badge.text, PAUSED_BADGE);
        assert!(badge.classes.remove.contains(&"animate-pulse"));
    }

    #[test]
    fn resuming_keeps_polling_off_until_fresh_markup_arrives() {
        let p = StreamState::Resuming.presentation();
        assert_eq!(p.trigger, Some(TRIGGER_OFF));
        assert_eq!(p.label, LOADING_LABEL);
        assert!(p.badge.is_none());
    }

    #[test]
    fn unknown_containers_follow_the_rendered_trigger() {
        let page = MemoryPage::from_markup(
            r#"<div id="a" hx-trigger="every 2s"></div><div id="b" hx-trigger="off"></div>"#,
        )
        .unwrap();
        let contract = PageContract::default();
        let control = StreamControl::new();
        let live = page.element_by_id("a").unwrap();
        let paused = page.element_by_id("b").unwrap();

        assert_eq!(control.state_of(&page, &contract, live), StreamState::Live);
        assert_eq!(control.state_of(&page, &contract, paused), StreamState::Paused);
    }
}
