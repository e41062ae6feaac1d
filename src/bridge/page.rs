use serde::{Deserialize, Serialize};

use super::rpc::{PageRequest, PageResponse, PageScript};
use crate::error::RefinerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Single-line text input.
    Input,
    /// Multi-line text field.
    TextArea,
    /// Element with `contenteditable` set.
    ContentEditable,
    Other,
}

impl ElementKind {
    pub fn is_editable(self) -> bool {
        !matches!(self, ElementKind::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageElement {
    pub kind: ElementKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub hidden: bool,
}

impl PageElement {
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Notification raised on an element after a programmatic write, matching
/// what real typing would fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Input { element: usize, bubbles: bool },
}

/// Snapshot of the editable surface of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(default)]
    pub elements: Vec<PageElement>,
    /// Index into `elements` of the focused element.
    #[serde(default)]
    pub focused: Option<usize>,
    #[serde(default)]
    pub selection: String,
    /// Browser-internal pages refuse script execution.
    #[serde(default)]
    pub privileged: bool,
    #[serde(skip)]
    pub events: Vec<PageEvent>,
}

impl PageDocument {
    fn focused_editable(&self) -> Option<usize> {
        self.focused
            .filter(|&idx| self.elements.get(idx).is_some_and(|el| el.kind.is_editable()))
    }

    fn indices_of(&self, kind: ElementKind) -> impl Iterator<Item = usize> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, el)| el.kind == kind)
            .map(|(idx, _)| idx)
    }

    /// Focused field text; otherwise the longest non-empty text area, then
    /// the first non-empty editable region.
    pub fn active_field_text(&self) -> Option<String> {
        if let Some(idx) = self.focused_editable() {
            return Some(self.elements[idx].text.clone());
        }
        let longest = self
            .indices_of(ElementKind::TextArea)
            .map(|idx| &self.elements[idx])
            .filter(|el| !el.text.trim().is_empty())
            .fold(None::<&PageElement>, |best, el| match best {
                Some(b) if b.text.len() >= el.text.len() => Some(b),
                _ => Some(el),
            });
        if let Some(el) = longest {
            return Some(el.text.clone());
        }
        self.indices_of(ElementKind::ContentEditable)
            .map(|idx| &self.elements[idx])
            .find(|el| !el.text.trim().is_empty())
            .map(|el| el.text.clone())
    }

    /// Writes into the focused field, else the first visible text area.
    /// Returns `false` when neither exists.
    pub fn replace_active_field(&mut self, text: &str) -> bool {
        let target = self.focused_editable().or_else(|| {
            self.indices_of(ElementKind::TextArea)
                .find(|&idx| !self.elements[idx].hidden)
        });
        let Some(idx) = target else {
            return false;
        };
        self.elements[idx].text = text.to_string();
        self.events.push(PageEvent::Input {
            element: idx,
            bubbles: true,
        });
        true
    }
}

impl PageScript for PageDocument {
    fn handle(&mut self, request: PageRequest) -> Result<PageResponse, RefinerError> {
        if self.privileged {
            return Err(RefinerError::PageAccessDenied);
        }
        Ok(match request {
            PageRequest::GetSelection => PageResponse::Selection(self.selection.clone()),
            PageRequest::GetActiveField => PageResponse::ActiveField(self.active_field_text()),
            PageRequest::ReplaceActiveField(text) => {
                PageResponse::Replaced(self.replace_active_field(&text))
            }
        })
    }
}
