//! Per-field model, attachment and skill choices for targeted regeneration.
//!
//! Contexts are created on first use, seeded with the globally selected
//! model, and live until the page is reloaded. They never share state with
//! the main chat's attachments or skills.

use std::collections::{BTreeSet, HashMap};

use crate::domain::a003_skill::SkillId;
use crate::domain::a004_ai_model::SelectedModel;
use crate::domain::a005_attachment::{Attachment, AttachmentList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenContext {
    pub model: SelectedModel,
    pub attachments: AttachmentList,
    pub skills: BTreeSet<SkillId>,
}

impl RegenContext {
    fn seeded(model: SelectedModel) -> Self {
        Self {
            model,
            attachments: AttachmentList::new(),
            skills: BTreeSet::new(),
        }
    }

    pub fn indicators(&self) -> RegenIndicators {
        RegenIndicators {
            model_name: self.model.name.clone(),
            attachment_count: self.attachments.len(),
            skill_count: self.skills.len(),
        }
    }

    pub fn skill_ids(&self) -> Vec<SkillId> {
        self.skills.iter().copied().collect()
    }
}

/// The three status badges of an inline regenerate panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenIndicators {
    pub model_name: String,
    pub attachment_count: usize,
    pub skill_count: usize,
}

/// Result of opening a panel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelChange {
    pub closed: Option<String>,
    pub opened: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegenContextManager {
    seed_model: SelectedModel,
    contexts: HashMap<String, RegenContext>,
    open_panel: Option<String>,
}

impl RegenContextManager {
    pub fn new(seed_model: SelectedModel) -> Self {
        Self {
            seed_model,
            contexts: HashMap::new(),
            open_panel: None,
        }
    }

    /// Model used to seed contexts created from now on.
    pub fn set_seed_model(&mut self, model: SelectedModel) {
        self.seed_model = model;
    }

    pub fn get(&mut self, field_key: &str) -> &RegenContext {
        self.entry(field_key)
    }

    /// Existing context without creating one.
    pub fn peek(&self, field_key: &str) -> Option<&RegenContext> {
        self.contexts.get(field_key)
    }

    fn entry(&mut self, field_key: &str) -> &mut RegenContext {
        let seed = &self.seed_model;
        self.contexts
            .entry(field_key.to_string())
            .or_insert_with(|| RegenContext::seeded(seed.clone()))
    }

    pub fn set_model(&mut self, field_key: &str, model: SelectedModel) -> RegenIndicators {
        let ctx = self.entry(field_key);
        ctx.model = model;
        ctx.indicators()
    }

    pub fn add_attachment(&mut self, field_key: &str, attachment: Attachment) -> RegenIndicators {
        let ctx = self.entry(field_key);
        ctx.attachments.push(attachment);
        ctx.indicators()
    }

    pub fn remove_attachment(&mut self, field_key: &str, filename: &str) -> RegenIndicators {
        let ctx = self.entry(field_key);
        ctx.attachments.remove(filename);
        ctx.indicators()
    }

    pub fn toggle_skill(&mut self, field_key: &str, skill: SkillId) -> RegenIndicators {
        let ctx = self.entry(field_key);
        if !ctx.skills.remove(&skill) {
            ctx.skills.insert(skill);
        }
        ctx.indicators()
    }

    pub fn indicators(&mut self, field_key: &str) -> RegenIndicators {
        self.entry(field_key).indicators()
    }

    pub fn open_panel_key(&self) -> Option<&str> {
        self.open_panel.as_deref()
    }

    pub fn is_open(&self, field_key: &str) -> bool {
        self.open_panel.as_deref() == Some(field_key)
    }

    /// Opens the panel of `field_key`, closing any other one. Opening the
    /// panel that is already open closes it.
    pub fn toggle_panel(&mut self, field_key: &str) -> PanelChange {
        let previous = self.open_panel.take();
        if previous.as_deref() == Some(field_key) {
            return PanelChange {
                closed: previous,
                opened: None,
            };
        }
        self.entry(field_key);
        self.open_panel = Some(field_key.to_string());
        PanelChange {
            closed: previous,
            opened: self.open_panel.clone(),
        }
    }

    pub fn close_panel(&mut self, field_key: &str) {
        if self.is_open(field_key) {
            self.open_panel = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str) -> Attachment {
        Attachment {
            mime_type: "application/pdf".into(),
            filename: name.into(),
            url: format!("/u/{name}"),
            extracted_text: None,
        }
    }

    #[test]
    fn test_lazy_context_seeded_with_preference() {
        let mut mgr = RegenContextManager::new(SelectedModel::new("a/x", "X"));
        assert!(mgr.peek("objeto").is_none());
        let ctx = mgr.get("objeto");
        assert_eq!(ctx.model.id, "a/x");
        assert!(ctx.attachments.is_empty());
        assert!(ctx.skills.is_empty());
    }

    #[test]
    fn test_mutators_report_indicators() {
        let mut mgr = RegenContextManager::new(SelectedModel::default());
        let ind = mgr.set_model("objeto", SelectedModel::new("b/y", "Y"));
        assert_eq!(ind.model_name, "Y");
        assert_eq!(mgr.add_attachment("objeto", attachment("a.pdf")).attachment_count, 1);
        assert_eq!(mgr.toggle_skill("objeto", 4).skill_count, 1);
        assert_eq!(mgr.toggle_skill("objeto", 4).skill_count, 0);
        assert_eq!(mgr.remove_attachment("objeto", "a.pdf").attachment_count, 0);
    }

    #[test]
    fn test_opening_second_panel_closes_first_and_keeps_context() {
        let mut mgr = RegenContextManager::new(SelectedModel::default());
        mgr.toggle_panel("a");
        mgr.set_model("a", SelectedModel::new("m/a", "A"));
        mgr.add_attachment("a", attachment("doc.pdf"));
        mgr.toggle_skill("a", 7);
        let before = mgr.peek("a").cloned().unwrap();

        let change = mgr.toggle_panel("b");
        assert_eq!(change.closed.as_deref(), Some("a"));
        assert_eq!(change.opened.as_deref(), Some("b"));
        assert!(!mgr.is_open("a"));
        assert_eq!(mgr.peek("a"), Some(&before));

        mgr.toggle_panel("a");
        assert!(mgr.is_open("a"));
        assert_eq!(mgr.get("a").model.name, "A");
        assert_eq!(mgr.get("a").skill_ids(), vec![7]);
    }

    #[test]
    fn test_reopening_same_panel_closes_it() {
        let mut mgr = RegenContextManager::new(SelectedModel::default());
        mgr.toggle_panel("a");
        let change = mgr.toggle_panel("a");
        assert_eq!(change.closed.as_deref(), Some("a"));
        assert!(change.opened.is_none());
        assert!(mgr.open_panel_key().is_none());
    }
}
