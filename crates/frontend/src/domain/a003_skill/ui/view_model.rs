use contracts::domain::a003_skill::aggregate::{partition_by_scope, sort_for_display};
use contracts::domain::a003_skill::{Skill, SkillDraft, SkillId};
use leptos::prelude::*;

/// Which skill the editor modal works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(SkillId),
}

#[derive(Clone, Copy)]
pub struct SkillSettingsVm {
    pub skills: RwSignal<Vec<Skill>>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    pub expanded: RwSignal<Option<SkillId>>,
    pub editor: RwSignal<Option<EditorTarget>>,
    pub draft: RwSignal<SkillDraft>,
    pub saving: RwSignal<bool>,
    pub active_tab: RwSignal<&'static str>,
}

impl SkillSettingsVm {
    pub fn new() -> Self {
        Self {
            skills: RwSignal::new(Vec::new()),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
            expanded: RwSignal::new(None),
            editor: RwSignal::new(None),
            draft: RwSignal::new(SkillDraft::default()),
            saving: RwSignal::new(false),
            active_tab: RwSignal::new("minhas"),
        }
    }

    pub fn set_skills(&self, mut skills: Vec<Skill>) {
        sort_for_display(&mut skills);
        self.skills.set(skills);
    }

    /// (system, user)
    pub fn partitioned(&self) -> (Vec<Skill>, Vec<Skill>) {
        self.skills.with(|s| partition_by_scope(s))
    }

    pub fn toggle_expanded(&self, id: SkillId) {
        self.expanded
            .update(|current| *current = if *current == Some(id) { None } else { Some(id) });
    }

    pub fn open_new(&self) {
        self.draft.set(SkillDraft::default());
        self.editor.set(Some(EditorTarget::New));
    }

    /// System skills are read-only and never open the editor.
    pub fn open_edit(&self, id: SkillId) {
        let skill = self
            .skills
            .with_untracked(|s| s.iter().find(|s| s.id == id && !s.is_system()).cloned());
        if let Some(skill) = skill {
            self.draft.set(SkillDraft::from_skill(&skill));
            self.editor.set(Some(EditorTarget::Existing(id)));
        }
    }

    pub fn close_editor(&self) {
        self.editor.set(None);
        self.saving.set(false);
    }

    pub fn name_of(&self, id: SkillId) -> String {
        self.skills.with_untracked(|s| {
            s.iter()
                .find(|s| s.id == id)
                .map(|s| s.nome.clone())
                .unwrap_or_default()
        })
    }
}

impl Default for SkillSettingsVm {
    fn default() -> Self {
        Self::new()
    }
}
