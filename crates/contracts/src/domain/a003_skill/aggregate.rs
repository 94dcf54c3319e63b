use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::shared::text::contains_folded;

pub type SkillId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkillScope {
    System,
    #[default]
    User,
}

impl SkillScope {
    pub fn badge(&self) -> &'static str {
        match self {
            SkillScope::System => "Sistema",
            SkillScope::User => "Minha",
        }
    }
}

/// Knowledge-base document attached to a skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeText {
    pub titulo: String,
    pub conteudo: String,
}

/// Reusable instruction bundle owned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub escopo: SkillScope,
    #[serde(default)]
    pub instrucoes: String,
    #[serde(default)]
    pub icone: Option<String>,
    #[serde(default)]
    pub tools: Option<Vec<Value>>,
    #[serde(default)]
    pub textos_base: Option<Vec<KnowledgeText>>,
    #[serde(default = "default_true")]
    pub ativa: bool,
}

fn default_true() -> bool {
    true
}

impl Skill {
    pub fn is_system(&self) -> bool {
        self.escopo == SkillScope::System
    }

    pub fn icon(&self) -> &str {
        self.icone.as_deref().unwrap_or("⚡")
    }

    pub fn description(&self) -> &str {
        self.descricao.as_deref().unwrap_or("")
    }

    pub fn uses_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }

    pub fn uses_knowledge_base(&self) -> bool {
        self.textos_base.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Case and accent insensitive match on name or description.
    pub fn matches(&self, query: &str) -> bool {
        contains_folded(&self.nome, query) || contains_folded(self.description(), query)
    }
}

/// System skills first, then by name.
pub fn sort_for_display(skills: &mut [Skill]) {
    skills.sort_by(|a, b| match (a.escopo, b.escopo) {
        (x, y) if x == y => a.nome.to_lowercase().cmp(&b.nome.to_lowercase()),
        (SkillScope::System, _) => Ordering::Less,
        _ => Ordering::Greater,
    });
}

/// Splits a listing into (system, user) skills.
pub fn partition_by_scope(skills: &[Skill]) -> (Vec<Skill>, Vec<Skill>) {
    skills.iter().cloned().partition(Skill::is_system)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(id: SkillId, nome: &str, escopo: SkillScope) -> Skill {
        Skill {
            id,
            nome: nome.into(),
            descricao: Some(format!("Descrição de {nome}")),
            escopo,
            instrucoes: "Siga a lei".into(),
            icone: None,
            tools: None,
            textos_base: None,
            ativa: true,
        }
    }

    #[test]
    fn test_sort_puts_system_first() {
        let mut skills = vec![
            skill(1, "Zeta", SkillScope::User),
            skill(2, "Beta", SkillScope::System),
            skill(3, "alfa", SkillScope::User),
        ];
        sort_for_display(&mut skills);
        let ids: Vec<_> = skills.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_matches_name_or_description() {
        let s = skill(1, "Jurídico", SkillScope::User);
        assert!(s.matches("juri"));
        assert!(s.matches("descrição"));
        assert!(s.matches("DESCRICAO"));
        assert!(!s.matches("tabela"));
    }

    #[test]
    fn test_deserialize_minimal_skill() {
        let s: Skill =
            serde_json::from_str(r#"{"id": 5, "nome": "X", "escopo": "system"}"#).unwrap();
        assert!(s.is_system());
        assert!(s.ativa);
        assert!(!s.uses_tools());
        assert_eq!(s.icon(), "⚡");
    }
}
