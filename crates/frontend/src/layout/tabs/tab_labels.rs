use contracts::projections::p901_price_research::PriceResearch;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_artifact_generation::ArtifactGeneration;
use contracts::usecases::u503_skill_wizard::SkillWizard;

pub const ARTIFACT_TAB: &str = "u501_artifact_generation";
pub const PRICE_RESEARCH_TAB: &str = "p901_price_research";
pub const SKILLS_TAB: &str = "a003_skill";
pub const SKILL_WIZARD_TAB: &str = "u503_skill_wizard";

/// Readable title for a tab key. Unknown keys are shown as is.
pub fn tab_label(key: &str) -> &str {
    match key {
        ARTIFACT_TAB => ArtifactGeneration::display_name(),
        PRICE_RESEARCH_TAB => PriceResearch::display_name(),
        SKILLS_TAB => "Skills",
        SKILL_WIZARD_TAB => SkillWizard::display_name(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_have_titles() {
        assert_eq!(tab_label(PRICE_RESEARCH_TAB), "Pesquisa de Preços");
        assert_eq!(tab_label(SKILLS_TAB), "Skills");
        assert_eq!(tab_label("x_unknown"), "x_unknown");
    }

    #[test]
    fn test_tab_keys_match_feature_metadata() {
        assert_eq!(ArtifactGeneration::tab_key(), ARTIFACT_TAB);
        assert_eq!(PriceResearch::tab_key(), PRICE_RESEARCH_TAB);
        assert_eq!(SkillWizard::tab_key(), SKILL_WIZARD_TAB);
    }
}
