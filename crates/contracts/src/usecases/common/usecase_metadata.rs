/// Identity of a page-level feature: the index prefix groups it
/// (`a` aggregate, `u` use case, `p` projection) and the pair names its tab.
pub trait UseCaseMetadata {
    /// `"u501"`, `"p901"`, ...
    fn usecase_index() -> &'static str;

    /// Snake case name, e.g. `"artifact_generation"`
    fn usecase_name() -> &'static str;

    /// Title shown on tabs and menu entries
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// `"{index}_{name}"`, the key of the feature's tab.
    fn tab_key() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl UseCaseMetadata for Probe {
        fn usecase_index() -> &'static str {
            "u999"
        }

        fn usecase_name() -> &'static str {
            "probe"
        }

        fn display_name() -> &'static str {
            "Probe"
        }
    }

    #[test]
    fn test_tab_key_joins_index_and_name() {
        assert_eq!(Probe::tab_key(), "u999_probe");
        assert_eq!(Probe::description(), "");
    }
}
