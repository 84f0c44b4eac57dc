//! Hidden-entry policy.

use compact_str::CompactString;

/// Decides whether a directory entry is shown.
///
/// When hidden entries are not shown, a name is excluded if it starts with
/// `.`, ends with `~`, or appears in the sibling `.hidden` control file.
/// The always-visible allow-list overrides all three rules.
#[derive(Debug, Clone, Default)]
pub struct HiddenPolicy {
    /// Show everything, bypassing the exclusion rules.
    pub show_hidden: bool,
    /// Names exempted from the exclusion rules.
    pub always_visible: Vec<CompactString>,
}

impl HiddenPolicy {
    /// Create a policy from list configuration values.
    pub fn new(show_hidden: bool, always_visible: &[String]) -> Self {
        Self {
            show_hidden,
            always_visible: always_visible.iter().map(CompactString::from).collect(),
        }
    }

    /// Check whether `name` passes the policy. `listed_hidden` holds the
    /// names read from the sibling `.hidden` control file.
    pub fn is_visible(&self, name: &str, listed_hidden: &[String]) -> bool {
        if self.show_hidden {
            return true;
        }
        if self.always_visible.iter().any(|item| item == name) {
            return true;
        }
        if name.starts_with('.') || name.ends_with('~') {
            return false;
        }
        !listed_hidden.iter().any(|item| item == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(always_visible: &[&str]) -> HiddenPolicy {
        HiddenPolicy::new(
            false,
            &always_visible
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_dotfiles_and_backups_hidden() {
        let policy = policy(&[]);
        assert!(!policy.is_visible(".config", &[]));
        assert!(!policy.is_visible("notes.txt~", &[]));
        assert!(policy.is_visible("notes.txt", &[]));
    }

    #[test]
    fn test_control_file_names_hidden() {
        let policy = policy(&[]);
        let listed = vec!["secret".to_string()];
        assert!(!policy.is_visible("secret", &listed));
        assert!(policy.is_visible("public", &listed));
    }

    #[test]
    fn test_allow_list_wins_over_both_rules() {
        let policy = policy(&[".config", "secret"]);
        let listed = vec!["secret".to_string()];
        assert!(policy.is_visible(".config", &listed));
        assert!(policy.is_visible("secret", &listed));
    }

    #[test]
    fn test_show_hidden_bypasses_everything() {
        let policy = HiddenPolicy::new(true, &[]);
        let listed = vec![".config".to_string()];
        assert!(policy.is_visible(".config", &listed));
        assert!(policy.is_visible("backup~", &listed));
    }
}
