//! Company and project token substitution.
//!
//! The same rule applies to directory names, file names, and file contents:
//! the company token is replaced first (only when the old company token is
//! non-empty), then the project token. Replacement is literal, left to right,
//! and non-overlapping.
//!
//! Applying a spec twice is not idempotent when a new token contains its old
//! token as a substring.
//!
//! # Examples
//!
//! ```
//! use renametree::rename_spec::RenameSpec;
//!
//! let spec = RenameSpec::new("Acme", "Widget", "Globex", "Gadget");
//! assert_eq!(spec.rename("AcmeWidget.cs"), Some("GlobexGadget.cs".to_string()));
//! assert_eq!(spec.rename("Program.cs"), None);
//! ```

/// Default old company token offered at the prompt.
pub const DEFAULT_OLD_COMPANY_NAME: &str = "MyCompanyName";
/// Default old project token offered at the prompt.
pub const DEFAULT_OLD_PROJECT_NAME: &str = "AbpZeroTemplate";
/// Default new project token offered at the prompt.
pub const DEFAULT_NEW_PROJECT_NAME: &str = "NewAbpZeroTemplate";

/// The old and new company/project tokens for a run.
///
/// `old_project_name` is never empty. `old_company_name` may be empty, in which
/// case no company substitution happens anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSpec {
    pub old_company_name: String,
    pub old_project_name: String,
    pub new_company_name: String,
    pub new_project_name: String,
}

impl RenameSpec {
    pub fn new(
        old_company_name: impl Into<String>,
        old_project_name: impl Into<String>,
        new_company_name: impl Into<String>,
        new_project_name: impl Into<String>,
    ) -> Self {
        Self {
            old_company_name: old_company_name.into(),
            old_project_name: old_project_name.into(),
            new_company_name: new_company_name.into(),
            new_project_name: new_project_name.into(),
        }
    }

    /// Swaps old and new tokens, producing the spec that undoes this one.
    pub fn reversed(&self) -> Self {
        Self {
            old_company_name: self.new_company_name.clone(),
            old_project_name: self.new_project_name.clone(),
            new_company_name: self.old_company_name.clone(),
            new_project_name: self.old_project_name.clone(),
        }
    }

    fn substitutes_company(&self) -> bool {
        !self.old_company_name.is_empty()
    }

    /// True if `name` contains either old token.
    pub fn has_token(&self, name: &str) -> bool {
        (self.substitutes_company() && name.contains(&self.old_company_name))
            || name.contains(&self.old_project_name)
    }

    /// Replaces every old token in `text` with its new token.
    pub fn substitute(&self, text: &str) -> String {
        let text = if self.substitutes_company() {
            text.replace(&self.old_company_name, &self.new_company_name)
        } else {
            text.to_string()
        };
        text.replace(&self.old_project_name, &self.new_project_name)
    }

    /// Returns the substituted name if `name` contains an old token.
    ///
    /// The result may equal `name` (e.g. when old and new tokens are the same);
    /// callers compare full paths before moving anything.
    pub fn rename(&self, name: &str) -> Option<String> {
        if self.has_token(name) {
            Some(self.substitute(name))
        } else {
            None
        }
    }
}
