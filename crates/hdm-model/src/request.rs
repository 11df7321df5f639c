use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dictionary::ExtractedDictionaryText;
use crate::layout::Layout;
use crate::sensitive::wipe_string;

/// Ordered, de-duplicated set of source table names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceTables(Vec<String>);

impl SourceTables {
    /// Parse a comma-separated list. Blank entries are dropped and repeated
    /// names (ignoring case) keep their first spelling.
    pub fn parse(list: &str) -> Self {
        Self::from_names(list.split(','))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tables: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || tables.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                continue;
            }
            tables.push(name.to_string());
        }
        Self(tables)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|t| t.eq_ignore_ascii_case(name.trim()))
    }

    /// Position of a table in the request order, ignoring case.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|t| t.eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for SourceTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Name of the backend model that should serve a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSelector(String);

impl ModelSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelSelector {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Everything the prompt composer needs for one mapping invocation.
#[derive(Debug, Clone, Copy)]
pub struct MappingRequest<'a> {
    pub layout: &'a Layout,
    pub dictionary: &'a ExtractedDictionaryText,
    pub source_tables: &'a SourceTables,
    pub model: &'a ModelSelector,
}

impl<'a> MappingRequest<'a> {
    pub fn new(
        layout: &'a Layout,
        dictionary: &'a ExtractedDictionaryText,
        source_tables: &'a SourceTables,
        model: &'a ModelSelector,
    ) -> Self {
        Self {
            layout,
            dictionary,
            source_tables,
            model,
        }
    }
}

macro_rules! sensitive_text {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            pub fn new(text: impl Into<String>) -> Self {
                Self(text.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Length in characters.
            pub fn char_len(&self) -> usize {
                self.0.chars().count()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({} chars)", stringify!($name), self.char_len())
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                wipe_string(&mut self.0);
            }
        }
    };
}

sensitive_text!(
    /// Composed prompt sent to the model.
    PromptText
);

sensitive_text!(
    /// Unparsed completion text returned by the model.
    RawModelText
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tables_trim_and_dedupe() {
        let tables = SourceTables::parse(" claims_detail, members ,,CLAIMS_DETAIL, ");
        assert_eq!(tables.iter().collect::<Vec<_>>(), vec!["claims_detail", "members"]);
        assert!(tables.contains("Members"));
        assert_eq!(tables.position("members"), Some(1));
        assert_eq!(tables.to_string(), "claims_detail, members");
        assert!(SourceTables::parse(" , ").is_empty());
    }

    #[test]
    fn prompt_debug_reports_length_only() {
        let prompt = PromptText::new("member ssn 123");
        assert_eq!(format!("{prompt:?}"), "PromptText(14 chars)");
    }
}
