//! Block → record write-through.
//!
//! Some free-text blocks also feed a structured field: editing the headline
//! block updates `userInfo.headLine`. Only explicitly bound blocks write back;
//! everything else lives solely in block content.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::blocks::BlockId;
use crate::template::{FieldPath, PathSegment};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("email pattern is valid"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d\s-]{7,}").expect("phone pattern is valid"));

/// How the plain text of a block becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Plain,
    /// First e-mail address in the text, or the whole text.
    Email,
    /// First phone-like digit run in the text, or the whole text.
    Phone,
}

impl Extractor {
    pub fn extract(self, text: &str) -> String {
        let pattern = match self {
            Extractor::Plain => return text.to_string(),
            Extractor::Email => &*EMAIL,
            Extractor::Phone => &*PHONE,
        };
        pattern
            .find(text)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub path: FieldPath,
    pub extractor: Extractor,
}

#[derive(Debug, Clone, Default)]
pub struct FieldBindings {
    by_block: HashMap<BlockId, FieldBinding>,
}

impl FieldBindings {
    /// Bindings for the personal-info blocks of the default template.
    pub fn defaults() -> Self {
        let mut bindings = Self::default();
        bindings.bind("user-headline", user_info("headLine"), Extractor::Plain);
        bindings.bind("user-firstname", user_info("firstName"), Extractor::Plain);
        bindings.bind("user-lastname", user_info("lastName"), Extractor::Plain);
        bindings.bind("user-email", user_info("email"), Extractor::Email);
        bindings.bind("user-phone", user_info("phoneNumber"), Extractor::Phone);
        bindings
    }

    pub fn bind(&mut self, block_id: impl Into<BlockId>, path: FieldPath, extractor: Extractor) {
        self.by_block
            .insert(block_id.into(), FieldBinding { path, extractor });
    }

    pub fn get(&self, block_id: &BlockId) -> Option<&FieldBinding> {
        self.by_block.get(block_id)
    }
}

fn user_info(field: &str) -> FieldPath {
    FieldPath::from_segments(vec![
        PathSegment::Field("userInfo".to_string()),
        PathSegment::Field(field.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_extractor_pulls_address() {
        assert_eq!(
            Extractor::Email.extract("Email: sam@example.com (work)"),
            "sam@example.com"
        );
        assert_eq!(Extractor::Email.extract("no address"), "no address");
    }

    #[test]
    fn test_phone_extractor_pulls_digits() {
        assert_eq!(Extractor::Phone.extract("Phone: 188-8008-8888 "), "188-8008-8888");
        assert_eq!(Extractor::Phone.extract("call me"), "call me");
    }

    #[test]
    fn test_default_bindings() {
        let bindings = FieldBindings::defaults();
        let headline = bindings.get(&"user-headline".into()).unwrap();
        assert_eq!(headline.path.to_string(), "userInfo.headLine");
        assert_eq!(headline.extractor, Extractor::Plain);
        assert_eq!(
            bindings.get(&"user-phone".into()).unwrap().path.to_string(),
            "userInfo.phoneNumber"
        );
        assert!(bindings.get(&"heading-work".into()).is_none());
    }
}
