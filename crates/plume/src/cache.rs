//! Parsed message template cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use plume_template::MessageTemplate;

use crate::selflog;

/// Entries held before the cache is cleared.
pub const MAX_CACHE_ITEMS: usize = 1000;

/// Longer templates are parsed every time.
pub const MAX_CACHED_TEMPLATE_LENGTH: usize = 1024;

/// Parses `text`, reporting templates that mix positional and named
/// properties.
pub fn parse_template(text: &str) -> MessageTemplate {
    let template = MessageTemplate::parse(text);
    if template.is_malformed() {
        selflog!("Message template is malformed: {}", text);
    }
    template
}

/// A bounded cache of parsed templates keyed by source text.
///
/// Lookups take a shared lock. When the cache is full it is emptied
/// before the next insert.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: RwLock<HashMap<String, Arc<MessageTemplate>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, text: &str) -> Arc<MessageTemplate> {
        if text.chars().count() > MAX_CACHED_TEMPLATE_LENGTH {
            return Arc::new(parse_template(text));
        }

        if let Some(template) = self.templates.read().get(text) {
            return Arc::clone(template);
        }

        let template = Arc::new(parse_template(text));
        let mut templates = self.templates.write();
        if templates.len() >= MAX_CACHE_ITEMS {
            templates.clear();
        }
        templates.insert(text.to_string(), Arc::clone(&template));
        template
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_repeated_parse_shares_template() {
        let cache = TemplateCache::new();
        let a = cache.parse("Hello {Name}");
        let b = cache.parse("Hello {Name}");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_long_templates_bypass() {
        let cache = TemplateCache::new();
        let long = "x".repeat(MAX_CACHED_TEMPLATE_LENGTH + 1);
        let a = cache.parse(&long);
        let b = cache.parse(&long);
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(cache.is_empty());

        let limit = "y".repeat(MAX_CACHED_TEMPLATE_LENGTH);
        cache.parse(&limit);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cleared_when_full() {
        let cache = TemplateCache::new();
        for i in 0..MAX_CACHE_ITEMS {
            cache.parse(&format!("template {i}"));
        }
        assert_eq!(cache.len(), MAX_CACHE_ITEMS);
        cache.parse("one more");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_parses_agree() {
        let cache = TemplateCache::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for i in 0..50 {
                        let t = cache.parse(&format!("{{P{i}}}"));
                        assert_eq!(t.properties()[0].name(), format!("P{i}"));
                    }
                });
            }
        });
        assert_eq!(cache.len(), 50);
    }

    #[test]
    #[serial(selflog)]
    fn test_malformed_template_reported() {
        let lines = selflog::testing::capture();
        let template = parse_template("{0} and {Name}");
        selflog::disable();

        assert!(template.is_malformed());
        assert!(lines
            .lock()
            .iter()
            .any(|l| l.ends_with("Message template is malformed: {0} and {Name}")));
    }
}
