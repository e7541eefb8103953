//! Indexed binding with tag helper prefixes.

use std::{collections::HashMap, sync::Arc};

use crate::{
    binding::{bind, BindingResult, ElementQuery},
    descriptors::{starts_with, TagDescriptor},
};

/// Binds elements against the tag helpers available to one document.
///
/// Descriptors are indexed by the lowercased tag names of their rules; descriptors with a
/// catch-all rule are candidates for every element. When a prefix is set only elements
/// written with it are considered, and the prefix is stripped from element and parent names
/// before matching.
#[derive(Debug, Clone, Default)]
pub struct TagHelperBinder {
    prefix: Option<String>,
    descriptors: Vec<Arc<TagDescriptor>>,
    by_tag: HashMap<String, Vec<usize>>,
    catch_all: Vec<usize>,
}

impl TagHelperBinder {
    /// Index `descriptors` for lookups with `prefix`
    #[must_use]
    pub fn new(prefix: Option<&str>, descriptors: &[Arc<TagDescriptor>]) -> Self {
        let mut by_tag: HashMap<String, Vec<usize>> = HashMap::new();
        let mut catch_all = Vec::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            for rule in descriptor.tag_matching_rules() {
                if rule.is_catch_all() {
                    if catch_all.last() != Some(&index) {
                        catch_all.push(index);
                    }
                    continue;
                }

                let bucket = by_tag.entry(rule.tag_name().to_ascii_lowercase()).or_default();
                if bucket.last() != Some(&index) {
                    bucket.push(index);
                }
            }
        }

        TagHelperBinder {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            descriptors: descriptors.to_vec(),
            by_tag,
            catch_all,
        }
    }

    /// The tag helper prefix, if any
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// All indexed descriptors
    #[must_use]
    pub fn descriptors(&self) -> &[Arc<TagDescriptor>] {
        &self.descriptors
    }

    /// Strip the prefix from `name`, or `None` if `name` is not written with it
    fn strip<'n>(&self, name: &'n str, case_sensitive: bool) -> Option<&'n str> {
        match &self.prefix {
            None => Some(name),
            Some(prefix) => {
                if name.len() > prefix.len()
                    && name.is_char_boundary(prefix.len())
                    && starts_with(name, prefix, case_sensitive)
                {
                    Some(&name[prefix.len()..])
                } else {
                    None
                }
            }
        }
    }

    /// Candidate descriptors for `tag_name`, in registration order
    fn candidates(&self, tag_name: &str) -> Vec<Arc<TagDescriptor>> {
        let named = self
            .by_tag
            .get(&tag_name.to_ascii_lowercase())
            .map_or(&[][..], Vec::as_slice);

        let mut indices: Vec<usize> = named.iter().chain(&self.catch_all).copied().collect();
        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .map(|index| Arc::clone(&self.descriptors[index]))
            .collect()
    }

    /// Bind `query`.
    ///
    /// Returns `None` when the element is not written with the prefix, so it can never be a
    /// tag helper. Otherwise returns the binding result, which may be unbound.
    #[must_use]
    pub fn get_binding(&self, query: &ElementQuery<'_>) -> Option<BindingResult> {
        let Some(tag_name) = self.strip(query.tag_name, query.case_sensitive) else {
            log::trace!("<{}> lacks tag helper prefix", query.tag_name);
            return None;
        };

        let candidates = self.candidates(tag_name);
        if candidates.is_empty() {
            return Some(BindingResult::default());
        }

        let parent_tag = query
            .parent_tag
            .map(|parent| self.strip(parent, query.case_sensitive).unwrap_or(parent));
        let stripped = ElementQuery {
            tag_name,
            parent_tag,
            attributes: query.attributes.clone(),
            case_sensitive: query.case_sensitive,
            span: query.span,
        };
        Some(bind(&candidates, &stripped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::{TagDescriptorBuilder, TAG_HELPER_KIND};

    fn descriptor(name: &str, tag: &str) -> Arc<TagDescriptor> {
        Arc::new(
            TagDescriptorBuilder::new(TAG_HELPER_KIND, name, "Lib")
                .tag_matching_rule(|rule| rule.tag_name(tag))
                .build(),
        )
    }

    #[test]
    fn test_index_and_catch_all_keep_order() {
        let descriptors = vec![
            descriptor("Any", "*"),
            descriptor("Div", "div"),
            descriptor("Span", "span"),
            descriptor("Div2", "DIV"),
        ];
        let binder = TagHelperBinder::new(None, &descriptors);

        let result = binder.get_binding(&ElementQuery::new("div")).unwrap();
        let names: Vec<&str> = result.descriptors().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Any", "Div", "Div2"]);
    }

    #[test]
    fn test_prefix_is_required_and_stripped() {
        let descriptors = vec![descriptor("Div", "div")];
        let binder = TagHelperBinder::new(Some("th:"), &descriptors);

        assert!(binder.get_binding(&ElementQuery::new("div")).is_none());
        assert!(binder.get_binding(&ElementQuery::new("th:")).is_none());
        assert!(binder
            .get_binding(&ElementQuery::new("th:div"))
            .is_some_and(|r| r.is_bound()));
        assert!(binder
            .get_binding(&ElementQuery::new("TH:div"))
            .is_some_and(|r| r.is_bound()));
        assert!(binder
            .get_binding(&ElementQuery::new("TH:div").case_sensitive(true))
            .is_none());
    }

    #[test]
    fn test_prefixed_parent_is_stripped() {
        let row = Arc::new(
            TagDescriptorBuilder::new(TAG_HELPER_KIND, "Row", "Lib")
                .tag_matching_rule(|rule| rule.tag_name("tr").parent_tag("table"))
                .build(),
        );
        let binder = TagHelperBinder::new(Some("th:"), &[row]);

        let query = ElementQuery::new("th:tr").parent("th:table");
        assert!(binder.get_binding(&query).is_some_and(|r| r.is_bound()));
    }

    #[test]
    fn test_empty_prefix_is_no_prefix() {
        let binder = TagHelperBinder::new(Some(""), &[descriptor("P", "p")]);
        assert_eq!(binder.prefix(), None);
        assert!(binder
            .get_binding(&ElementQuery::new("p"))
            .is_some_and(|r| r.is_bound()));
        assert!(binder
            .get_binding(&ElementQuery::new("b"))
            .is_some_and(|r| !r.is_bound()));
    }
}
