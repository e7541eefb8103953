use std::sync::Arc;

use crate::descriptors::TagDescriptor;

/// The tag helpers in scope for one document after its directives were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagHelperContext {
    prefix: Option<String>,
    descriptors: Vec<Arc<TagDescriptor>>,
}

impl TagHelperContext {
    /// Create a context
    ///
    /// ## Arguments
    /// * `prefix` - Prefix an element name must carry to be considered for binding
    /// * `descriptors` - Descriptors in scope, in resolution order
    #[must_use]
    pub fn new(prefix: Option<String>, descriptors: Vec<Arc<TagDescriptor>>) -> Self {
        TagHelperContext {
            prefix: prefix.filter(|prefix| !prefix.is_empty()),
            descriptors,
        }
    }

    /// The element prefix, if any
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Descriptors in scope
    #[must_use]
    pub fn descriptors(&self) -> &[Arc<TagDescriptor>] {
        &self.descriptors
    }
}
