use thiserror::Error;

use crate::engine::{Capability, PhaseKind};

macro_rules! config_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Configuration {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Configuration {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant describes a defect in how the pipeline was wired or driven, never a problem
/// with the template being compiled. Problems with template content are reported as
/// [`crate::Diagnostic`] values attached to the document, its nodes or its descriptors, and
/// compilation continues past them.
///
/// # Error Categories
///
/// ## Pipeline Wiring
/// - [`Error::MissingDocumentDependency`] - A phase ran before the artifact it consumes existed
/// - [`Error::MissingFeature`] - A feature required a sibling capability nobody registered
/// - [`Error::NotInitialized`] - A phase or feature was used before the engine bound it
/// - [`Error::Configuration`] - Any other wiring defect, with the source location that found it
///
/// ## Intermediate Tree
/// - [`Error::NodeNotFound`] - A node id does not belong to the tree
/// - [`Error::InvalidNodeReference`] - A recorded `(parent, node)` pair no longer holds
///
/// # Examples
///
/// ```rust
/// use tagscope::{Document, Engine, Error, SourceDocument};
///
/// let engine = Engine::create()?;
/// let mut document = Document::new(SourceDocument::new("index.tag", "<p>hello</p>"));
///
/// match engine.process(&mut document) {
///     Ok(()) => {
///         let bytes = document.generated_output().map_or(0, |o| o.code().len());
///         println!("generated {bytes} bytes");
///     }
///     Err(Error::MissingDocumentDependency { phase, artifact }) => {
///         eprintln!("{phase} ran without {artifact}");
///     }
///     Err(e) => eprintln!("pipeline defect: {e}"),
/// }
/// # Ok::<(), tagscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A phase required a document artifact which no earlier phase produced.
    ///
    /// Phases run in a fixed order and each one consumes what the previous one wrote. This
    /// error means the engine was assembled with a phase missing, or a phase was executed
    /// directly against a document that never went through its predecessors.
    ///
    /// # Fields
    ///
    /// * `phase` - The phase which detected the missing artifact
    /// * `artifact` - Name of the artifact slot that was empty
    #[error("The '{phase}' phase requires the document to contain a {artifact}")]
    MissingDocumentDependency {
        /// The phase that failed
        phase: PhaseKind,
        /// The missing artifact
        artifact: &'static str,
    },

    /// A feature looked up a sibling capability during initialization and found none.
    #[error("'{requester}' requires a feature providing {capability:?}")]
    MissingFeature {
        /// Name of the feature or phase performing the lookup
        requester: &'static str,
        /// The capability that has no registered provider
        capability: Capability,
    },

    /// A phase or feature was executed before it was bound to an engine.
    #[error("'{0}' was used before the engine initialized it")]
    NotInitialized(&'static str),

    /// A node id does not address a node of the tree it was used with.
    #[error("Node {0} does not exist in this tree")]
    NodeNotFound(usize),

    /// A recorded node reference no longer describes a child of its parent.
    ///
    /// References are produced by walks and consumed afterwards. If the tree was restructured
    /// in between so the node is no longer a child of the recorded parent, the reference is
    /// rejected rather than detaching an unrelated node.
    #[error("Node {node} is not a child of node {parent}")]
    InvalidNodeReference {
        /// The recorded parent
        parent: usize,
        /// The recorded child
        node: usize,
    },

    /// The pipeline was configured in an inconsistent way.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the wiring defect
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Configuration - {file}:{line}: {message}")]
    Configuration {
        /// The message to be printed for the Configuration error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
