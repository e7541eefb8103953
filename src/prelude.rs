//! # tagscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the tagscope library. Import it to get quick access to the engine, the document,
//! descriptor builders and the feature traits needed to write extensions.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tagscope operations
pub use crate::Error;

/// The result type used throughout tagscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The compilation engine, its builder and configuration
pub use crate::engine::{Engine, EngineBuilder, EngineConfig, Extension};

/// The per-compilation container and its inputs and outputs
pub use crate::document::{Document, GeneratedOutput, SourceDocument, SourceSpan, TagHelperContext};

// ================================================================================================
// Descriptors and Binding
// ================================================================================================

/// Tag descriptors and their builders
pub use crate::descriptors::{
    DescriptorCache, MatchingRule, NameComparisonMode, TagDescriptor, TagDescriptorBuilder,
    TagStructure, ValueComparisonMode, TAG_HELPER_KIND,
};

/// Element binding
pub use crate::binding::{bind, BindingResult, ElementQuery, TagHelperBinder};

// ================================================================================================
// Extension Points
// ================================================================================================

/// Feature traits implemented by extensions
pub use crate::engine::{
    Capability, ConfigureCodeGeneration, ConfigureParserOptions, DocumentClassifierPass,
    EngineFeature, Feature, IrPass, PassContext, PhaseKind, TargetWriter,
};

/// Options produced by composition
pub use crate::engine::{
    CodeGenerationOptions, CodeGenerationOptionsBuilder, DirectiveDescriptor, DirectiveKind,
    DirectiveTokenKind, ParserOptions, ParserOptionsBuilder,
};

/// The intermediate tree
pub use crate::ir::{IrNode, IrTree, NodeId, NodeKind};

// ================================================================================================
// Diagnostics
// ================================================================================================

/// Content diagnostics
pub use crate::diagnostics::{Diagnostic, HasDiagnostics, Severity};
