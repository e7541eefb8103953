// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # tagscope
//!
//! A phased compilation engine for markup templates with server-side tag helpers.
//!
//! `tagscope` turns a template source (HTML-like markup with `@expression` interpolation and
//! `@directive` lines) into generated render code. Elements in the template are matched
//! against *tag descriptors*, declarative descriptions of server-side components, and every
//! element a descriptor binds is rewritten into a tag helper invocation.
//!
//! # Architecture
//!
//! The crate is organized around a fixed pipeline and a set of pluggable features:
//!
//! - **Descriptors** ([`descriptors`]) - Immutable tag descriptors, their builders, structural
//!   hashing and a process-wide deduplicating cache
//! - **Binding** ([`binding`]) - Matching elements against descriptor rules
//! - **Syntax** ([`syntax`]) - The syntax tree and the reference markup parser
//! - **Intermediate tree** ([`ir`]) - An arena-backed tree rewritten by the later phases
//! - **Document** ([`document`]) - The per-compilation container every phase reads and writes
//! - **Engine** ([`engine`]) - Phases, features, options composition and the builder
//! - **Passes** ([`passes`]) - The default features: directives, classifiers, the tag helper
//!   binder, optimizations and the reference target writer
//! - **Diagnostics** ([`diagnostics`]) - Content problems, never fatal to compilation
//!
//! # Quick Start
//!
//! ```rust
//! use tagscope::prelude::*;
//!
//! let engine = Engine::create()?;
//! let mut document = Document::new(SourceDocument::new("index.tag", "<p>Hello @Name</p>"));
//! engine.process(&mut document)?;
//!
//! let output = document.generated_output().expect("target lowering ran");
//! assert!(output.code().contains("WriteExpression(Name)"));
//! assert!(!document.has_errors());
//! # Ok::<(), tagscope::Error>(())
//! ```
//!
//! ## Binding Tag Helpers
//!
//! Descriptors are attached to the document; `@addTagHelper` directives in the source select
//! which of them the template may use.
//!
//! ```rust
//! use std::sync::Arc;
//! use tagscope::prelude::*;
//!
//! let input = Arc::new(
//!     TagDescriptorBuilder::new(TAG_HELPER_KIND, "TextInput", "Forms")
//!         .tag_matching_rule(|rule| rule.tag_name("input"))
//!         .bound_attribute(|attribute| attribute.name("value").type_name("System.String"))
//!         .build(),
//! );
//!
//! let source = "@addTagHelper *, Forms\n<input value=\"x\" />";
//! let mut document = Document::new(SourceDocument::new("form.tag", source));
//! document.set_tag_helpers(vec![input]);
//!
//! Engine::create()?.process(&mut document)?;
//! let code = document.generated_output().map(|o| o.code()).unwrap_or_default();
//! assert!(code.contains("CreateTagHelper(Forms.TextInput)"));
//! # Ok::<(), tagscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Operations that can fail because the pipeline is wired incorrectly return
//! [`Result<T, Error>`](Result). Problems with the template itself are never errors: they are
//! reported as [`Diagnostic`] values on the document, its nodes or its descriptors.
//!
//! # Thread Safety
//!
//! [`Engine`] is immutable after construction and `Send + Sync`. One engine can process many
//! documents concurrently, see [`Engine::process_batch`]. The [`descriptors::DescriptorCache`]
//! is safe for concurrent use.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use tagscope::prelude::*;
///
/// let engine = Engine::create()?;
/// # Ok::<(), tagscope::Error>(())
/// ```
pub mod prelude;

/// Matching elements against tag descriptors.
pub mod binding;

/// Tag descriptors, matching rules and the descriptor cache.
pub mod descriptors;

/// Content diagnostics and the factory for every diagnostic the core reports.
pub mod diagnostics;

/// The per-compilation document and its artifacts.
pub mod document;

/// The phased engine, its features and options.
///
/// # Examples
///
/// ```rust
/// use tagscope::engine::{Capability, Engine};
///
/// let engine = Engine::create()?;
/// assert!(engine.feature_index().has(Capability::SyntaxParser));
/// # Ok::<(), tagscope::Error>(())
/// ```
pub mod engine;

/// The intermediate tree.
pub mod ir;

/// Default features registered by [`EngineBuilder::with_defaults`].
pub mod passes;

/// Syntax trees and the reference markup parser.
pub mod syntax;

/// Shared helpers: checksums and hex encoding.
pub mod utils;

/// `tagscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use tagscope::{Document, Engine, Result, SourceDocument};
///
/// fn render(source: &str) -> Result<String> {
///     let mut document = Document::new(SourceDocument::from_content(source));
///     Engine::create()?.process(&mut document)?;
///     Ok(document.generated_output().map(|o| o.code().to_string()).unwrap_or_default())
/// }
/// # assert!(render("<p/>").is_ok());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `tagscope` Error type
///
/// Wiring defects of the pipeline. Template content problems are [`Diagnostic`]s instead.
pub use error::Error;

/// The compilation engine and its builder
pub use engine::{Engine, EngineBuilder, EngineConfig};

/// The per-compilation container and its source
pub use document::{Document, SourceDocument, SourceSpan};

/// Content diagnostics
pub use diagnostics::{Diagnostic, HasDiagnostics, Severity};

/// Tag descriptors
pub use descriptors::{TagDescriptor, TagDescriptorBuilder};
