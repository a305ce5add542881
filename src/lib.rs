//! # DCL
//!
//! A loader, resolver and serializer for DCL, a small declarative
//! data-container language: tagged, named containers holding ordered
//! fields, with references to other fields, `copy` inheritance and `key`
//! designations.
//!
//! ## Overview
//!
//! Loading runs four stages:
//!
//! - **Lexer** ([`lexer`]): source text to a flat token sequence
//! - **Block structurer** ([`blocks`]): tokens to nested `{ ... }` blocks
//! - **Decoder** ([`decoder`]): blocks to a container tree, then references,
//!   copies and keys are resolved parent before children
//! - **Document** ([`document`]): the resolved, read-only tree with path,
//!   tag and key lookups
//!
//! The [`serializer`] writes a document back to source text, and the
//! [`deserializer`] maps it onto Rust types through serde.
//!
//! ## Basic Usage
//!
//! ```rust
//! use dcl::{Value, load_from_str};
//!
//! let text = r#"
//!     tag::constants Limits
//!     {
//!         Speed: 10;
//!     }
//!     tag::entity Player
//!     {
//!         key Name = "hero";
//!         MaxSpeed: Limits::Speed;
//!         Spawn: [0, 1.5, 2];
//!     }
//! "#;
//!
//! let document = load_from_str(text);
//! assert_eq!(document.get_field("Player::MaxSpeed"), &Value::from(10));
//! assert_eq!(document.find_by_key("hero").map(|c| c.name()), Some("Player"));
//! assert!(document.diagnostics().is_empty());
//! ```
//!
//! ## Inheritance
//!
//! `copy` appends the leaf fields of another container that the target does
//! not already have; explicit fields always win.
//!
//! ```rust
//! use dcl::{Value, load_from_str};
//!
//! let document = load_from_str(
//!     "tag::base Base { Hp: 10; Armor: 2; }
//!      tag::unit Tank { copy Base; Armor: 8; }",
//! );
//! assert_eq!(document.get_field("Tank::Hp"), &Value::from(10));
//! assert_eq!(document.get_field("Tank::Armor"), &Value::from(8));
//! ```
//!
//! ## Serde Integration
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Unit {
//!     #[serde(rename = "Hp")]
//!     hp: u32,
//!     #[serde(rename = "Tags")]
//!     tags: Vec<String>,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Units {
//!     #[serde(rename = "Scout")]
//!     scout: Unit,
//! }
//!
//! let units: Units = dcl::from_str(r#"tag::unit Scout { Hp: 3; Tags: ["fast"]; }"#)?;
//! assert_eq!(units.scout.hp, 3);
//! # Ok::<(), dcl::DclError>(())
//! ```
//!
//! ## Error Handling
//!
//! Loading is best-effort. Constructs that cannot be decoded become `Void`
//! and are recorded as diagnostics with their source position; a strict
//! configuration turns them into an error:
//!
//! ```rust
//! use dcl::{DclError, DecoderConfig, load_from_str_with_config};
//!
//! let config = DecoderConfig::new().with_strict(true);
//! match load_from_str_with_config("Speed: Unknown;", &config) {
//!     Err(DclError::Resolve { diagnostics }) => {
//!         assert_eq!(diagnostics[0].position.column, 8);
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod blocks;
pub mod decoder;
pub mod deserializer;
pub mod document;
pub mod error;
pub mod lexer;
pub mod loader;
pub mod serializer;
pub mod value;

// Re-export main types and functions
pub use decoder::Decoder;
pub use deserializer::{DocumentDeserializer, from_document, from_str};
pub use document::{Container, ContainerId, Document, Field, FieldKind};
pub use error::{DclError, Diagnostic, DiagnosticKind, Position, SerdeError};
pub use lexer::{DclLexer, Token, TokenKind, tokenize};
pub use loader::{
    DecoderConfig, load_from_file, load_from_file_with_config, load_from_str,
    load_from_str_with_config,
};
pub use serializer::serialize;
pub use value::{Value, ValueKind};
