//! tinfer
//!
//! Structural, scope-aware type inference for JavaScript-style programs.
//! Programs arrive as ESTree JSON produced by an external parser.
//!
//! # Example
//!
//! ```
//! use tinfer::frontend::ast::parse_program;
//! use tinfer::infer;
//!
//! // var x = 1;
//! let program = parse_program(r#"{
//!     "type": "Program", "start": 0, "end": 10,
//!     "body": [{
//!         "type": "VariableDeclaration", "kind": "var", "start": 0, "end": 10,
//!         "declarations": [{
//!             "type": "VariableDeclarator", "start": 4, "end": 9,
//!             "id": {"type": "Identifier", "name": "x", "start": 4, "end": 5},
//!             "init": {"type": "Literal", "value": 1, "start": 8, "end": 9}
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! let inference = infer(&program, Default::default());
//! assert!(inference.is_ok());
//! assert_eq!(inference.get("x").unwrap().to_string(), "Number");
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use frontend::core::type_system::{print_type, Type, TypeVar};
pub use frontend::typecheck::{Inference, TypeError, TypeResult};
pub use frontend::{infer, Checker};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "tinfer";
