//! Lossless identifier encoding for the spoolyard API.
//!
//! Storage keys are 64-bit integers. JSON consumers with a double-precision
//! number type (browsers, most scripting runtimes) silently round anything
//! above 2^53, so identifiers never leave the server as JSON numbers. They are
//! rendered as base-10 strings instead and parsed back strictly on input.
//!
//! Two entry points cover the two ways JSON gets produced:
//!
//! - [`Id`] is the typed path. Its `Serialize` impl always writes a string, so
//!   any struct holding an `Id` (its own or one nested several levels down)
//!   is encoded correctly no matter how the outer serializer is configured.
//! - [`encode_graph`] is the untyped path for `serde_json::Value` trees.
//!   [`verify_graph`] checks that a tree satisfies the string contract.
//!
//! ```
//! use spoolyard_ids::{decode, encode, Id};
//!
//! let id = Id::new(1_062_937_393_938_825_217).unwrap();
//! assert_eq!(encode(id), "1062937393938825217");
//! assert_eq!(decode("1062937393938825217").unwrap(), id);
//! assert!(decode("1.5").is_err());
//! ```

mod error;
mod graph;
mod id;

pub use error::{GraphViolation, IdError};
pub use graph::{encode_graph, is_identifier_key, verify_graph};
pub use id::{decode, encode, Id};
