//! CJMOD syntax-extension engine.
//!
//! Plugin authors describe a CHTL-JS call with a pattern such as
//! `printMylove({ url: $, mode: $ })`, bind a transform to each
//! placeholder, and get JavaScript back for every matching call in a
//! script fragment.
//!
//! The pieces, in lifecycle order:
//!
//! - [`syntax_analys`] turns a pattern into a [`Syntax`] with ordered [`Args`]
//! - [`Args::bind`] attaches a [`Transform`] to a placeholder
//! - [`Syntax::transform`] optionally registers an output template
//! - [`CjmodScanner`] finds the keyword and walks the fragment
//! - [`Syntax::match_call`] fills placeholders from the source
//! - [`generate_code`] renders the output
//!
//! [`ChtljsFunction`] and [`simple::generate`] wrap the whole sequence.
//!
//! ```
//! use chtl_cjmod::{ChtljsFunction, Transform, ValueKind};
//!
//! let mut function = ChtljsFunction::new("printMylove", &["url", "mode"])
//!     .with_bind("url", Transform::new(ValueKind::Str, |v| format!("\"{v}\"")))
//!     .with_template("renderImage({url}, {mode})");
//! let generated = function
//!     .process("printMylove({ url: 'a.png', mode: ASCII });")
//!     .unwrap();
//! assert_eq!(generated.code, r#"renderImage("a.png", ASCII)"#);
//! ```

mod args;
mod error;
mod function;
mod generate;
mod lookup;
mod matcher;
pub mod simple;
mod syntax;
mod token;
mod value;

pub use args::{Arg, ArgRef, Args, BindOutcome, Transform};
pub use error::CjmodError;
pub use function::{ChtljsFunction, Generated};
pub use generate::generate_code;
pub use lookup::{CjmodScanner, Policy};
pub use matcher::CallMatch;
pub use syntax::{syntax_analys, Piece, Syntax, DEFAULT_IGNORE};
pub use token::{tokenize, Token, TokenKind};
pub use value::{is_function, is_object, unquote, ArgValue, TypeHint, ValueKind};
