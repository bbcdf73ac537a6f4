//! Unified fragment scanner for CHTL sources.
//!
//! Splits one CHTL source file into an ordered list of typed
//! [`Fragment`]s that exactly tile the input:
//!
//! - host markup ([`FragmentKind::Chtl`])
//! - `style { ... }` and `<style>` bodies ([`FragmentKind::Css`])
//! - `script { ... }` and `<script>` bodies, classified as
//!   [`FragmentKind::ChtlJs`] when they use CHTL-JS features or a
//!   registered keyword, and [`FragmentKind::Js`] otherwise
//!
//! # Usage
//!
//! ```
//! use chtl_scanner::{FragmentKind, UnifiedScanner};
//!
//! let mut scanner = UnifiedScanner::new();
//! scanner.register_keyword("printMylove");
//! let fragments = scanner
//!     .scan("div { script { printMylove({ url: 'a.png' }); } }", "index.chtl")
//!     .unwrap();
//! assert_eq!(fragments[1].kind(), FragmentKind::ChtlJs);
//! ```
//!
//! This crate has no `chtl_*` dependencies.

mod config;
mod cursor;
mod fragment;
mod js_regex;
mod keywords;
mod probe;
mod scan_error;
mod scanner;
mod source_buffer;

pub use config::ScannerConfig;
pub use cursor::Cursor;
pub use fragment::{validate_coverage, CoverageGap, Fragment, FragmentKind};
pub use keywords::{
    is_ident_continue, is_ident_start, is_identifier, KeywordRegistry, BUILTIN_KEYWORDS,
};
pub use probe::{
    has_arrow_operators, has_chtljs_function_calls, has_enhanced_selectors,
    has_virtual_object_syntax, ScriptFeatures,
};
pub use scan_error::{Construct, ScanError};
pub use scanner::{ScanStats, UnifiedScanner};
pub use source_buffer::SourceBuffer;
