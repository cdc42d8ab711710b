//! Parser and reference resolver for **Lang**, the attribute/set text
//! format used by the toolkit for font metadata, widget configs and
//! translation tables.
//!
//! The crate has no graphics dependencies, so tools can read Lang files
//! without pulling in the rendering layers.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`line`] | `Line`, `classify`: one source line to one instruction |
//! | [`builder`] | `Builder`, `build`: lines to a [`RawTree`] |
//! | [`resolve`] | `resolve`: [`RawTree`] to [`Tree`] |
//! | [`tree`] | `RawTree`, `Tree`, `Node`, `Reference` |
//! | [`encoding`] | `%=` declaration support |
//! | [`load`] | `Loader` and the `load`/`loads` shorthands |
//! | [`error`] | `LangError`, `Error` |
//!
//! # Syntax
//!
//! ```text
//! %=utf-8
//! :: comments take a whole line
//! $menu
//!   @title:Main menu
//!   $$start
//!     @label
//!     Start
//!     &game
//!   $$!
//!   .~@heading:title
//! $!
//! ~@caption:menu.start.label
//! @raw
//! \$not a set
//! ```
//!
//! - `%=` names the file's encoding; a mismatch decodes the bytes again.
//! - `$` opens a set one level down per marker; a set at the same or a
//!   lower level closes the open ones first. `$$!` closes level 2 and deeper.
//! - `@name:value` is a one-line attribute. `@name` takes the lines that
//!   follow, each ending in a newline unless it starts with `&`. A leading
//!   `\` keeps the rest of the line as text.
//! - `~@name:a.b` copies a value starting from the root, `.~@name:b` from
//!   the current set. Text assigned to a reference is appended to it.
//!
//! # Quick start
//!
//! ```rust
//! let tree = pgt_lang::loads("$a\n  @x:1\n$!\n~@y:a.x\n").unwrap();
//! assert_eq!(tree.text("a.x"), Some("1"));
//! assert_eq!(tree.text("y"), Some("1"));
//! ```

pub mod builder;
pub mod encoding;
pub mod error;
pub mod line;
pub mod load;
pub mod resolve;
pub mod tree;

pub use builder::{build, BuildError};
pub use error::{Error, LangError, Result};
pub use load::{load, load_raw, loads, loads_raw, Loader};
pub use resolve::resolve;
pub use tree::{Node, RawNode, RawTree, Reference, Scope, Tree};
