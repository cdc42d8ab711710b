use std::fs;
use std::path::Path;

use crate::builder::{build, BuildError};
use crate::encoding::{decode, decode_lossy, DEFAULT_ENCODING};
use crate::error::{Error, LangError, Result, STRING_SOURCE};
use crate::resolve::resolve;
use crate::tree::{RawTree, Tree};

// ── Loader ────────────────────────────────────────────────────────────────

/// Loads Lang documents from files, bytes or strings.
///
/// ```rust
/// use pgt_lang::Loader;
///
/// let tree = Loader::new()
///     .source_name("inline")
///     .load_str("$button\n  @label:OK\n")
///     .unwrap();
/// assert_eq!(tree.text("button.label"), Some("OK"));
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    encoding: String,
    source_name: Option<String>,
}

impl Loader {
    pub fn new() -> Self {
        Self { encoding: DEFAULT_ENCODING.to_owned(), source_name: None }
    }

    /// Encoding used for the first decoding attempt.
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    /// Name shown in error messages. Files default to their path,
    /// in-memory input to `<string>`.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Tree> {
        Ok(resolve(&self.load_file_raw(path)?)?)
    }

    pub fn load_file_raw(&self, path: impl AsRef<Path>) -> Result<RawTree> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
        let name = match &self.source_name {
            Some(name) => name.clone(),
            None => path.display().to_string(),
        };
        log::debug!("loading {name} ({} bytes)", bytes.len());
        self.raw_from_bytes(&bytes, &name)
    }

    pub fn load_bytes(&self, input: impl AsRef<[u8]>) -> Result<Tree> {
        Ok(resolve(&self.load_bytes_raw(input)?)?)
    }

    pub fn load_bytes_raw(&self, input: impl AsRef<[u8]>) -> Result<RawTree> {
        self.raw_from_bytes(input.as_ref(), self.memory_name())
    }

    /// Load already decoded text.
    ///
    /// The text is taken to be decoded with the loader's encoding. A `%=`
    /// declaration naming another encoding decodes its UTF-8 bytes again.
    pub fn load_str(&self, text: &str) -> Result<Tree> {
        Ok(resolve(&self.load_str_raw(text)?)?)
    }

    pub fn load_str_raw(&self, text: &str) -> Result<RawTree> {
        let name = self.memory_name();
        match build(text, &self.encoding, name) {
            Ok(tree) => Ok(tree),
            Err(BuildError::Lang(err)) => Err(err.into()),
            Err(BuildError::Redecode { encoding, .. }) => {
                self.redecode(text.as_bytes(), &encoding, name)
            }
        }
    }

    fn memory_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or(STRING_SOURCE)
    }

    fn raw_from_bytes(&self, bytes: &[u8], name: &str) -> Result<RawTree> {
        let text = match decode(bytes, &self.encoding, name) {
            Ok(text) => text,
            Err(err @ Error::Decode { .. }) => {
                // The bytes may still declare the encoding they are really in.
                let lossy = decode_lossy(bytes, &self.encoding);
                return match build(&lossy, &self.encoding, name) {
                    Err(BuildError::Redecode { encoding, .. }) => {
                        self.redecode(bytes, &encoding, name)
                    }
                    _ => Err(err),
                };
            }
            Err(err) => return Err(err),
        };
        match build(&text, &self.encoding, name) {
            Ok(tree) => Ok(tree),
            Err(BuildError::Lang(err)) => Err(err.into()),
            Err(BuildError::Redecode { encoding, .. }) => self.redecode(bytes, &encoding, name),
        }
    }

    /// Decode `bytes` as `encoding` and build once more. A second mismatch
    /// means the declarations disagree with each other.
    fn redecode(&self, bytes: &[u8], encoding: &str, name: &str) -> Result<RawTree> {
        log::debug!("{name}: declared encoding '{encoding}', decoding again");
        let text = decode(bytes, encoding, name)?;
        match build(&text, encoding, name) {
            Ok(tree) => Ok(tree),
            Err(BuildError::Lang(err)) => Err(err.into()),
            Err(BuildError::Redecode { encoding, line }) => Err(LangError::new(
                line,
                format!("conflicting encoding declaration '{encoding}'"),
                name,
            )
            .into()),
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

// ── Shorthands ────────────────────────────────────────────────────────────

/// Load and resolve the file at `path` as UTF-8.
pub fn load(path: impl AsRef<Path>) -> Result<Tree> {
    Loader::new().load_file(path)
}

/// Load the file at `path` without resolving references.
pub fn load_raw(path: impl AsRef<Path>) -> Result<RawTree> {
    Loader::new().load_file_raw(path)
}

/// Parse and resolve `text`.
pub fn loads(text: &str) -> Result<Tree> {
    Loader::new().load_str(text)
}

/// Parse `text` without resolving references.
pub fn loads_raw(text: &str) -> Result<RawTree> {
    Loader::new().load_str_raw(text)
}
