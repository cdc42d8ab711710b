use std::path::PathBuf;

use clap::Parser;

/// Load a Lang file and print its contents.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Lang file to load
    pub input: PathBuf,

    /// Encoding tried first; a `%=` declaration in the file overrides it
    #[arg(short, long, default_value = pgt_lang::encoding::DEFAULT_ENCODING)]
    pub encoding: String,

    /// Print the tree before references are resolved
    #[arg(long, conflicts_with = "get")]
    pub raw: bool,

    /// Print only the value at this dotted path
    #[arg(short, long, value_name = "PATH")]
    pub get: Option<String>,

    /// Print JSON instead of the indented listing
    #[arg(long)]
    pub json: bool,

    /// Log filter (off, error, warn, info, debug, trace); defaults to RUST_LOG
    #[arg(long)]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["lang", "menu.lang"]).unwrap();
        assert_eq!(args.input, PathBuf::from("menu.lang"));
        assert_eq!(args.encoding, "utf-8");
        assert!(!args.raw && !args.json);
        assert!(args.get.is_none());
    }

    #[test]
    fn raw_conflicts_with_get() {
        assert!(Args::try_parse_from(["lang", "x.lang", "--raw", "--get", "a.b"]).is_err());
    }
}
