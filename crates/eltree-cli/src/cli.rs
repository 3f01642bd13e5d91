use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "eltree",
    about = "Store and query markup documents in an embedded tree store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store file, overriding `store.path` from the config file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a markup file and store it as a new document
    Import(ImportArgs),
    /// Print a document as markup
    Render(DocArgs),
    /// Print the text content of a document
    Text(DocArgs),
    /// List stored documents
    Ls,
    /// Print an outline of a document
    Tree(DocArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// Document name
    pub name: String,
    /// Markup file to read
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DocArgs {
    /// Document name
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "eltree", "render", "doc", "--db", "store.eltree", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Render(ref a) if a.name == "doc"));
        assert_eq!(cli.db, Some(PathBuf::from("store.eltree")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn import_takes_name_and_file() {
        let cli = Cli::try_parse_from(["eltree", "import", "book", "book.xml"]).unwrap();
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.name, "book");
                assert_eq!(args.file, PathBuf::from("book.xml"));
            }
            _ => panic!("expected import"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["eltree", "ls", "--format", "yaml"]).is_err());
    }
}
