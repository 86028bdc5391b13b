use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pagemark",
    about = "Pagemark — document annotation storage and migration",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage root directory
    #[arg(long, global = true, default_value = ".pagemark")]
    pub root: String,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show storage usage statistics
    Stats(StatsArgs),
    /// List documents with annotations for a user
    Docs(DocsArgs),
    /// Show annotation counts for one document
    Counts(CountsArgs),
    /// Dump one document's annotations as JSON
    Show(ShowArgs),
    /// Move all annotations from one user to another
    Migrate(MigrateArgs),
    /// Copy all annotations from one user to another
    Copy(CopyArgs),
    /// Merge several users' annotations into one user
    Merge(MergeArgs),
    /// Delete every annotation owned by a user
    DeleteUser(DeleteUserArgs),
    /// Audit a user's stored annotations for consistency
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct StatsArgs {}

#[derive(Args)]
pub struct DocsArgs {
    pub user: String,
}

#[derive(Args)]
pub struct CountsArgs {
    pub user: String,
    pub document: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub user: String,
    pub document: String,
}

#[derive(Args)]
pub struct MigrateArgs {
    pub from: String,
    pub to: String,
    /// Keep the source annotations after migrating
    #[arg(long)]
    pub keep_original: bool,
    /// Replace existing target documents instead of merging
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Args)]
pub struct CopyArgs {
    pub from: String,
    pub to: String,
    /// Replace existing target documents instead of merging
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    pub target: String,
    /// Source user to merge from (repeatable)
    #[arg(long = "from", required = true)]
    pub from: Vec<String>,
}

#[derive(Args)]
pub struct DeleteUserArgs {
    pub user: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stats() {
        let cli = Cli::try_parse_from(["pagemark", "stats"]).unwrap();
        assert!(matches!(cli.command, Command::Stats(_)));
        assert_eq!(cli.root, ".pagemark");
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::try_parse_from(["pagemark", "--root", "/tmp/pm", "stats"]).unwrap();
        assert_eq!(cli.root, "/tmp/pm");
    }

    #[test]
    fn parse_docs() {
        let cli = Cli::try_parse_from(["pagemark", "docs", "u1"]).unwrap();
        if let Command::Docs(args) = cli.command {
            assert_eq!(args.user, "u1");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_counts() {
        let cli = Cli::try_parse_from(["pagemark", "counts", "u1", "d1"]).unwrap();
        if let Command::Counts(args) = cli.command {
            assert_eq!(args.user, "u1");
            assert_eq!(args.document, "d1");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_migrate_flags() {
        let cli = Cli::try_parse_from([
            "pagemark",
            "migrate",
            "u1",
            "u2",
            "--keep-original",
            "--overwrite",
        ])
        .unwrap();
        if let Command::Migrate(args) = cli.command {
            assert_eq!(args.from, "u1");
            assert_eq!(args.to, "u2");
            assert!(args.keep_original);
            assert!(args.overwrite);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_merge_multiple_sources() {
        let cli = Cli::try_parse_from([
            "pagemark", "merge", "u3", "--from", "u1", "--from", "u2",
        ])
        .unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.target, "u3");
            assert_eq!(args.from, vec!["u1", "u2"]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn merge_requires_a_source() {
        assert!(Cli::try_parse_from(["pagemark", "merge", "u3"]).is_err());
    }

    #[test]
    fn parse_delete_user() {
        let cli = Cli::try_parse_from(["pagemark", "delete-user", "u1"]).unwrap();
        assert!(matches!(cli.command, Command::DeleteUser(_)));
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["pagemark", "--format", "json", "validate", "u1"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
