use colored::Colorize;

use pagemark_manager::AnnotationManager;
use pagemark_migrate::{
    DeletionReport, IntegrityReport, MigrationEngine, MigrationOptions, MigrationReport,
};
use pagemark_store::{AnnotationStore, FileBackend, StorageStats};
use pagemark_types::AnnotationCounts;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = AnnotationStore::new(FileBackend::new(&cli.root)?);
    let format = cli.format;

    match cli.command {
        Command::Stats(_) => cmd_stats(&store, &format),
        Command::Docs(args) => cmd_docs(store, &format, args),
        Command::Counts(args) => cmd_counts(store, &format, args),
        Command::Show(args) => cmd_show(store, args),
        Command::Migrate(args) => cmd_migrate(&store, &format, args),
        Command::Copy(args) => cmd_copy(&store, &format, args),
        Command::Merge(args) => cmd_merge(&store, &format, args),
        Command::DeleteUser(args) => cmd_delete_user(&store, &format, args),
        Command::Validate(args) => cmd_validate(&store, &format, args),
    }
}

fn cmd_stats(store: &AnnotationStore<FileBackend>, format: &OutputFormat) -> anyhow::Result<()> {
    let stats = store.stats()?;
    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Text => print_stats(&stats),
    }
    Ok(())
}

fn cmd_docs(
    store: AnnotationStore<FileBackend>,
    format: &OutputFormat,
    args: DocsArgs,
) -> anyhow::Result<()> {
    let manager = AnnotationManager::new(store);
    let documents = manager.user_documents(&args.user)?;
    match format {
        OutputFormat::Json => print_json(&documents)?,
        OutputFormat::Text => {
            if documents.is_empty() {
                println!("No documents for {}.", args.user.bold());
            } else {
                for document in &documents {
                    println!("  {document}");
                }
            }
        }
    }
    Ok(())
}

fn cmd_counts(
    store: AnnotationStore<FileBackend>,
    format: &OutputFormat,
    args: CountsArgs,
) -> anyhow::Result<()> {
    let manager = AnnotationManager::new(store);
    let counts = manager.annotation_counts(&args.user, &args.document)?;
    match format {
        OutputFormat::Json => print_json(&counts)?,
        OutputFormat::Text => {
            println!(
                "{} / {}: {} annotations",
                args.user.bold(),
                args.document.bold(),
                counts.total().to_string().yellow()
            );
            print_counts(&counts);
        }
    }
    Ok(())
}

fn cmd_show(store: AnnotationStore<FileBackend>, args: ShowArgs) -> anyhow::Result<()> {
    let manager = AnnotationManager::new(store);
    let set = manager.annotations(&args.user, &args.document)?;
    println!("{}", serde_json::to_string_pretty(&set)?);
    Ok(())
}

fn cmd_migrate(
    store: &AnnotationStore<FileBackend>,
    format: &OutputFormat,
    args: MigrateArgs,
) -> anyhow::Result<()> {
    let engine = MigrationEngine::new(store);
    let options = MigrationOptions {
        overwrite_existing: args.overwrite,
        preserve_original: args.keep_original,
        ..Default::default()
    };
    let report = engine.migrate_user_data(&args.from, &args.to, &options)?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_migration_report("Migrated", &report),
    }
    Ok(())
}

fn cmd_copy(
    store: &AnnotationStore<FileBackend>,
    format: &OutputFormat,
    args: CopyArgs,
) -> anyhow::Result<()> {
    let engine = MigrationEngine::new(store);
    let options = MigrationOptions {
        overwrite_existing: args.overwrite,
        ..Default::default()
    };
    let report = engine.copy_user_data(&args.from, &args.to, &options)?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_migration_report("Copied", &report),
    }
    Ok(())
}

fn cmd_merge(
    store: &AnnotationStore<FileBackend>,
    format: &OutputFormat,
    args: MergeArgs,
) -> anyhow::Result<()> {
    let engine = MigrationEngine::new(store);
    let sources: Vec<&str> = args.from.iter().map(String::as_str).collect();
    let report = engine.merge_users_data(&sources, &args.target, &MigrationOptions::default())?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_migration_report("Merged", &report),
    }
    Ok(())
}

fn cmd_delete_user(
    store: &AnnotationStore<FileBackend>,
    format: &OutputFormat,
    args: DeleteUserArgs,
) -> anyhow::Result<()> {
    let engine = MigrationEngine::new(store);
    let report = engine.delete_user_data(&args.user)?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_deletion_report(&args.user, &report),
    }
    Ok(())
}

fn cmd_validate(
    store: &AnnotationStore<FileBackend>,
    format: &OutputFormat,
    args: ValidateArgs,
) -> anyhow::Result<()> {
    let engine = MigrationEngine::new(store);
    let report = engine.validate_user_data(&args.user)?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_integrity_report(&args.user, &report),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_stats(stats: &StorageStats) {
    println!(
        "Storage: {} / {} bytes ({:.1}%)",
        stats.used_bytes.to_string().bold(),
        stats.max_bytes,
        stats.percent_used
    );
    println!("Entries: {}", stats.entry_count.to_string().bold());
}

fn print_counts(counts: &AnnotationCounts) {
    println!("  highlights:      {}", counts.highlights);
    println!("  bookmarks:       {}", counts.bookmarks);
    println!("  comments:        {}", counts.comments);
    println!("  call-to-actions: {}", counts.call_to_actions);
}

fn print_migration_report(verb: &str, report: &MigrationReport) {
    let mark = if report.success {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!(
        "{mark} {verb} {} document(s), {} annotation(s)",
        report.documents_processed.to_string().bold(),
        report.migrated.total().to_string().yellow()
    );
    print_counts(&report.migrated);
    for failure in &report.errors {
        println!(
            "  {} {}: {}",
            "failed".red(),
            failure.document_id.bold(),
            failure.reason
        );
    }
}

fn print_deletion_report(user: &str, report: &DeletionReport) {
    let mark = if report.success {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!(
        "{mark} Deleted {} document(s) for {}",
        report.documents_deleted.to_string().bold(),
        user.bold()
    );
    for failure in &report.errors {
        println!(
            "  {} {}: {}",
            "failed".red(),
            failure.document_id.bold(),
            failure.reason
        );
    }
}

fn print_integrity_report(user: &str, report: &IntegrityReport) {
    if report.valid {
        println!(
            "{} {} consistent ({} document(s) checked)",
            "✓".green().bold(),
            user.bold(),
            report.documents_checked
        );
        return;
    }
    println!(
        "{} {} violation(s) across {} document(s)",
        "✗".red().bold(),
        report.violations.len().to_string().bold(),
        report.documents_checked
    );
    for violation in &report.violations {
        println!(
            "  {} {} {} in {}: {}",
            "invalid".red(),
            violation.kind,
            violation.annotation_id.dimmed(),
            violation.document_id.bold(),
            violation.detail
        );
    }
}
