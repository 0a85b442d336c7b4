//! Validate command handler.

use anyhow::{Context, Result, bail};
use tracing::warn;

use super::Project;
use crate::cli::ValidateArgs;
use crate::cli::output::{OutputFormat, print_json};
use crate::domain::{
    Severity, ValidationOptions, ValidationResult, Validator, required_schemas,
    self_asserted_schemas,
};
use crate::infra::{GitIgnore, SchemaStore};

pub fn handle_validate(args: &ValidateArgs, project: &Project, verbose: bool) -> Result<()> {
    let cli_schema = project.config.schema(args.schema.as_deref());
    let check_urls = args.check_urls || project.config.validate.check_url_links;
    if check_urls {
        warn!("no URL checker is available, external links are reported unchecked");
    }

    // 1. Load collection and --schema schemas up front; a missing one is fatal
    let mut schemas = SchemaStore::new(project.root.clone());
    let required = required_schemas(&project.registry, &project.collections, cli_schema);
    for reference in &required {
        schemas
            .load(reference)
            .with_context(|| format!("failed to load schema '{}'", reference))?;
    }
    // A document's own $schema only fails that document
    for reference in self_asserted_schemas(&project.registry) {
        schemas.try_load(&reference);
    }

    // 2. Validate
    let ignore_rules = GitIgnore::load(&project.root);
    let options = ValidationOptions {
        cli_schema,
        mode: project.config.mode(args.mode),
        check_external_urls: check_urls,
        url_checker: None,
        ignore_rules: Some(&ignore_rules),
    };
    let result = Validator::new(&project.registry, &project.collections, &schemas)
        .with_options(options)
        .run();

    // 3. Display results
    match args.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Human => print_human(&result, verbose),
    }

    // 4. Exit code: fail only if there are errors
    if !result.passed {
        bail!("validation failed");
    }
    Ok(())
}

fn print_human(result: &ValidationResult, verbose: bool) {
    if result.issues.is_empty() {
        println!(
            "All {} resource(s) OK ({} link(s) checked).",
            result.total_resources, result.total_links
        );
        return;
    }

    for issue in result.issues_by_severity() {
        if issue.severity == Severity::Info && !verbose {
            continue;
        }
        println!("{}: {}", issue.severity, issue);
    }
    println!(
        "\nChecked {} resource(s) and {} link(s) in {}ms",
        result.total_resources, result.total_links, result.duration_ms
    );
    println!(
        "Found {} issue(s): {} error(s), {} warning(s), {} info",
        result.issues.len(),
        result.error_count,
        result.warning_count,
        result.info_count
    );
}
