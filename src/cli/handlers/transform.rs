//! Transform command handler.

use anyhow::{Context, Result};

use super::Project;
use crate::cli::TransformArgs;
use crate::domain::{ResourceMetadata, Resolver};
use crate::infra::{extract_with_checksum, fingerprint, read_source};
use crate::transform::{RuleSet, TransformOptions, transform};

pub fn handle_transform(args: &TransformArgs, project: &Project) -> Result<()> {
    let (full_path, project_path) = project.locate(&args.file);
    let source = read_source(&full_path)
        .with_context(|| format!("failed to read {}", full_path.display()))?;

    let extracted = extract_with_checksum(&source.text, source.checksum, source.size_bytes);
    let resource = ResourceMetadata::from_extracted(&project_path, extracted);
    let links = Resolver::new(&project.registry).resolve(&resource);

    let settings = &project.config.transform;
    let rules = RuleSet::new(settings.rules.clone()).context("invalid transform rules")?;
    let options = TransformOptions {
        rules: &rules,
        registry: Some(&project.registry),
        context: Some(&settings.context),
        source_path: Some(&project_path),
        default_template: settings.default_template.as_deref(),
    };

    let output = transform(&source.text, &links, &options);

    if args.fingerprint {
        println!("{}", fingerprint(&output));
    } else {
        print!("{}", output);
    }
    Ok(())
}
