//! Extract command handler.

use anyhow::{Context, Result};

use super::Project;
use crate::cli::ExtractArgs;
use crate::cli::output::{OutputFormat, print_json};
use crate::domain::{HeadingNode, HeadingTree, ResourceMetadata, Resolver};
use crate::infra::{extract_with_checksum, read_source};

pub fn handle_extract(args: &ExtractArgs, project: &Project) -> Result<()> {
    let (full_path, project_path) = project.locate(&args.file);
    let source = read_source(&full_path)
        .with_context(|| format!("failed to read {}", full_path.display()))?;

    let extracted = extract_with_checksum(&source.text, source.checksum, source.size_bytes);
    let mut resource = ResourceMetadata::from_extracted(&project_path, extracted)
        .with_collections(project.collections.memberships(&project_path));
    resource.links = Resolver::new(&project.registry).resolve(&resource);

    match args.format {
        OutputFormat::Json => print_json(&resource),
        OutputFormat::Human => {
            print_human(&resource);
            Ok(())
        }
    }
}

fn print_human(resource: &ResourceMetadata) {
    println!("id:          {}", resource.id);
    println!("path:        {}", resource.file_path);
    println!(
        "size:        {} bytes (~{} tokens)",
        resource.size_bytes, resource.estimated_token_count
    );
    println!("checksum:    {}", resource.checksum);
    if !resource.collections.is_empty() {
        println!("collections: {}", resource.collections.join(", "));
    }
    match (&resource.frontmatter, &resource.frontmatter_error) {
        (Some(frontmatter), _) => {
            let keys: Vec<&str> = frontmatter.keys().map(String::as_str).collect();
            println!("frontmatter: {}", keys.join(", "));
        }
        (None, Some(error)) => println!("frontmatter: invalid ({})", error),
        (None, None) => {}
    }

    if !resource.headings.is_empty() {
        println!("\nheadings:");
        for root in resource.headings.roots() {
            print_heading(&resource.headings, root, 1);
        }
    }

    if !resource.links.is_empty() {
        println!("\nlinks:");
        for link in &resource.links {
            let line = link.line.map_or_else(|| "-".to_string(), |l| l.to_string());
            let target = match (&link.resolved_id, &link.anchor_target) {
                (Some(id), Some(anchor)) => format!(" -> {}#{}", id, anchor),
                (Some(id), None) => format!(" -> {}", id),
                (None, Some(anchor)) => format!(" -> #{}", anchor),
                (None, None) => String::new(),
            };
            println!("  {:>4}  {:<10}  {}{}", line, link.link_type, link.href, target);
        }
    }
}

fn print_heading(tree: &HeadingTree, node: &HeadingNode, depth: usize) {
    println!(
        "{}{} {} (#{})",
        "  ".repeat(depth),
        "#".repeat(usize::from(node.level)),
        node.text,
        node.slug
    );
    for child in tree.children(node) {
        print_heading(tree, child, depth + 1);
    }
}
