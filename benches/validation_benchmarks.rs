//! Benchmarks for extraction, validation and transformation.
//!
//! Run with: cargo bench --bench validation_benchmarks

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mdvet::cli::config::ProjectConfig;
use mdvet::cli::handlers::Project;
use mdvet::domain::{
    CollectionSet, LinkType, ResourceMetadata, ResourceRegistry, Resolver, Validator,
};
use mdvet::infra::{SchemaStore, extract};
use mdvet::transform::{LinkMatch, RuleSet, TransformOptions, TransformRule, transform};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Data Generation
// =============================================================================

/// Sections per generated document
const SECTIONS: &[&str] = &["Overview", "Install", "Configure", "Usage", "Reference"];

/// Generate a document linking to its neighbours, its own sections and
/// one external site. Every tenth document carries a broken link.
fn generate_doc(index: usize, count: usize) -> String {
    let mut content = format!(
        "---\ntitle: Doc {index}\ntags: [generated]\n---\n# Doc {index}\n\n"
    );
    for (n, section) in SECTIONS.iter().enumerate() {
        let next = (index + n + 1) % count;
        content.push_str(&format!(
            "## {section}\n\nSee [doc {next}](doc-{next:04}.md#{slug}) and [above](#doc-{index}).\n\n",
            slug = section.to_lowercase()
        ));
    }
    content.push_str("Visit [the site](https://example.com).\n");
    if index % 10 == 0 {
        content.push_str("\nA [broken link](missing.md).\n");
    }
    content
}

fn generate_registry(count: usize) -> ResourceRegistry {
    (0..count)
        .map(|i| {
            let path = format!("doc-{i:04}.md");
            ResourceMetadata::from_extracted(&path, extract(&generate_doc(i, count)))
        })
        .collect()
}

fn create_test_project(count: usize) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for i in 0..count {
        let path = dir.path().join(format!("doc-{i:04}.md"));
        fs::write(path, generate_doc(i, count)).expect("Failed to write doc");
    }
    dir
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_extract(c: &mut Criterion) {
    let content = generate_doc(1, 100);
    c.bench_function("extract/single_doc", |b| b.iter(|| extract(&content)));
}

fn bench_project_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_load");
    group.sample_size(20);

    for size in [100, 500] {
        let dir = create_test_project(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("docs", size), &size, |b, _| {
            b.iter(|| {
                Project::load(dir.path(), ProjectConfig::default()).expect("Failed to load")
            });
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let collections = CollectionSet::new(&BTreeMap::new()).expect("empty collections");
    let schemas = SchemaStore::default();

    for size in [100, 1000] {
        let registry = generate_registry(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("docs", size), &size, |b, _| {
            b.iter(|| Validator::new(&registry, &collections, &schemas).run());
        });
    }
    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let registry = generate_registry(100);
    let source = registry.get_by_path("doc-0001.md").expect("generated doc");
    let content = generate_doc(1, 100);
    let links = Resolver::new(&registry).resolve(source);

    let rules = RuleSet::new(vec![TransformRule::new(
        LinkMatch::of_type(LinkType::LocalFile),
        "{{ link.text }} ({{ link.resource.relativePath }})",
    )])
    .expect("valid rules");

    group.bench_function("local_rule", |b| {
        let mut options = TransformOptions::new(&rules);
        options.registry = Some(&registry);
        options.source_path = Some("doc-0001.md");
        b.iter(|| transform(&content, &links, &options));
    });

    group.bench_function("default_template", |b| {
        let empty = RuleSet::default();
        let mut options = TransformOptions::new(&empty);
        options.registry = Some(&registry);
        options.source_path = Some("doc-0001.md");
        options.default_template = Some("[{{ link.text }}]({{ link.href }})");
        b.iter(|| transform(&content, &links, &options));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_extract,
    bench_project_load,
    bench_validate,
    bench_transform,
);
criterion_main!(benches);
