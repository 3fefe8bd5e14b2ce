//! Performance benchmarks for vault scans and rename analysis

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::fs;
use std::hint::black_box;
use tempfile::TempDir;
use vaultscan_core::{ConfigProfile, ScanConfig};
use vaultscan_graph::{LinkGraphBuilder, find_backlinks};
use vaultscan_vault::RenameTransformer;

/// Interconnected notes spread over a few folders, with some dead links
fn setup_bench_vault(num_files: usize) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    let folders = ["concepts", "projects", "journal", "inbox"];
    for folder in folders {
        fs::create_dir_all(root.join(folder)).expect("Failed to create folder");
    }

    for i in 0..num_files {
        let folder = folders[i % folders.len()];
        let content = format!(
            "---\ntitle: Note {i}\n---\n# Note {i}\n\n\
             This is note {i} linking to [[note{}]] and [[{}/note{}|alias]].\n\
             See also [[missing{}]] and ![[image{i}.png]] and https://example.com/{i}\n",
            (i + 1) % num_files,
            folders[(i + 2) % folders.len()],
            (i + 2) % num_files,
            i % 7,
        );
        fs::write(root.join(folder).join(format!("note{i}.md")), content)
            .expect("Failed to write file");
    }
    temp_dir
}

fn bench_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");

    for size in [100, 500, 2000] {
        let vault = setup_bench_vault(size);
        let builder = LinkGraphBuilder::new(ScanConfig::default());

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| builder.scan(black_box(vault.path())).unwrap())
        });
    }

    group.finish();
}

fn bench_worker_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_workers");
    let vault = setup_bench_vault(1000);

    for workers in [1, 2, 8] {
        let config = ScanConfig::builder().max_workers(workers).build().unwrap();
        let builder = LinkGraphBuilder::new(config);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| builder.scan(black_box(vault.path())).unwrap())
        });
    }

    group.finish();
}

fn bench_backlinks(c: &mut Criterion) {
    let vault = setup_bench_vault(500);
    let config = ConfigProfile::Default.create_config();

    c.bench_function("backlinks_500", |b| {
        b.iter(|| find_backlinks(vault.path(), black_box("note42"), &config).unwrap())
    });
}

fn bench_rename_analysis(c: &mut Criterion) {
    let vault = setup_bench_vault(500);
    let transformer = RenameTransformer::new(vault.path(), ScanConfig::default()).unwrap();
    let source = transformer.resolve("note42").unwrap();
    let destination = transformer.destination(&source, "renamed42").unwrap();

    c.bench_function("rename_analyze_500", |b| {
        b.iter(|| {
            transformer
                .analyze(black_box(&source), "note42", &destination)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_full_scan,
    bench_worker_counts,
    bench_backlinks,
    bench_rename_analysis
);
criterion_main!(benches);
