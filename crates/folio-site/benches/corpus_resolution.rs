//! Benchmarks for corpus building and slug resolution.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use folio_site::{Site, Toc};
use folio_storage::Storage;
use folio_storage_fs::FsStorage;

/// Create a version tree with specified depth and breadth.
fn create_version(root: &Path, depth: usize, breadth: usize) {
    fn create_level(dir: &Path, current_depth: usize, max_depth: usize, breadth: usize) {
        if current_depth > max_depth {
            return;
        }

        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("_category_.json"),
            format!(r#"{{"tab_group": "level-{current_depth}"}}"#),
        )
        .unwrap();

        for i in 0..breadth {
            fs::write(
                dir.join(format!("page-{i}.mdx")),
                format!("---\ntitle: Page {i}\n---\n# Page {i}\n\n## Usage\n\n## Usage\n"),
            )
            .unwrap();
            create_level(
                &dir.join(format!("section-{i}")),
                current_depth + 1,
                max_depth,
                breadth,
            );
        }
    }

    create_level(root, 0, depth, breadth);
}

fn bench_resolution(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    create_version(&temp_dir.path().join("v1"), 3, 5);

    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(temp_dir.path().to_path_buf()));
    let site = Site::new(storage);
    site.corpus("v1").unwrap();

    let mut group = c.benchmark_group("resolve");

    group.bench_function("document_hit", |b| {
        b.iter(|| site.resolve("v1", "section-0/section-1/page-2").unwrap());
    });

    group.bench_function("category", |b| {
        b.iter(|| site.resolve("v1", "section-0/section-1").unwrap());
    });

    group.bench_function("not_found", |b| {
        b.iter(|| site.resolve("v1", "nonexistent/path").unwrap());
    });

    group.bench_function("page_with_toc", |b| {
        b.iter(|| site.page("v1", "section-2/page-3").unwrap());
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    create_version(&temp_dir.path().join("v1"), 2, 6);

    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(temp_dir.path().to_path_buf()));
    let site = Site::new(storage);

    c.bench_function("refresh_version", |b| {
        b.iter(|| site.refresh("v1").unwrap());
    });
}

fn bench_toc(c: &mut Criterion) {
    let body: String = (0..200)
        .map(|i| format!("## Section {}\n\nText.\n\n### Detail\n\n", i % 20))
        .collect();

    c.bench_function("toc_tree", |b| b.iter(|| Toc::new(&body).tree()));
}

criterion_group!(benches, bench_resolution, bench_build, bench_toc);
criterion_main!(benches);
