//! Benchmarks for patch creation, application and workspace capture.
//!
//! Patch creation and application run once per modified file on every
//! capture and rebuild, so their cost grows with both file size and the
//! number of edited lines.

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use project_patcher::patch::{apply_patch, create_patch};
use project_patcher::workspace;

/// A source-like text of `lines` lines.
fn original_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("    let value_{} = compute({});\n", i, i))
        .collect()
}

/// `original` with every `stride`-th line rewritten.
fn edited_text(original: &str, stride: usize) -> String {
    original
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i % stride == 0 {
                format!("{} // edited\n", line)
            } else {
                format!("{}\n", line)
            }
        })
        .collect()
}

fn bench_create_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_patch");

    for lines in [100, 1_000, 10_000] {
        let original = original_text(lines);
        let edited = edited_text(&original, 50);
        group.bench_with_input(BenchmarkId::new("sparse_edits", lines), &lines, |b, _| {
            b.iter(|| create_patch(black_box(&original), black_box(&edited)))
        });
    }

    let original = original_text(1_000);
    group.bench_function("identical", |b| {
        b.iter(|| create_patch(black_box(&original), black_box(&original)))
    });

    group.finish();
}

fn bench_apply_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_patch");

    for stride in [2, 10, 100] {
        let original = original_text(1_000);
        let edited = edited_text(&original, stride);
        let patch = create_patch(&original, &edited).unwrap();
        group.bench_with_input(BenchmarkId::new("stride", stride), &stride, |b, _| {
            b.iter(|| apply_patch(black_box(&original), black_box(&patch), Path::new("f.rs")))
        });
    }

    group.finish();
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");
    group.sample_size(20);

    for files in [10, 100] {
        let root = tempfile::TempDir::new().unwrap();
        let clean = root.path().join("clean");
        let working = root.path().join("working");
        for i in 0..files {
            let relative = format!("src/module{}/file{}.rs", i / 10, i);
            let original = original_text(200);
            for (dir, content) in [
                (&clean, original.clone()),
                (&working, edited_text(&original, if i % 2 == 0 { 20 } else { 1_000 })),
            ] {
                let path = dir.join(&relative);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
        }

        group.bench_with_input(BenchmarkId::new("files", files), &files, |b, _| {
            b.iter(|| {
                workspace::capture(
                    &clean,
                    &working,
                    &root.path().join("patches"),
                    &root.path().join("output"),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create_patch, bench_apply_patch, bench_capture);
criterion_main!(benches);
