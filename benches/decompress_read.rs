use compressed_source::decompression::CompressionMode;
use compressed_source::{CompressedSource, Read, TextSource};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flate2::{write::GzEncoder, Compression};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::runtime::Runtime;

fn log_content(size_kb: usize) -> Vec<u8> {
    let target_size = size_kb * 1024;
    let mut content = Vec::with_capacity(target_size);
    let mut line_num = 0;

    while content.len() < target_size {
        let log_line = format!(
            "[2024-09-02T10:{}:{}] INFO: Request {} user_{}\n",
            (line_num / 3600) % 24,
            (line_num / 60) % 60,
            line_num,
            line_num % 1000
        );
        content.extend_from_slice(log_line.as_bytes());
        line_num += 1;
    }

    content
}

fn create_test_file(size_kb: usize) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .suffix(".log")
        .tempfile()
        .expect("Failed to create temp file");
    temp_file.write_all(&log_content(size_kb)).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

fn create_compressed_test_file(size_kb: usize) -> NamedTempFile {
    let compressed_file = tempfile::Builder::new()
        .suffix(".log.gz")
        .tempfile()
        .expect("Failed to create temp file");
    let file = std::fs::File::create(compressed_file.path()).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&log_content(size_kb)).unwrap();
    encoder.finish().unwrap();
    compressed_file
}

fn size_label(size_kb: usize) -> String {
    if size_kb < 1024 {
        format!("{}KB", size_kb)
    } else {
        format!("{}MB", size_kb / 1024)
    }
}

fn bench_read_all(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("read_all");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(5));

    let sizes_kb = [50, 500, 5000];

    for &size_kb in &sizes_kb {
        let label = size_label(size_kb);

        let plain_file = create_test_file(size_kb);
        let plain_spec = plain_file.path().to_string_lossy().into_owned();
        group.bench_with_input(
            BenchmarkId::new("uncompressed", &label),
            &plain_spec,
            |b, spec| {
                b.to_async(&rt).iter(|| async move {
                    let source = CompressedSource::from(TextSource::from(spec.as_str()));
                    let records = Read::from(source).execute().await.unwrap();
                    black_box(records.len());
                });
            },
        );

        let compressed_file = create_compressed_test_file(size_kb);
        let compressed_spec = compressed_file.path().to_string_lossy().into_owned();
        group.bench_with_input(
            BenchmarkId::new("gzip_by_filename", &label),
            &compressed_spec,
            |b, spec| {
                b.to_async(&rt).iter(|| async move {
                    let source = CompressedSource::from(TextSource::from(spec.as_str()));
                    let records = Read::from(source).execute().await.unwrap();
                    black_box(records.len());
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("gzip_explicit", &label),
            &compressed_spec,
            |b, spec| {
                b.to_async(&rt).iter(|| async move {
                    let source = CompressedSource::read_from_source(
                        TextSource::from(spec.as_str()),
                        Arc::new(CompressionMode::Gzip),
                    );
                    let records = source.execute().await.unwrap();
                    black_box(records.len());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_read_all);
criterion_main!(benches);
