//! Serializer and code generation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ds2bin::codegen::{self, Fortran, C};
use ds2bin::conversion::Conversion;
use ds2bin::processing::{encode_records, resolve_table};
use ds2bin::types::{Column, ColumnData, Table};

/// `rows` rows of two integer, two float and one text column.
fn synthetic_table(rows: usize) -> Table {
    let ids: Vec<i64> = (0..rows as i64).collect();
    let counts: Vec<i32> = (0..rows).map(|i| (i % 1000) as i32).collect();
    let scores: Vec<f64> = (0..rows).map(|i| i as f64 * 0.5).collect();
    let whole: Vec<f64> = (0..rows).map(|i| (i % 70_000) as f64).collect();
    let labels: Vec<String> = (0..rows)
        .map(|i| if i % 3 == 0 { "alpha".to_string() } else { "beta".to_string() })
        .collect();

    Table::new(vec![
        Column::new("id", ColumnData::Int64(ids)),
        Column::new("count", ColumnData::Int32(counts)),
        Column::new("score", ColumnData::Float64(scores)),
        Column::new("whole", ColumnData::Float64(whole)),
        Column::new("label", ColumnData::Utf8(labels)),
    ])
}

fn bench_encode_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize/encode_records");
    for rows in [1_000_usize, 100_000] {
        let columns = resolve_table(&synthetic_table(rows)).unwrap();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &columns, |b, columns| {
            b.iter(|| black_box(encode_records(black_box(columns)).unwrap()));
        });
    }
    group.finish();
}

fn bench_prepare_with_downcast(c: &mut Criterion) {
    let table = synthetic_table(100_000);
    c.bench_function("conversion/prepare_downcast/100000", |b| {
        b.iter(|| black_box(Conversion::prepare(black_box(&table), true, None).unwrap()));
    });
}

fn bench_codegen(c: &mut Criterion) {
    // Many columns of alternating kinds, so grouping emits many statements.
    let columns: Vec<Column> = (0..500)
        .map(|i| {
            let data = if i % 5 == 0 {
                ColumnData::Int32(vec![1])
            } else {
                ColumnData::Float64(vec![1.5])
            };
            Column::new(format!("col_{i}"), data)
        })
        .collect();
    let conversion = Conversion::prepare(&Table::new(columns), false, None).unwrap();
    let descriptors = conversion.descriptors();

    let mut group = c.benchmark_group("codegen/generate");
    group.bench_function("c", |b| {
        b.iter(|| black_box(codegen::generate(&C, black_box(descriptors), "wide.bin", 1).unwrap()));
    });
    group.bench_function("fortran", |b| {
        b.iter(|| {
            black_box(codegen::generate(&Fortran, black_box(descriptors), "wide.bin", 1).unwrap())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode_records, bench_prepare_with_downcast, bench_codegen);
criterion_main!(benches);
