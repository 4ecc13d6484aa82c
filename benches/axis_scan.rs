use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sdc_suppress::{suppress, ConfigBuilder, InputRow, InputValue};

fn make_rows(zips: usize, ages: usize) -> Vec<InputRow> {
    let mut rows = Vec::with_capacity(zips * ages);
    for z in 0..zips {
        for a in 0..ages {
            let mut row = InputRow::new();
            row.set("zip", InputValue::Text(format!("{z:05}")));
            row.set("age", InputValue::Text(format!("{a:02}")));
            // Every third cell falls below a threshold of 11 to keep the
            // latent-revelation pass doing real work instead of converging
            // on the first sweep.
            let n = if (z + a) % 3 == 0 { 4 } else { 30 };
            row.set("n", InputValue::Integer(n));
            rows.push(row);
        }
    }
    rows
}

fn bench_axis_scan(c: &mut Criterion) {
    let config = ConfigBuilder::new()
        .threshold(11)
        .dimensions(["zip", "age"])
        .incidence_column("n")
        .build()
        .unwrap();

    c.bench_function("suppress_200x10", |b| {
        b.iter(|| {
            let rows = make_rows(200, 10);
            black_box(suppress(black_box(rows), &config).unwrap())
        })
    });
}

criterion_group!(benches, bench_axis_scan);
criterion_main!(benches);
