use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zkwit_field::{Fe, LiteralRadix};

#[inline]
fn det_vec(n: usize, seed: u64) -> Vec<Fe> {
    let (mut a, c, m) = (
        1_664_525u64.wrapping_mul(seed).wrapping_add(1_013_904_223),
        1_013_904_223u64,
        1u64 << 32,
    );
    (0..n)
        .map(|i| {
            a = a.wrapping_mul(1_664_525).wrapping_add(c) % m;
            Fe::from_u64(a ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        })
        .collect()
}

fn bench_arith(c: &mut Criterion) {
    let mut group = c.benchmark_group("goldilocks_arith");
    for &n in &[1usize << 10, 1 << 14] {
        let xs = det_vec(n, 2024);
        let ys = det_vec(n, 7);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(BenchmarkId::new("mul_add", n), |b| {
            b.iter(|| {
                let acc: Fe = xs.iter().zip(&ys).map(|(x, y)| *x * *y + *x).sum();
                black_box(acc)
            })
        });

        group.bench_function(BenchmarkId::new("inv", n), |b| {
            b.iter(|| {
                for x in &xs[..64.min(n)] {
                    black_box(x.inv());
                }
            })
        });
    }
    group.finish();
}

fn bench_literals(c: &mut Criterion) {
    let xs = det_vec(1 << 12, 99);
    let dec: Vec<String> = xs.iter().map(|x| x.to_literal(LiteralRadix::Decimal)).collect();
    c.bench_function("parse_decimal_literals", |b| {
        b.iter(|| {
            for s in &dec {
                black_box(Fe::parse(s).ok());
            }
        })
    });
}

criterion_group!(benches, bench_arith, bench_literals);
criterion_main!(benches);
