use blur_recall::ledger::LedgerEntry;
use blur_recall::TimingReport;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_ledger(rows: usize) -> Vec<LedgerEntry> {
    let levels = [31, 21, 11, 5, 1];
    (0..rows)
        .map(|i| {
            let elapsed = 1.0 + (i % 17) as f64 * 0.5;
            if i % 7 == 0 {
                LedgerEntry::unsolved(format!("img-{}.png", i), elapsed, "")
            } else {
                let index = i % levels.len();
                LedgerEntry::solved(
                    format!("img-{}.png", i),
                    levels[index],
                    elapsed,
                    "guess",
                    100 - 20 * index as u32,
                )
            }
        })
        .collect()
}

fn bench_timing_report(c: &mut Criterion) {
    let entries = synthetic_ledger(10_000);
    c.bench_function("timing_report_10k", |b| {
        b.iter(|| TimingReport::from_entries(black_box(&entries)))
    });
}

criterion_group!(benches, bench_timing_report);
criterion_main!(benches);
