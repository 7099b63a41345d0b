use criterion::{Criterion, criterion_group, criterion_main};
use shieldgen_lib::{Aggregator, FetchOutcome, extract_domains};
use std::hint::black_box;

/// A list mixing every syntax the extractor understands, plus noise
fn filter_list(entries: usize) -> String {
    let mut list = String::from("! Title: bench list\n# hosts section\n");
    for i in 0..entries {
        let line = match i % 5 {
            0 => format!("0.0.0.0 ads{i}.example.com"),
            1 => format!("||track{i}.example.org^$third-party"),
            2 => format!("banner{i}.example.net###ad-slot"),
            3 => format!("@@||allowed{i}.example.com^"),
            _ => format!("some text mentioning cdn{i}.example.io in passing"),
        };
        list.push_str(&line);
        list.push('\n');
    }
    list
}

fn benchmark_extract(c: &mut Criterion) {
    let list = filter_list(50_000);

    c.bench_function("extract_domains from large list", |b| {
        b.iter(|| extract_domains(black_box(&list)))
    });
}

fn benchmark_aggregate(c: &mut Criterion) {
    let outcomes: Vec<FetchOutcome> = (0..20)
        .map(|n| FetchOutcome::new(format!("https://lists.test/{n}"), Ok(filter_list(2_000))))
        .collect();

    c.bench_function("aggregate 20 lists up to 400 domains", |b| {
        b.iter(|| {
            let mut aggregator = Aggregator::new(400);
            for outcome in &outcomes {
                aggregator.add(black_box(outcome));
                if aggregator.is_full() {
                    break;
                }
            }
            aggregator.into_domains()
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_extract, benchmark_aggregate
);
criterion_main!(benches);
