use criterion::{criterion_group, criterion_main, Criterion};
use linesearch_core::{lookup, InvertedIndex};

fn corpus() -> Vec<String> {
    let base = [
        "we are ready to go",
        "come on everybody shake you hands",
        "i love this game",
        "just like exception safety is not about writing try catch everywhere in your code",
        "daddy daddy daddy dad dad dad",
        "tell me the meaning of being lonely",
        "just keep track of it",
        "how hard could it be",
        "it is going to be legen wait for it dary legendary",
        "we dont need no education",
    ];
    (0..80).flat_map(|_| base.iter().map(|s| s.to_string())).collect()
}

fn bench_build(c: &mut Criterion) {
    let docs = corpus();
    c.bench_function("build_800_docs", |b| b.iter(|| InvertedIndex::build(docs.iter().cloned())));
}

fn bench_lookup(c: &mut Criterion) {
    let idx = InvertedIndex::build(corpus());
    let queries = ["we need some help", "it", "i love this game", "tell me why", "dislike", "about"];
    c.bench_function("lookup_mixed_queries", |b| {
        b.iter(|| queries.iter().map(|q| lookup(&idx, q).hits.len()).sum::<usize>())
    });
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
