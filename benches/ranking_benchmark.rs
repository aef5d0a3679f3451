use criterion::{black_box, criterion_group, criterion_main, Criterion};
use policy_match::{ranking::rank, CandidateRecord, IssueSet, StanceVector};

fn stance(issues: &IssueSet, seed: usize) -> StanceVector {
    StanceVector::from_pairs(
        issues
            .keys()
            .enumerate()
            .map(|(j, k)| (k, [1.0, -1.0, 0.0, 0.5][(seed + j) % 4])),
    )
    .unwrap()
}

fn create_test_candidates(issues: &IssueSet, count: usize) -> Vec<CandidateRecord> {
    (0..count)
        .map(|i| {
            CandidateRecord::new(
                format!("Candidate {}", i),
                format!("Party {}", i % 6),
                "Policy statement",
                stance(issues, i),
            )
        })
        .collect()
}

fn bench_cosine_ranking(c: &mut Criterion) {
    let issues = IssueSet::standard();
    let user = stance(&issues, 3);

    let candidates_20 = create_test_candidates(&issues, 20);
    let candidates_100 = create_test_candidates(&issues, 100);
    let candidates_1000 = create_test_candidates(&issues, 1000);

    c.bench_function("cosine_rank_20", |b| {
        b.iter(|| black_box(rank(&user, &candidates_20, &issues, 5).unwrap()));
    });

    c.bench_function("cosine_rank_100", |b| {
        b.iter(|| black_box(rank(&user, &candidates_100, &issues, 5).unwrap()));
    });

    c.bench_function("cosine_rank_1000", |b| {
        b.iter(|| black_box(rank(&user, &candidates_1000, &issues, 5).unwrap()));
    });
}

criterion_group!(benches, bench_cosine_ranking);
criterion_main!(benches);
