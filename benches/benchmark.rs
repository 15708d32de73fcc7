// Lookup path benchmarks: exact search, encoding and skills tokenizing
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use skilldex_core::{
    split_skills, CorpusStore, Distance, Encoder, HandlerConfig, HashingEncoder, QueryHandler,
    SimilarityIndex, SkillContext, Vector,
};
use std::sync::Arc;

const SKILLS: &[&str] = &[
    "Python", "SQL", "Machine learning", "JavaScript", "React", "Docker", "Kubernetes",
    "AWS", "Excel", "Project management", "Java", "Spring", "Figma", "Linux", "Go",
];

fn random_vector(rng: &mut impl Rng, dim: usize) -> Vector {
    Vector::new((0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect())
}

fn random_skills_blob(rng: &mut impl Rng) -> String {
    let count = rng.random_range(3..10);
    let picked: Vec<&str> = (0..count)
        .map(|_| SKILLS[rng.random_range(0..SKILLS.len())])
        .collect();
    picked.join(", ")
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let mut rng = StdRng::seed_from_u64(7);

    // 4096 and above take the parallel scan path
    for rows in [1_000, 10_000, 50_000] {
        let vectors = (0..rows).map(|_| random_vector(&mut rng, 384)).collect();
        let index = SimilarityIndex::build(vectors).unwrap();
        let query = random_vector(&mut rng, 384);

        group.bench_with_input(BenchmarkId::new("flat_l2_top10", rows), &rows, |b, _| {
            b.iter(|| black_box(index.search(black_box(&query), 10).unwrap()));
        });
    }

    let vectors = (0..10_000).map(|_| random_vector(&mut rng, 384)).collect();
    let cosine = SimilarityIndex::build_with_distance(vectors, Distance::Cosine).unwrap();
    let query = random_vector(&mut rng, 384);
    group.bench_function("flat_cosine_top10/10000", |b| {
        b.iter(|| black_box(cosine.search(black_box(&query), 10).unwrap()));
    });

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let mut rng = StdRng::seed_from_u64(11);
    let encoder = HashingEncoder::default();

    let text = random_skills_blob(&mut rng);
    group.bench_function("hashing_single", |b| {
        b.iter(|| black_box(encoder.encode_one(black_box(&text)).unwrap()));
    });

    let batch: Vec<String> = (0..1_000).map(|_| random_skills_blob(&mut rng)).collect();
    let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
    group.bench_function("hashing_batch_1000", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&refs)).unwrap()));
    });

    group.finish();
}

fn benchmark_tokenize(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(13);
    let blob = format!("ex {}", random_skills_blob(&mut rng));

    c.bench_function("split_skills", |b| {
        b.iter(|| black_box(split_skills(black_box(&blob))));
    });
}

fn benchmark_handle(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(17);
    let texts: Vec<String> = (0..10_000).map(|_| random_skills_blob(&mut rng)).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    let encoder = HashingEncoder::default();
    let index = SimilarityIndex::build(encoder.encode(&refs).unwrap()).unwrap();
    let context =
        SkillContext::new(CorpusStore::from_texts(texts.clone()), index, Arc::new(encoder)).unwrap();
    let handler = QueryHandler::new(Arc::new(context), HandlerConfig { top_k: 3 }).unwrap();

    c.bench_function("handle_top3/10000", |b| {
        b.iter(|| black_box(handler.handle(black_box("Backend developer with Java and SQL")).unwrap()));
    });
}

criterion_group!(benches, benchmark_search, benchmark_encode, benchmark_tokenize, benchmark_handle);
criterion_main!(benches);
