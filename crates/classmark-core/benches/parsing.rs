use criterion::{black_box, criterion_group, criterion_main, Criterion};

use classmark_core::parser::{lint_test, parse_test_str};

fn generate_test_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[test]
id = "bench"
title = "Benchmark"
subject = "Benchmarking"
instructions = "Answer everything."
time_limit_seconds = 1800
"#,
    );
    for i in 0..n {
        match i % 3 {
            0 => s.push_str(&format!(
                r#"
[[questions]]
id = "q{i}"
prompt = "Question {i}"
type = "multiple-choice"
options = ["a", "b", "c", "d"]
correct_index = {idx}
"#,
                idx = i % 4
            )),
            1 => s.push_str(&format!(
                r#"
[[questions]]
id = "q{i}"
prompt = "Question {i}"
type = "true-false"
correct_value = {val}
"#,
                val = i % 2 == 0
            )),
            _ => s.push_str(&format!(
                r#"
[[questions]]
id = "q{i}"
prompt = "Question {i}"
type = "short-answer"
sample_text = "answer {i}"
"#
            )),
        }
    }
    s
}

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    let small_toml = generate_test_toml(5);
    let medium_toml = generate_test_toml(50);
    let large_toml = generate_test_toml(200);

    group.bench_function("5_questions", |b| {
        b.iter(|| parse_test_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("50_questions", |b| {
        b.iter(|| parse_test_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| parse_test_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn bench_lint(c: &mut Criterion) {
    let mut group = c.benchmark_group("lint");

    let toml = generate_test_toml(200);
    let test = parse_test_str(&toml, "bench.toml".as_ref()).unwrap();

    group.bench_function("200_questions", |b| b.iter(|| lint_test(black_box(&test))));

    group.finish();
}

criterion_group!(benches, bench_toml_parsing, bench_lint);
criterion_main!(benches);
