mod common;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ulang::{lexer, parser};

/// Generated sources that stress the grammar's recursive paths.
fn synthetic_sources() -> Vec<(String, String)> {
    let depth = parser::MAX_NESTING_DEPTH / 2;
    let nested_parens = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));

    let mut else_chain = String::from("if (x == 0) { y = 0 }");
    for branch in 1..500 {
        else_chain.push_str(&format!(" else if (x == {branch}) in that case {{ y = {branch} }}"));
    }

    let mut classes = String::new();
    for index in 0..100 {
        classes.push_str(&format!(
            "class Shape{index} {{\n    __init__(w) {{ this.w = w }}\n    area() {{ return this.w * this.w }}\n}}\n\
             s{index} = new Shape{index}({index}); output(s{index}.area())\n"
        ));
    }

    vec![
        ("nested_parens".to_string(), nested_parens),
        ("else_if_chain".to_string(), else_chain),
        ("class_heavy".to_string(), classes),
    ]
}

fn bench_frontend(c: &mut Criterion) {
    let mut group = c.benchmark_group("frontend");
    let sources = common::workloads().into_iter().chain(synthetic_sources());

    for (label, source) in sources {
        group.throughput(Throughput::Bytes(source.len() as u64));
        let tokens = lexer::tokenize(&source).expect("tokenize");

        group.bench_with_input(BenchmarkId::new("tokenize", &label), &source, |b, source| {
            b.iter(|| black_box(lexer::tokenize(black_box(source)).expect("tokenize")))
        });

        group.bench_with_input(BenchmarkId::new("parse_tokens", &label), &tokens, |b, tokens| {
            b.iter(|| black_box(parser::parse_tokens(black_box(tokens.clone())).expect("parse")))
        });

        group.bench_with_input(BenchmarkId::new("parse_source", &label), &source, |b, source| {
            b.iter(|| black_box(common::load_program(&label, black_box(source))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
