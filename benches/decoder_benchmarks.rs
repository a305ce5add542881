use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dcl::blocks::structure;
use dcl::decoder::Decoder;
use dcl::{DclLexer, load_from_str, serialize};

/// Generate DCL content with `entities` entity containers sharing a
/// constants block through references and copies
fn generate_dcl_content(entities: usize) -> String {
    let mut content = String::from(
        "tag::constants Shared\n{\n    Speed: 12;\n    Names: [\"a\", \"b\", \"c\"];\n    Label: \"shared\";\n}\n",
    );

    for i in 0..entities {
        content.push_str(&format!(
            r#"tag::entity Entity{i}
{{
    copy Shared;
    key Id = {i};
    Health: {health};
    MaxSpeed: Shared::Speed;
    tag::component Transform
    {{
        Origin: [{i}.5, 20.0, 3.04];
        Scale: 1;
    }}
    tag::component Body
    {{
        copy Transform;
        Mass: {mass};
        Speed: MaxSpeed;
    }}
}}
"#,
            health = 100 + i % 50,
            mass = i * 3,
        ));
    }

    content
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for entities in [10, 100, 1000] {
        let content = generate_dcl_content(entities);
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("load_from_str", entities),
            &content,
            |b, content| {
                b.iter(|| {
                    let document = load_from_str(black_box(content));
                    black_box(document.fields().len())
                });
            },
        );
    }

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let content = generate_dcl_content(500);
    group.throughput(Throughput::Bytes(content.len() as u64));

    group.bench_function("tokenize", |b| {
        b.iter(|| DclLexer::new(black_box(&content)).tokenize().len());
    });

    let tokens = DclLexer::new(&content).tokenize();
    group.bench_function("structure", |b| {
        b.iter(|| structure(black_box(&tokens)).body.len());
    });

    group.bench_function("decode", |b| {
        b.iter(|| {
            let block = structure(&tokens);
            Decoder::new().decode(black_box(block)).fields().len()
        });
    });

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let document = load_from_str(&generate_dcl_content(1000));

    group.bench_function("get_field", |b| {
        b.iter(|| document.get_field(black_box("Entity500::Body::Speed")).is_void());
    });

    group.bench_function("find_by_key", |b| {
        b.iter(|| document.find_by_key(black_box("777")).is_some());
    });

    group.bench_function("get_by_tag_deep", |b| {
        b.iter(|| document.get_by_tag(black_box("entity"), None, true).len());
    });

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for entities in [10, 100, 1000] {
        let document = load_from_str(&generate_dcl_content(entities));
        group.bench_with_input(
            BenchmarkId::new("serialize", entities),
            &document,
            |b, document| {
                b.iter(|| serialize(black_box(document)).len());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_stages, bench_queries, bench_serialize);
criterion_main!(benches);
