use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_piml::{from_str, to_string, PimlValue};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    #[serde(rename = "display name")]
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Clone)]
struct NestedData {
    id: u32,
    metadata: Metadata,
    tags: Vec<String>,
    notes: String,
}

#[derive(Serialize, Deserialize, Clone)]
struct Metadata {
    created: String,
    updated: String,
    version: u32,
}

fn sample_user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn sample_nested() -> NestedData {
    NestedData {
        id: 42,
        metadata: Metadata {
            created: "2023-01-01T00:00:00Z".to_string(),
            updated: "2023-12-31T23:59:59Z".to_string(),
            version: 3,
        },
        tags: vec![
            "important".to_string(),
            "verified".to_string(),
            "production".to_string(),
        ],
        notes: "First line of notes.\nSecond line.\n\n# not a comment".to_string(),
    }
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = sample_user();

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let piml = "(id) 123\n(display name) Alice\n(email) alice@example.com\n(active) true\n";

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(piml)))
    });
}

fn benchmark_serialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_array");

    for size in [10, 50, 100, 500].iter() {
        let products = products(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&products)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_array");

    for size in [10, 50, 100, 500].iter() {
        let piml = to_string(&products(*size)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &piml, |b, piml| {
            b.iter(|| from_str::<Vec<Product>>(black_box(piml)))
        });
    }
    group.finish();
}

fn benchmark_serialize_nested(c: &mut Criterion) {
    let data = sample_nested();

    c.bench_function("serialize_nested_struct", |b| {
        b.iter(|| to_string(black_box(&data)))
    });
}

fn benchmark_deserialize_nested(c: &mut Criterion) {
    let piml = to_string(&sample_nested()).unwrap();

    c.bench_function("deserialize_nested_struct", |b| {
        b.iter(|| from_str::<NestedData>(black_box(&piml)))
    });
}

fn benchmark_dynamic_value(c: &mut Criterion) {
    let piml = to_string(&products(100)).unwrap();

    c.bench_function("deserialize_dynamic_value", |b| {
        b.iter(|| from_str::<PimlValue>(black_box(&piml)))
    });
}

fn benchmark_skip_unknown_keys(c: &mut Criterion) {
    #[derive(Deserialize)]
    struct OnlyId {
        #[allow(dead_code)]
        id: u32,
    }

    let mut piml = String::from("(id) 1\n(ignored)\n");
    for i in 0..500 {
        piml.push_str(&format!("  > (Row)\n    (n) {}\n    (label) row {}\n", i, i));
    }

    c.bench_function("skip_unknown_block", |b| {
        b.iter(|| from_str::<OnlyId>(black_box(&piml)))
    });
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = sample_user();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("piml_serialize", |b| {
        b.iter(|| serde_piml::to_string(black_box(&user)))
    });

    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let piml_str = serde_piml::to_string(&user).unwrap();
    let json_str = serde_json::to_string(&user).unwrap();

    group.bench_function("piml_deserialize", |b| {
        b.iter(|| serde_piml::from_str::<User>(black_box(&piml_str)))
    });

    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json_str)))
    });

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let user = sample_user();

    c.bench_function("roundtrip_simple", |b| {
        b.iter(|| {
            let serialized = to_string(black_box(&user)).unwrap();
            let _deserialized: User = from_str(black_box(&serialized)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_array,
    benchmark_deserialize_array,
    benchmark_serialize_nested,
    benchmark_deserialize_nested,
    benchmark_dynamic_value,
    benchmark_skip_unknown_keys,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
