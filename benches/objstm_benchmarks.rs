//! Object stream benchmarks.
//!
//! Benchmarks packing staged objects into an object stream and decoding the
//! result, with and without Flate compression.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pdf_objmodel::config::ObjectStreamConfig;
use pdf_objmodel::document::MemoryDocument;
use pdf_objmodel::object::{Dict, Object, ObjectRef};
use pdf_objmodel::objstm::ObjectStream;

/// Document with `count` small page-like dictionaries, all staged in one stream.
fn populated(count: u32) -> (MemoryDocument, ObjectStream) {
    let mut doc = MemoryDocument::new();
    let mut stream = ObjectStream::new().expect("empty object stream");
    for id in 1..=count {
        let mut page = Dict::new();
        page.insert("Type".to_string(), Object::name("Page"));
        page.insert("Parent".to_string(), Object::Reference(ObjectRef::new(count + 1, 0)));
        page.insert(
            "MediaBox".to_string(),
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(612.0),
                Object::Real(792.0),
            ]),
        );
        let r = ObjectRef::new(id, 0);
        doc.insert(r, Object::Dictionary(page)).expect("insert");
        stream.add_object(r);
    }
    (doc, stream)
}

fn bench_write_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("objstm/write");

    for count in [10u32, 100, 1000] {
        let (doc, stream) = populated(count);
        for compress in [false, true] {
            let config = ObjectStreamConfig::new().with_compress(compress);
            let label = if compress { "flate" } else { "plain" };
            group.bench_with_input(BenchmarkId::new(label, count), &config, |b, config| {
                b.iter_batched(
                    || stream.clone(),
                    |mut stream| {
                        stream
                            .write_objects(&doc, &doc, black_box(config))
                            .expect("write");
                        stream
                    },
                    criterion::BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

fn bench_parse_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("objstm/parse");

    for count in [10u32, 100, 1000] {
        for compress in [false, true] {
            let config = ObjectStreamConfig::new().with_compress(compress);
            let (doc, mut stream) = populated(count);
            stream.write_objects(&doc, &doc, &config).expect("write");
            let encoded = stream.handle().borrow().value.clone();

            let label = if compress { "flate" } else { "plain" };
            group.bench_with_input(BenchmarkId::new(label, count), &encoded, |b, encoded| {
                b.iter(|| {
                    let mut stream = ObjectStream::from_object(encoded.clone()).expect("stream");
                    let data = stream.parse_stream(&config).expect("parse");
                    black_box(data.to_map().len())
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_write_objects, bench_parse_stream);
criterion_main!(benches);
