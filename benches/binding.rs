#![allow(unused)]
extern crate tagscope;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::{hint::black_box, sync::Arc};
use tagscope::{
    binding::{ElementQuery, TagHelperBinder},
    descriptors::{DescriptorCache, TagDescriptor, TagDescriptorBuilder, TAG_HELPER_KIND},
    Document, Engine, SourceDocument,
};

/// A descriptor set resembling a mid-sized component library
fn descriptors(cache: &DescriptorCache) -> Vec<Arc<TagDescriptor>> {
    let mut descriptors: Vec<Arc<TagDescriptor>> = (0..200)
        .map(|i| {
            TagDescriptorBuilder::new(TAG_HELPER_KIND, format!("Component{i}"), "Library")
                .tag_matching_rule(|rule| {
                    rule.tag_name(format!("x-component-{i}"))
                        .require_attribute(|attribute| attribute.name("mode"))
                })
                .bound_attribute(|attribute| attribute.name("mode").type_name("System.String"))
                .build_cached(cache)
        })
        .collect();

    descriptors.push(
        TagDescriptorBuilder::new(TAG_HELPER_KIND, "Anchor", "Library")
            .tag_matching_rule(|rule| rule.tag_name("a"))
            .tag_matching_rule(|rule| rule.tag_name("*").require_attribute(|a| a.name("asp-route")))
            .build_cached(cache),
    );
    descriptors
}

/// Benchmark indexed element binding against a large descriptor set
fn bench_binder(c: &mut Criterion) {
    let cache = DescriptorCache::new();
    let binder = TagHelperBinder::new(None, &descriptors(&cache));

    let mut group = c.benchmark_group("binder");
    group.bench_function("bound_element", |b| {
        let query = ElementQuery::new("x-component-150").attribute("mode", Some("fast"));
        b.iter(|| black_box(binder.get_binding(black_box(&query))));
    });
    group.bench_function("unbound_element", |b| {
        let query = ElementQuery::new("div").attribute("class", Some("row"));
        b.iter(|| black_box(binder.get_binding(black_box(&query))));
    });
    group.finish();
}

/// Benchmark descriptor construction with and without the cache
fn bench_descriptor_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptor_cache");
    group.bench_function("build_uncached", |b| {
        let cache = DescriptorCache::new();
        cache.set_enabled(false);
        b.iter(|| black_box(descriptors(&cache)));
    });
    group.bench_function("build_cached_warm", |b| {
        let cache = DescriptorCache::new();
        descriptors(&cache);
        b.iter(|| black_box(descriptors(&cache)));
    });
    group.finish();
}

/// Benchmark a full compilation of a template using tag helpers
fn bench_pipeline(c: &mut Criterion) {
    let cache = DescriptorCache::new();
    let descriptors = descriptors(&cache);
    let engine = Engine::create().unwrap();

    let mut source = String::from("@addTagHelper *, Library\n");
    for i in 0..200 {
        source.push_str(&format!(
            "<div class=\"row\"><x-component-{i} mode=\"m\">@Item{i}</x-component-{i}><a href=\"#\">link</a></div>\n"
        ));
    }

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("process", |b| {
        b.iter(|| {
            let mut document = Document::new(SourceDocument::new("bench.tag", source.as_str()));
            document.set_tag_helpers(descriptors.clone());
            engine.process(&mut document).unwrap();
            black_box(document)
        });
    });
    group.bench_function("process_batch", |b| {
        b.iter(|| {
            let documents = (0..16)
                .map(|_| {
                    let mut document = Document::new(SourceDocument::from_content(source.as_str()));
                    document.set_tag_helpers(descriptors.clone());
                    document
                })
                .collect();
            black_box(engine.process_batch(documents))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_binder, bench_descriptor_cache, bench_pipeline);
criterion_main!(benches);
