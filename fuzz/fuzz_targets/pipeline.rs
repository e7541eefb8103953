#![no_main]

use std::sync::{Arc, OnceLock};

use libfuzzer_sys::fuzz_target;
use tagscope::{
    descriptors::{TagDescriptor, TagDescriptorBuilder, TAG_HELPER_KIND},
    Document, Engine, SourceDocument,
};

fn engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| Engine::create().unwrap())
}

fn descriptors() -> Vec<Arc<TagDescriptor>> {
    vec![Arc::new(
        TagDescriptorBuilder::new(TAG_HELPER_KIND, "List", "Fuzz")
            .tag_matching_rule(|rule| rule.tag_name("ul"))
            .allowed_child_tag(|child| child.name("li"))
            .bound_attribute(|attribute| attribute.name("items").type_name("System.Object"))
            .build(),
    )]
}

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let source = format!("@addTagHelper *, Fuzz\n{text}");
        let mut document = Document::new(SourceDocument::new("fuzz.tag", source));
        document.set_tag_helpers(descriptors());
        let _ = engine().process(&mut document);
    }
});
