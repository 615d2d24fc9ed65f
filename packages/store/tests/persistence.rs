use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use objmem_model::{
    ActionResult, Block, Entity, Format, Relation, PreviousBlockLink, SubjectTag, TypedValue,
};
use objmem_store::{
    load, load_block, save, save_block, EventKind, Memory, MemoryEvent, MemoryListener, Source,
};

fn actor() -> Entity {
    Entity::parse("email", "a@b", "2020-01-01T00:00:00+00:00").unwrap()
}

fn sample_memory() -> Memory {
    let mut memory = Memory::with_primary_id(TypedValue::new("url", "http://host/rest/M"));
    let primary_id = memory.header().primary_id.clone();
    memory.set_owner(Some(Block::owner_block(primary_id, "ACME")));

    let first = Block::builder("1")
        .title("en", "T")
        .title("de", "Titel")
        .creator(actor())
        .format(Format::new("text/plain"))
        .subject(
            SubjectTag::ontology("vehicle")
                .with_child(SubjectTag::text("car"))
                .unwrap(),
        )
        .payload(TypedValue::new("none", "hello"))
        .build()
        .unwrap();
    let second = Block::builder("2")
        .title("en", "Manual")
        .creator(actor())
        .namespace("urn:x:manual")
        .link(TypedValue::new("url", "http://x/manual.pdf"), None)
        .previous_link(PreviousBlockLink::new("1", Relation::Previous))
        .build()
        .unwrap();

    assert_eq!(memory.add_block(first, &actor()), ActionResult::Ok);
    assert_eq!(memory.add_block(second, &actor()), ActionResult::Ok);
    memory
}

fn assert_same_blocks(loaded: &Memory, original: &Memory) {
    assert_eq!(loaded.header(), original.header());
    assert_eq!(loaded.block_ids(), original.block_ids());
    for (a, b) in loaded.blocks().zip(original.blocks()) {
        assert_eq!(a, b);
    }
    assert_eq!(
        loaded.owner().and_then(|o| o.payload_as_string()).as_deref(),
        Some("ACME")
    );
}

#[test]
fn memory_files_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let memory = sample_memory();

    for name in ["memory.json", "memory.omm", "memory.ommz"] {
        let path = dir.path().join(name);
        save(&memory, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_same_blocks(&loaded, &memory);
        assert_eq!(loaded.source(), &Source::LocalFile(path.clone()));
    }
}

#[test]
fn block_files_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let memory = sample_memory();
    let block = memory.block("2").unwrap();

    for name in ["block.json", "block.omb", "block.ombz"] {
        let path = dir.path().join(name);
        save_block(block, &path).unwrap();
        assert_eq!(&load_block(&path).unwrap(), block);
    }
}

#[test]
fn unsupported_suffix_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.xml");
    assert!(save(&sample_memory(), &path).is_err());
    assert!(!path.exists());
}

#[test]
fn payload_read_back_after_add() {
    let mut memory = Memory::with_primary_id(TypedValue::new("url", "http://host/rest/M"));
    let block = Block::builder("1")
        .title("en", "T")
        .creator(actor())
        .format(Format::new("text/plain"))
        .payload(TypedValue::new("none", "hello"))
        .build()
        .unwrap();

    assert_eq!(memory.add_block(block, &actor()).to_string(), "OK");
    assert_eq!(
        memory.block("1").unwrap().payload_as_string().as_deref(),
        Some("hello")
    );
}

struct Counter(AtomicUsize);

impl MemoryListener for Counter {
    fn on_event(&self, event: &MemoryEvent) {
        if event.kind == EventKind::BlockAdded {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn loaded_memory_fires_events_for_new_blocks_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.omm");
    save(&sample_memory(), &path).unwrap();

    let mut memory = load(&path).unwrap();
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    memory.add_listener(counter.clone());

    let id = memory
        .create_block(
            Block::builder("ignored").title("en", "Added").namespace("urn:x"),
            &actor(),
        )
        .unwrap();
    memory.drain();

    assert_eq!(id, "3");
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}
