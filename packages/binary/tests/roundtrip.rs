//! Encoding tests against the public API.

use objmem_binary::{compress, decode_block, decode_memory, decompress, encode_block, encode_memory};
use objmem_model::{
    Block, DocumentCodec, Entity, Format, Header, JsonDocumentCodec, MemoryDocument, SubjectKind,
    SubjectTag, TypedValue,
};

fn entity() -> Entity {
    Entity::parse("email", "a@b", "2020-01-01T00:00:00+00:00").unwrap()
}

fn block(id: &str) -> Block {
    Block::builder(id)
        .title("en", "Title")
        .title("fr", "Titre")
        .creator(entity())
        .format(Format::new("application/json").with_schema("urn:schema:v1"))
        .subject(
            SubjectTag::ontology("http://x/onto#vehicle")
                .with_child(SubjectTag::text("car"))
                .unwrap(),
        )
        .payload(TypedValue::new("base64", "aGVsbG8="))
        .build()
        .unwrap()
}

#[test]
fn block_fields_survive_encoding() {
    let original = block("12");
    let decoded = decode_block(&encode_block(&original).unwrap()).unwrap();

    assert_eq!(decoded.id(), "12");
    assert_eq!(decoded.title_text("en"), Some("Title"));
    assert_eq!(decoded.title_text("fr"), Some("Titre"));
    assert_eq!(decoded.title().len(), 2);
    assert_eq!(decoded.creator(), &entity());
    assert_eq!(decoded.format(), original.format());

    let subject = &decoded.subjects()[0];
    assert_eq!(subject.kind(), SubjectKind::Ontology);
    assert_eq!(subject.value(), "http://x/onto#vehicle");
    let child = subject.child().unwrap();
    assert_eq!(child.kind(), SubjectKind::Text);
    assert_eq!(child.value(), "car");
    assert!(child.child().is_none());

    assert_eq!(decoded.payload(), Some(&TypedValue::new("base64", "aGVsbG8=")));
    assert_eq!(decoded.payload_as_string().as_deref(), Some("hello"));
}

#[test]
fn memory_keeps_block_order_and_count() {
    let ids = ["5", "1", "9", "3"];
    let doc = MemoryDocument {
        header: Header::new(TypedValue::new("url", "http://host/rest/M")),
        owner: None,
        blocks: ids.iter().map(|id| block(id)).collect(),
    };
    let bytes = encode_memory(&doc).unwrap();

    // header (2 strings), empty additional marker, empty owner marker, count
    let count_at = 2 + 3 + 2 + 18 + 2 + 2;
    let count = i32::from_be_bytes(bytes[count_at..count_at + 4].try_into().unwrap());
    assert_eq!(count, 4);

    let decoded = decode_memory(&bytes).unwrap();
    let decoded_ids: Vec<&str> = decoded.blocks.iter().map(|b| b.id()).collect();
    assert_eq!(decoded_ids, ids);
}

#[test]
fn compressed_memory_file() {
    let doc = MemoryDocument {
        header: Header::new(TypedValue::new("url", "http://host/rest/M")),
        owner: Some(Block::owner_block(
            TypedValue::new("url", "http://host/rest/M"),
            "ACME",
        )),
        blocks: (1..=20).map(|i| block(&i.to_string())).collect(),
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.ommz");
    std::fs::write(&path, compress(&encode_memory(&doc).unwrap())).unwrap();

    let raw = decompress(&std::fs::read(&path).unwrap()).unwrap();
    let decoded = decode_memory(&raw).unwrap();
    assert_eq!(decoded.blocks.len(), 20);
    assert_eq!(
        decoded.owner.unwrap().payload_as_string().as_deref(),
        Some("ACME")
    );
}

#[test]
fn repeating_subject_from_json_matches_binary_copy() {
    let json = br#"{
        "id": "5",
        "title": {"en": "T"},
        "creator": {"type": "email", "value": "a@b", "date": "2020-01-01T00:00:00+00:00"},
        "namespace": "urn:x",
        "subject": [{"kind": "Text", "value": "a", "child": {"kind": "Text", "value": "a"}}]
    }"#;

    let from_json = JsonDocumentCodec.decode_block(json).unwrap();
    assert_eq!(from_json.subjects(), &[SubjectTag::text("a")]);

    let from_binary = decode_block(&encode_block(&from_json).unwrap()).unwrap();
    assert_eq!(from_binary.subjects(), from_json.subjects());
}
