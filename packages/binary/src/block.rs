//! Block records.
//!
//! Field order on the wire: `i`, `t`/`tl`*, `c`, `r`, `n`, `y`, `d`/`dl`*,
//! `o`/`co`*, `f`, `s`/`st`*, `p`, `l`/`lh`, `pb`. Empty optional fields and
//! empty groups are left out. A block inside a multi-block stream is closed
//! by a `b` record.

use bytes::Bytes;
use objmem_model::{
    Block, BlockBuilder, Entity, Format, PreviousBlockLink, Relation, ResourceType, SubjectKind,
    SubjectTag, TypedValue,
};

use crate::error::{CodecError, Result};
use crate::reader::TlvReader;
use crate::tag;
use crate::writer::TlvWriter;

/// Encode a lone block. No terminator is written.
pub fn encode_block(block: &Block) -> Result<Bytes> {
    let mut w = TlvWriter::with_capacity(256);
    write_block(&mut w, block)?;
    Ok(w.finish())
}

/// Decode a lone block, stopping at a `b` record or the end of the buffer.
pub fn decode_block(bytes: &[u8]) -> Result<Block> {
    let mut r = TlvReader::new(bytes);
    read_block(&mut r)
}

pub(crate) fn write_block(w: &mut TlvWriter, block: &Block) -> Result<()> {
    w.put_record(tag::ID, &[block.id()])?;

    w.put_str(tag::TITLE)?;
    for (locale, text) in block.title().iter() {
        w.put_record(tag::TITLE_LOCALE, &[locale, text])?;
    }

    write_entity(w, tag::CREATOR, block.creator())?;

    if let Some(primary_id) = block.primary_id() {
        w.put_record(tag::PRIMARY_ID, &[&primary_id.value_type, &primary_id.value])?;
    }
    if let Some(namespace) = block.namespace() {
        w.put_record(tag::NAMESPACE, &[namespace])?;
    }
    if let Some(resource_type) = block.resource_type() {
        w.put_record(tag::TYPE, &[resource_type.as_str()])?;
    }

    if !block.description().is_empty() {
        w.put_str(tag::DESCRIPTION)?;
        for (locale, text) in block.description().iter() {
            w.put_record(tag::DESCRIPTION_LOCALE, &[locale, text])?;
        }
    }

    if !block.contributors().is_empty() {
        w.put_str(tag::CONTRIBUTORS)?;
        for contributor in block.contributors() {
            write_entity(w, tag::CONTRIBUTOR, contributor)?;
        }
    }

    if let Some(format) = block.format() {
        w.put_record(
            tag::FORMAT,
            &[
                &format.mime_type,
                format.schema.as_deref().unwrap_or(""),
                format.encoding.as_deref().unwrap_or(""),
            ],
        )?;
    }

    if !block.subjects().is_empty() {
        w.put_str(tag::SUBJECT)?;
        for subject in block.subjects() {
            w.put_str(tag::SUBJECT_TAG)?;
            write_subject(w, subject)?;
        }
    }

    if let Some(payload) = block.payload() {
        w.put_record(tag::PAYLOAD, &[&payload.value_type, &payload.value])?;
    }
    if let Some(link) = block.link() {
        w.put_record(tag::LINK, &[&link.value_type, &link.value])?;
        if let Some(hash) = block.link_hash() {
            w.put_record(tag::LINK_HASH, &[hash])?;
        }
    }
    if let Some(previous) = block.previous_link() {
        w.put_record(
            tag::PREVIOUS_BLOCK,
            &[&previous.block_id, previous.relation.as_str()],
        )?;
    }
    Ok(())
}

fn write_entity(w: &mut TlvWriter, tag: &str, entity: &Entity) -> Result<()> {
    w.put_record(
        tag,
        &[entity.entity_type(), entity.value(), &entity.date_iso8601()],
    )
}

fn write_subject(w: &mut TlvWriter, subject: &SubjectTag) -> Result<()> {
    for (level, tag) in subject.chain().enumerate() {
        if level > 0 {
            w.put_str(tag::SUBJECT_TAG)?;
        }
        w.put_str(tag.kind().as_str())?;
        w.put_str(tag.value())?;
    }
    w.put_empty();
    Ok(())
}

/// Consume one block record.
///
/// Unknown tags and unparseable field values are logged and skipped. Running
/// out of bytes inside a record is an error, as is a block that lacks a
/// required field once assembled.
pub(crate) fn read_block(r: &mut TlvReader<'_>) -> Result<Block> {
    let mut builder = BlockBuilder::new();
    let mut payload: Option<TypedValue> = None;
    let mut link: Option<TypedValue> = None;
    let mut link_hash: Option<String> = None;

    while !r.is_empty() {
        let tag = r.read_str()?;
        match tag.as_str() {
            tag::NEW_BLOCK => break,
            tag::ID => builder = builder.id(r.read_str()?),
            // Group markers carry no value.
            tag::TITLE | tag::DESCRIPTION | tag::CONTRIBUTORS | tag::SUBJECT => {}
            tag::TITLE_LOCALE => {
                let locale = r.read_str()?;
                builder = builder.title(locale, r.read_str()?);
            }
            tag::DESCRIPTION_LOCALE => {
                let locale = r.read_str()?;
                builder = builder.description(locale, r.read_str()?);
            }
            tag::CREATOR => {
                if let Some(creator) = read_entity(r)? {
                    builder = builder.creator(creator);
                }
            }
            tag::CONTRIBUTOR => {
                if let Some(contributor) = read_entity(r)? {
                    builder = builder.contributor(contributor);
                }
            }
            tag::PRIMARY_ID => builder = builder.primary_id(read_typed_value(r)?),
            tag::NAMESPACE => builder = builder.namespace(r.read_str()?),
            tag::TYPE => builder = builder.resource_type(ResourceType::new(r.read_str()?)),
            tag::FORMAT => {
                let mut format = Format::new(r.read_str()?);
                let schema = r.read_str()?;
                let encoding = r.read_str()?;
                if !schema.is_empty() {
                    format = format.with_schema(schema);
                }
                if !encoding.is_empty() {
                    format = format.with_encoding(encoding);
                }
                builder = builder.format(format);
            }
            tag::SUBJECT_TAG => {
                if let Some(subject) = read_subject(r)? {
                    builder = builder.subject(subject);
                }
            }
            tag::PAYLOAD => payload = Some(read_typed_value(r)?),
            tag::LINK => link = Some(read_typed_value(r)?),
            tag::LINK_HASH => link_hash = Some(r.read_str()?),
            tag::PREVIOUS_BLOCK => {
                let block_id = r.read_str()?;
                let relation = Relation::parse_lenient(&r.read_str()?);
                builder = builder.previous_link(PreviousBlockLink::new(block_id, relation));
            }
            other => log::warn!("Unknown tag '{}' in block record, skipping", other),
        }
    }

    if let Some(payload) = payload {
        if link.is_some() {
            log::warn!("Block record has both payload and link, keeping the payload");
        }
        builder = builder.payload(payload);
    } else if let Some(link) = link {
        builder = builder.link(link, link_hash);
    }

    Ok(builder.build()?)
}

fn read_typed_value(r: &mut TlvReader<'_>) -> Result<TypedValue> {
    let value_type = r.read_str()?;
    Ok(TypedValue::new(value_type, r.read_str()?))
}

fn read_entity(r: &mut TlvReader<'_>) -> Result<Option<Entity>> {
    let entity_type = r.read_str()?;
    let value = r.read_str()?;
    let date = r.read_str()?;
    match Entity::parse(entity_type, value, &date) {
        Ok(entity) => Ok(Some(entity)),
        Err(e) => {
            log::warn!("Skipping entity with bad date: {}", e);
            Ok(None)
        }
    }
}

/// Read a subject chain level by level. A level with an unknown kind cuts
/// the chain there; the levels above it are kept.
fn read_subject(r: &mut TlvReader<'_>) -> Result<Option<SubjectTag>> {
    let mut levels = Vec::new();
    let mut cut = false;
    loop {
        let kind = r.read_str()?;
        let value = r.read_str()?;
        if !cut {
            match kind.parse::<SubjectKind>() {
                Ok(kind) => levels.push((kind, value)),
                Err(e) => {
                    log::warn!("Skipping subject: {}", e);
                    cut = true;
                }
            }
        }

        if r.is_empty() {
            break;
        }
        match r.peek_str()?.as_str() {
            "" => {
                r.read_str()?;
                break;
            }
            tag::SUBJECT_TAG => {
                r.read_str()?;
            }
            _ => {
                log::warn!("Subject chain has no child terminator");
                break;
            }
        }
    }
    Ok(SubjectTag::from_levels(levels))
}

/// Decodes consecutive `b`-terminated blocks from one buffer.
///
/// An invalid block is returned as an error and the next call moves on to
/// the following record. Decoding stops for good after a truncated record.
pub struct BlockReader<'a> {
    reader: TlvReader<'a>,
    failed: bool,
}

impl<'a> BlockReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: TlvReader::new(bytes),
            failed: false,
        }
    }

    /// The next block, or `None` once the buffer is used up.
    pub fn decode_next(&mut self) -> Option<Result<Block>> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let result = read_block(&mut self.reader);
        if let Err(CodecError::UnexpectedEof { .. }) = result {
            self.failed = true;
        }
        Some(result)
    }
}

impl Iterator for BlockReader<'_> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next()
    }
}
