//! Read access shared by local blocks and remote block proxies.

use crate::block::Block;
use crate::entity::Entity;
use crate::format::{Format, ResourceType};
use crate::link::PreviousBlockLink;
use crate::subject::{SubjectKind, SubjectTag};
use crate::value::{MultiLangText, TypedValue};

/// Read a block's fields.
///
/// Values are returned owned because remote implementations materialize them
/// from fetched documents. A remote read that fails comes back as `None` or
/// an empty collection.
pub trait BlockView {
    fn block_id(&self) -> String;
    fn primary_id(&self) -> Option<TypedValue>;
    fn namespace(&self) -> Option<String>;
    fn resource_type(&self) -> Option<ResourceType>;
    fn title(&self) -> Option<MultiLangText>;
    fn description(&self) -> Option<MultiLangText>;
    fn creator(&self) -> Option<Entity>;
    fn contributors(&self) -> Vec<Entity>;
    fn format(&self) -> Option<Format>;
    fn subjects(&self) -> Vec<SubjectTag>;
    fn previous_link(&self) -> Option<PreviousBlockLink>;
    fn payload(&self) -> Option<TypedValue>;
    fn payload_as_string(&self) -> Option<String>;
    fn link(&self) -> Option<TypedValue>;

    fn title_text(&self, locale: &str) -> Option<String> {
        self.title()
            .and_then(|t| t.get(locale).map(str::to_string))
    }

    fn description_text(&self, locale: &str) -> Option<String> {
        self.description()
            .and_then(|t| t.get(locale).map(str::to_string))
    }

    fn is_link_block(&self) -> bool {
        self.link().is_some()
    }

    fn is_subject_present(&self, kind: SubjectKind, value: &str) -> bool {
        self.subjects().iter().any(|t| t.contains(kind, value))
    }
}

impl BlockView for Block {
    fn block_id(&self) -> String {
        self.id().to_string()
    }

    fn primary_id(&self) -> Option<TypedValue> {
        Block::primary_id(self).cloned()
    }

    fn namespace(&self) -> Option<String> {
        Block::namespace(self).map(str::to_string)
    }

    fn resource_type(&self) -> Option<ResourceType> {
        Block::resource_type(self).cloned()
    }

    fn title(&self) -> Option<MultiLangText> {
        Some(Block::title(self).clone())
    }

    fn description(&self) -> Option<MultiLangText> {
        let d = Block::description(self);
        (!d.is_empty()).then(|| d.clone())
    }

    fn creator(&self) -> Option<Entity> {
        Some(Block::creator(self).clone())
    }

    fn contributors(&self) -> Vec<Entity> {
        Block::contributors(self).to_vec()
    }

    fn format(&self) -> Option<Format> {
        Block::format(self).cloned()
    }

    fn subjects(&self) -> Vec<SubjectTag> {
        Block::subjects(self).to_vec()
    }

    fn previous_link(&self) -> Option<PreviousBlockLink> {
        Block::previous_link(self).cloned()
    }

    fn payload(&self) -> Option<TypedValue> {
        Block::payload(self).cloned()
    }

    fn payload_as_string(&self) -> Option<String> {
        Block::payload_as_string(self)
    }

    fn link(&self) -> Option<TypedValue> {
        Block::link(self).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles_of(view: &impl BlockView) -> Option<String> {
        view.title_text("en")
    }

    #[test]
    fn local_block_through_view() {
        let block = Block::builder("7")
            .title("en", "T")
            .creator(Entity::now("email", "a@b"))
            .namespace("urn:x")
            .link(TypedValue::new("url", "http://x"), None)
            .build()
            .unwrap();

        assert_eq!(titles_of(&block), Some("T".to_string()));
        assert_eq!(BlockView::block_id(&block), "7");
        assert!(BlockView::is_link_block(&block));
        assert!(BlockView::description(&block).is_none());
        assert!(BlockView::payload_as_string(&block).is_none());
    }
}
