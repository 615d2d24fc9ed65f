//! Record tags.
//!
//! Group markers (`t`, `d`, `o`, `s`) carry no value; the item tags that
//! follow them (`tl`, `dl`, `co`, `st`) carry one entry each.

pub const NEW_BLOCK: &str = "b";
pub const ID: &str = "i";
pub const TITLE: &str = "t";
pub const TITLE_LOCALE: &str = "tl";
pub const CREATOR: &str = "c";
pub const PRIMARY_ID: &str = "r";
pub const NAMESPACE: &str = "n";
pub const TYPE: &str = "y";
pub const DESCRIPTION: &str = "d";
pub const DESCRIPTION_LOCALE: &str = "dl";
pub const CONTRIBUTORS: &str = "o";
pub const CONTRIBUTOR: &str = "co";
pub const FORMAT: &str = "f";
pub const SUBJECT: &str = "s";
pub const SUBJECT_TAG: &str = "st";
pub const PAYLOAD: &str = "p";
pub const LINK: &str = "l";
pub const LINK_HASH: &str = "lh";
pub const PREVIOUS_BLOCK: &str = "pb";

/// Memory-level marker preceding the owner block.
pub const OWNER: &str = "o";
