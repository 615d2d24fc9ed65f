use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a mutating memory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionResult {
    Ok,
    UnknownError,
    BlockNotExistent,
    BlockWithSameIdExists,
    Forbidden,
}

impl ActionResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ActionResult::Ok)
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionResult::Ok => "OK",
            ActionResult::UnknownError => "UnknownError",
            ActionResult::BlockNotExistent => "BlockNotExistent",
            ActionResult::BlockWithSameIdExists => "BlockWithSameIDExists",
            ActionResult::Forbidden => "Forbidden",
        };
        f.write_str(s)
    }
}
