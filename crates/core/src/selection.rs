//! Category filter state.
//!
//! Selecting a category is committed immediately; the product list for it
//! arrives later from the catalog. Every change of selection bumps a
//! generation counter, and fetches carry a [`SelectionToken`] stamped with the
//! generation they were issued under. A response whose token is no longer
//! current belongs to a superseded selection and must be dropped.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// Keyword that stands for the unfiltered selection.
pub const ALL_KEYWORD: &str = "all";

/// The category currently filtering the product display.
///
/// Serializes as the string `"all"` or the bare category id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "SelectionRepr", into = "SelectionRepr")]
pub enum CategorySelection {
    #[default]
    All,
    Category(CategoryId),
}

impl CategorySelection {
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The selected category id, or `None` for the unfiltered selection.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        match self {
            Self::All => None,
            Self::Category(id) => Some(*id),
        }
    }
}

impl From<CategoryId> for CategorySelection {
    fn from(id: CategoryId) -> Self {
        Self::Category(id)
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_KEYWORD),
            Self::Category(id) => write!(f, "{id}"),
        }
    }
}

/// Error parsing a [`CategorySelection`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid category selection '{0}': expected \"all\" or a category id")]
pub struct SelectionParseError(String);

impl FromStr for CategorySelection {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL_KEYWORD) {
            return Ok(Self::All);
        }
        trimmed
            .parse::<CategoryId>()
            .map(Self::Category)
            .map_err(|_| SelectionParseError(s.to_string()))
    }
}

/// Wire form of a selection: `"all"`, a numeric string, or a number.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SelectionRepr {
    Id(CategoryId),
    Keyword(String),
}

impl TryFrom<SelectionRepr> for CategorySelection {
    type Error = SelectionParseError;

    fn try_from(repr: SelectionRepr) -> Result<Self, Self::Error> {
        match repr {
            SelectionRepr::Id(id) => Ok(Self::Category(id)),
            SelectionRepr::Keyword(keyword) => keyword.parse(),
        }
    }
}

impl From<CategorySelection> for SelectionRepr {
    fn from(selection: CategorySelection) -> Self {
        match selection {
            CategorySelection::All => Self::Keyword(ALL_KEYWORD.to_string()),
            CategorySelection::Category(id) => Self::Id(id),
        }
    }
}

/// Identifies the selection a fetch was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionToken {
    generation: u64,
    selection: CategorySelection,
}

impl SelectionToken {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn selection(&self) -> CategorySelection {
        self.selection
    }
}

/// A response arrived for a selection that has since been superseded.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("response for {requested} (generation {requested_generation}) superseded by generation {current_generation}")]
pub struct StaleResponse {
    pub requested: CategorySelection,
    pub requested_generation: u64,
    pub current_generation: u64,
}

/// Tracks the active category filter for one session.
#[derive(Debug, Clone, Default)]
pub struct CategorySelectionState {
    selected: CategorySelection,
    generation: u64,
}

impl CategorySelectionState {
    /// Start with the unfiltered selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a new selection.
    ///
    /// Returns the token to tag the follow-up fetch with, or `None` when the
    /// selection is already active. Unknown category ids are accepted.
    pub fn select_category(&mut self, selection: CategorySelection) -> Option<SelectionToken> {
        if self.selected == selection {
            return None;
        }
        self.selected = selection;
        Some(self.bump())
    }

    /// Issue a fresh token for the current selection, superseding any fetch
    /// still in flight. Used for the initial load and retries.
    pub fn reissue(&mut self) -> SelectionToken {
        self.bump()
    }

    #[must_use]
    pub const fn selected_category(&self) -> CategorySelection {
        self.selected
    }

    #[must_use]
    pub const fn is_all_selected(&self) -> bool {
        self.selected.is_all()
    }

    /// Token for the latest issued fetch.
    #[must_use]
    pub const fn current_token(&self) -> SelectionToken {
        SelectionToken {
            generation: self.generation,
            selection: self.selected,
        }
    }

    #[must_use]
    pub fn is_current(&self, token: &SelectionToken) -> bool {
        *token == self.current_token()
    }

    /// Check that a response tagged with `token` may still be applied.
    ///
    /// # Errors
    ///
    /// Returns [`StaleResponse`] if a newer selection or fetch superseded it.
    pub fn ensure_current(&self, token: &SelectionToken) -> Result<(), StaleResponse> {
        if self.is_current(token) {
            Ok(())
        } else {
            Err(StaleResponse {
                requested: token.selection,
                requested_generation: token.generation,
                current_generation: self.generation,
            })
        }
    }

    fn bump(&mut self) -> SelectionToken {
        self.generation = self.generation.wrapping_add(1);
        self.current_token()
    }
}
