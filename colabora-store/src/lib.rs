#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Storage for legislative initiatives, and the topic search over them.
//!
//! The store reports the outcome of every mutation as a [`CrudOutcome`]. A
//! create for an identity that already exists, or an update or removal of
//! one that does not, is an ordinary [`CrudOutcome::Failure`], not an error.
//! [`StoreError`] is reserved for the store itself misbehaving.

mod memory;
mod search;

pub use crate::memory::MemoryRepository;
pub use crate::search::{TopicMatcher, TopicSearch};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The identity of an initiative. Unique across the store, and never changes
/// after the initiative is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InitiativeKey {
    /// The entity the initiative belongs to.
    pub entidad: String,
    /// The legislative term the initiative was filed in.
    pub legislatura: String,
    /// The sequence number of the initiative within its entity and term.
    pub numero: i64,
}

impl InitiativeKey {
    /// Build a key from its parts.
    pub fn new<E: Into<String>, L: Into<String>>(entidad: E, legislatura: L, numero: i64) -> Self {
        Self {
            entidad: entidad.into(),
            legislatura: legislatura.into(),
            numero,
        }
    }
}

impl fmt::Display for InitiativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.entidad, self.legislatura, self.numero)
    }
}

/// A legislative proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// The entity the initiative belongs to.
    pub entidad: String,
    /// The legislative term the initiative was filed in.
    pub legislatura: String,
    /// The sequence number of the initiative within its entity and term.
    pub numero: i64,
    /// The topic of the initiative, used by the topic search.
    #[serde(default)]
    pub tema: String,
    /// A description of the changes the initiative proposes.
    pub cambios: String,
    /// The document backing the initiative.
    pub documento: String,
}

impl Initiative {
    /// The identity of this initiative.
    pub fn key(&self) -> InitiativeKey {
        InitiativeKey::new(self.entidad.clone(), self.legislatura.clone(), self.numero)
    }
}

/// The mutable part of an initiative, as replaced by an update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeChanges {
    /// The new description of the changes.
    pub cambios: String,
    /// The new document.
    pub documento: String,
}

/// The kind of mutation a [`CrudOutcome`] reports on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrudAction {
    /// Inserting a new initiative.
    Create,
    /// Replacing the changes and document of an existing initiative.
    Update,
    /// Deleting an existing initiative.
    Remove,
}

impl CrudAction {
    /// The participle used in outcome messages.
    pub fn participle(self) -> &'static str {
        match self {
            Self::Create => "creada",
            Self::Update => "actualizada",
            Self::Remove => "removida",
        }
    }

    /// A short name, suitable for metrics and log fields.
    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
        }
    }
}

/// The business outcome of a create, update, or remove.
///
/// The `Display` form is the message clients see, such as
/// `ok: iniciativa 4 creada` or `error: iniciativa 2 no actualizada`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrudOutcome {
    /// The initiative was in the expected prior state and was mutated.
    Success {
        /// What was done.
        action: CrudAction,
        /// The number of the initiative.
        numero: i64,
    },
    /// The initiative was not in the expected prior state. Nothing changed.
    Failure {
        /// What was attempted.
        action: CrudAction,
        /// The number of the initiative.
        numero: i64,
    },
}

impl CrudOutcome {
    /// Whether the mutation happened.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The action this outcome reports on.
    pub fn action(&self) -> CrudAction {
        match self {
            Self::Success { action, .. } | Self::Failure { action, .. } => *action,
        }
    }
}

impl fmt::Display for CrudOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { action, numero } => {
                write!(f, "ok: iniciativa {} {}", numero, action.participle())
            }
            Self::Failure { action, numero } => {
                write!(f, "error: iniciativa {} no {}", numero, action.participle())
            }
        }
    }
}

/// A store of initiatives.
///
/// Each mutation checks the prior state of its identity and applies the
/// change as one atomic step: two concurrent creates of the same identity
/// produce exactly one [`CrudOutcome::Success`].
#[async_trait]
pub trait InitiativeRepository: Send + Sync {
    /// All initiatives of `entidad` filed in `legislatura`, ordered by number.
    async fn list(&self, entidad: &str, legislatura: &str) -> Result<Vec<Initiative>, StoreError>;

    /// Look up a single initiative.
    async fn get(&self, key: &InitiativeKey) -> Result<Option<Initiative>, StoreError>;

    /// Insert `initiative` unless its identity is already taken.
    async fn create(&self, initiative: Initiative) -> Result<CrudOutcome, StoreError>;

    /// Replace the changes and document of the initiative identified by
    /// `key`, if it exists.
    async fn update(
        &self,
        key: &InitiativeKey,
        changes: InitiativeChanges,
    ) -> Result<CrudOutcome, StoreError>;

    /// Delete the initiative identified by `key`, if it exists.
    async fn remove(&self, key: &InitiativeKey) -> Result<CrudOutcome, StoreError>;

    /// Every initiative in the store, ordered by identity. This is the corpus
    /// the topic search runs over.
    async fn all(&self) -> Result<Vec<Initiative>, StoreError>;
}

/// Errors that may occur while setting up or using a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The fixture file could not be read.
    #[error("could not read fixtures from {path}")]
    FixtureIo {
        /// The file that failed.
        path: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The fixture file was not a valid list of initiatives.
    #[error("invalid fixtures: {0}")]
    FixtureFormat(#[source] anyhow::Error),

    /// The fixture file names the same identity twice.
    #[error("duplicate initiative {0} in fixtures")]
    DuplicateFixture(InitiativeKey),

    /// The backing storage failed.
    #[error("storage backend error")]
    Backend(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::{CrudAction, CrudOutcome, Initiative, InitiativeKey};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outcome_messages() {
        let cases = [
            (CrudAction::Create, true, "ok: iniciativa 4 creada"),
            (CrudAction::Create, false, "error: iniciativa 4 no creada"),
            (CrudAction::Update, true, "ok: iniciativa 4 actualizada"),
            (CrudAction::Update, false, "error: iniciativa 4 no actualizada"),
            (CrudAction::Remove, true, "ok: iniciativa 4 removida"),
            (CrudAction::Remove, false, "error: iniciativa 4 no removida"),
        ];
        for (action, ok, expected) in cases {
            let outcome = if ok {
                CrudOutcome::Success { action, numero: 4 }
            } else {
                CrudOutcome::Failure { action, numero: 4 }
            };
            assert_eq!(outcome.to_string(), expected);
            assert_eq!(outcome.is_success(), ok);
            assert_eq!(outcome.action(), action);
        }
    }

    #[test]
    fn test_tema_defaults_to_empty() {
        let initiative: Initiative = serde_json::from_value(serde_json::json!({
            "entidad": "entidad1",
            "legislatura": "legislatura1",
            "numero": 4,
            "cambios": "cambios4",
            "documento": "documento4",
        }))
        .expect("tema should be optional");
        assert_eq!(initiative.tema, "");
        assert_eq!(initiative.key(), InitiativeKey::new("entidad1", "legislatura1", 4));
    }
}
