use thiserror::Error;

use crate::metamodel::SourceError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("member `{member}` of `{owner}` is backed by an unsupported {origin}")]
    UnsupportedMemberShape {
        owner: String,
        member: String,
        origin: String,
    },

    #[error("metamodel source `{source_name}` is unavailable")]
    SourceUnavailable {
        source_name: String,
        #[source]
        source: SourceError,
    },

    #[error("cannot classify member `{member}` of `{owner}` with attribute kind `{tag}`")]
    AmbiguousClassification {
        owner: String,
        member: String,
        tag: String,
    },

    #[error("cannot resolve the destination type of relation `{member}` on `{owner}`")]
    UnresolvedDestination { owner: String, member: String },

    #[error("member `{member}` is declared more than once on `{owner}`")]
    DuplicateMember { owner: String, member: String },

    #[error("type `{fqn}` is described differently by more than one source")]
    DuplicateType { fqn: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
