use facet_model::FieldKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("panel {panel} has no field named {field}")]
    UnknownField { panel: String, field: String },

    #[error("field {field} holds {expected} values, got {actual}")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("panel {panel} has no sort configured")]
    SortNotConfigured { panel: String },

    #[error("invalid binding in panel {panel}: {source}")]
    Binding {
        panel: String,
        #[source]
        source: facet_model::ModelError,
    },

    #[error("failed to schedule commit: {0}")]
    Sync(#[from] facet_sync::SyncError),
}

pub type Result<T> = std::result::Result<T, StateError>;
