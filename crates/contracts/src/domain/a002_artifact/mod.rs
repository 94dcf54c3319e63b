pub mod aggregate;
pub mod lifecycle;

pub use aggregate::{
    ArtifactConfig, ArtifactData, ArtifactFieldSpec, ArtifactStatus, FieldKind, FieldStatus,
};
