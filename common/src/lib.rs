//! Types shared between the portal backend and its clients: persisted
//! models, the grading scale and the raw payloads posted by forms.

pub mod grading;
pub mod model;
pub mod requests;
