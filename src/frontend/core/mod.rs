//! Core algorithm layer
//! Contains the type model shared by inference, annotations and modules

pub mod type_system;
