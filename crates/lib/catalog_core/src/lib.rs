//! # catalog_core
//!
//! Core token lifecycle logic for the catalog API: signing, verification,
//! revocation and rotation of bearer tokens, plus the user directory seam.

pub mod auth;
pub mod models;
pub mod uuid;
