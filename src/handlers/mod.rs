pub mod client_import;
pub mod creator_import;
pub mod fields;

pub use client_import::ClientImportHandler;
pub use creator_import::CreatorImportHandler;

/// Job-type keys the bootstrap registers.
pub const CLIENT_IMPORT: &str = "client-import";
pub const CREATOR_IMPORT: &str = "creator-import";
/// Legacy alias for the grouped creator import.
pub const INFLUENCER_IMPORT: &str = "influencer-import";
