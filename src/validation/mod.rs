// Sat Jan 17 2026 - Alex

pub mod hash;

pub use hash::{
    known_build, sha256_file, verify_file, verify_project, HashCheck, HashError, VANILLA_EU_SHA256,
    VANILLA_NA_SHA256,
};
