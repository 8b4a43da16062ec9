// Seed file loading
// A seed file is a JSON object: { "<collection>": [ { ...record... }, ... ] }

use std::collections::HashMap;
use std::path::Path;

use super::{Record, StoreError};

/// Read and parse a seed file
pub fn load_seed_file(path: &Path) -> Result<HashMap<String, Vec<Record>>, StoreError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| StoreError::Seed(format!("cannot read {}: {e}", path.display())))?;
    parse_seed(&content)
}

fn parse_seed(content: &str) -> Result<HashMap<String, Vec<Record>>, StoreError> {
    serde_json::from_str(content).map_err(|e| StoreError::Seed(format!("malformed seed JSON: {e}")))
}
