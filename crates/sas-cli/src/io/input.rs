use std::fs;

use anyhow::{anyhow, Context, Result};

/// Byte arguments accept `0x<hex>`, `@<path>` (raw file contents), or
/// literal UTF-8 text.
pub fn read_bytes_arg(arg: &str) -> Result<Vec<u8>> {
    if let Some(hex_str) = arg.strip_prefix("0x") {
        return hex::decode(hex_str).map_err(|e| anyhow!("invalid hex `{arg}`: {e}"));
    }
    if let Some(path) = arg.strip_prefix('@') {
        return fs::read(path).with_context(|| format!("reading {path}"));
    }
    Ok(arg.as_bytes().to_vec())
}
