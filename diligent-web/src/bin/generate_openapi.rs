//! Write the OpenAPI document to disk
//!
//! Usage: `generate_openapi [output-dir]` (defaults to `diligent-web/docs`).

use diligent_web::openapi::get_openapi_json;
use std::fs;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let docs_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("diligent-web/docs"));

    fs::create_dir_all(&docs_dir)?;

    let json_path = docs_dir.join("openapi.json");
    fs::write(&json_path, get_openapi_json()?)?;
    println!("Generated: {}", json_path.display());

    Ok(())
}
