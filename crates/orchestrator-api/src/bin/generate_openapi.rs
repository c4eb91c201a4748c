//! Writes the OpenAPI document to `openapi.json` at the workspace root.
//!
//! Usage: `cargo run --bin generate_openapi`

use orchestrator_api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let spec = ApiDoc::openapi().to_pretty_json().expect("failed to serialize OpenAPI document");

    let out_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../openapi.json");
    std::fs::write(&out_path, &spec).expect("failed to write openapi.json");

    println!("Wrote OpenAPI document to {}", out_path.display());
}
