//! Print the OpenAPI document as JSON.

use std::io::Write;
use std::process::ExitCode;

use utoipa::OpenApi;
use voiceline::doc::ApiDoc;

fn main() -> ExitCode {
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(error) => {
            let _ = writeln!(std::io::stderr(), "failed to render OpenAPI document: {error}");
            return ExitCode::FAILURE;
        }
    };
    match writeln!(std::io::stdout(), "{json}") {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
