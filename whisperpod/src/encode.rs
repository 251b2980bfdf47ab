use std::path::Path;

use anyhow::bail;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::json;

use crate::args::EncodeArgs;

/// Print a job envelope carrying the file at `args.path` inline
pub fn run(args: &EncodeArgs) -> anyhow::Result<()> {
    let envelope = envelope(&args.path, args)?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn envelope(path: &Path, args: &EncodeArgs) -> anyhow::Result<serde_json::Value> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    let bytes = std::fs::read(path)?;
    let input = args.job.input(None, Some(STANDARD.encode(bytes)));

    Ok(json!({
        "input": {
            "audio_base64": input.audio_base64,
            "language": input.language,
            "task": input.task,
            "beam_size": input.beam_size,
            "vad_filter": input.vad_filter,
        }
    }))
}
