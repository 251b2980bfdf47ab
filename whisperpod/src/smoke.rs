use anyhow::bail;
use stt::HandlerOutput;
use whisperpod_config::Config;

use crate::args::SmokeArgs;

/// Transcribe one URL through the in-process handler and print the result
pub async fn run(config: &Config, args: &SmokeArgs) -> anyhow::Result<()> {
    let server = stt::build_server(config)?;

    tracing::info!(audio_url = %args.audio_url, model = %server.model(), "running smoke test");

    let output = server.handle(args.job.input(Some(args.audio_url.clone()), None)).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    if let HandlerOutput::Rejected(rejection) = output {
        bail!("request rejected: {}", rejection.error);
    }

    Ok(())
}
