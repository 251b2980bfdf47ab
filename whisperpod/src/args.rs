use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf};

use clap::{Parser, Subcommand};
use stt::{Task, TranscriptionInput};
use whisperpod_config::{ComputeType, Device};

/// Speech-to-text inference worker
#[derive(Debug, Parser)]
#[command(name = "whisperpod", version, about = "Speech-to-text worker for Whisper models")]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "WHISPERPOD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "WHISPERPOD_LISTEN", global = true)]
    pub listen: Option<SocketAddr>,

    /// Override the model identifier
    #[arg(long, env = "MODEL_NAME", global = true)]
    pub model: Option<String>,

    /// Override the numeric precision of the model
    #[arg(long, env = "COMPUTE_TYPE", global = true)]
    pub compute_type: Option<ComputeType>,

    /// Override the inference device
    #[arg(long, env = "DEVICE", global = true)]
    pub device: Option<Device>,

    /// Log filter
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the worker HTTP server (default)
    Serve,
    /// Print a request payload carrying a local audio file as base64
    Encode(EncodeArgs),
    /// Transcribe one URL in-process and print the response
    Smoke(SmokeArgs),
}

#[derive(Debug, clap::Args)]
pub struct EncodeArgs {
    /// Audio file to embed
    pub path: PathBuf,

    #[command(flatten)]
    pub job: JobArgs,
}

#[derive(Debug, clap::Args)]
pub struct SmokeArgs {
    /// http(s) URL of the audio to transcribe
    #[arg(long)]
    pub audio_url: String,

    #[command(flatten)]
    pub job: JobArgs,
}

/// Transcription parameters shared by the helper commands
#[derive(Debug, clap::Args)]
pub struct JobArgs {
    /// Language code; omit to auto-detect
    #[arg(long)]
    pub language: Option<String>,

    /// transcribe or translate
    #[arg(long, default_value = "transcribe")]
    pub task: Task,

    /// Decoding beam width
    #[arg(long, default_value = "5")]
    pub beam_size: NonZeroU32,

    /// Keep non-speech audio instead of filtering it out
    #[arg(long)]
    pub no_vad_filter: bool,
}

impl JobArgs {
    /// Request input for the given audio source
    pub fn input(&self, audio_url: Option<String>, audio_base64: Option<String>) -> TranscriptionInput {
        TranscriptionInput {
            audio_url,
            audio_base64,
            language: self.language.clone(),
            task: self.task,
            beam_size: self.beam_size,
            vad_filter: !self.no_vad_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn smoke_defaults_match_request_schema() {
        let args = Args::try_parse_from(["whisperpod", "smoke", "--audio-url", "https://x/a.mp3"]).unwrap();
        let Some(Command::Smoke(smoke)) = args.command else {
            panic!("expected smoke command");
        };

        let input = smoke.job.input(Some(smoke.audio_url.clone()), None);
        assert_eq!(input.task, Task::Transcribe);
        assert_eq!(input.beam_size.get(), 5);
        assert!(input.vad_filter);
        assert_eq!(input.language, None);
    }

    #[test]
    fn vad_filter_can_be_disabled() {
        let args = Args::try_parse_from([
            "whisperpod",
            "smoke",
            "--audio-url",
            "https://x/a.mp3",
            "--no-vad-filter",
            "--task",
            "translate",
            "--language",
            "it",
        ])
        .unwrap();
        let Some(Command::Smoke(smoke)) = args.command else {
            panic!("expected smoke command");
        };

        let input = smoke.job.input(Some(smoke.audio_url.clone()), None);
        assert!(!input.vad_filter);
        assert_eq!(input.task, Task::Translate);
        assert_eq!(input.language.as_deref(), Some("it"));
    }

    #[test]
    fn zero_beam_size_is_rejected() {
        let result = Args::try_parse_from(["whisperpod", "encode", "a.wav", "--beam-size", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn model_options_are_parsed() {
        let args = Args::try_parse_from([
            "whisperpod",
            "--model",
            "Systran/faster-whisper-small",
            "--compute-type",
            "int8",
            "--device",
            "cpu",
            "serve",
        ])
        .unwrap();

        assert_eq!(args.model.as_deref(), Some("Systran/faster-whisper-small"));
        assert_eq!(args.compute_type, Some(ComputeType::Int8));
        assert_eq!(args.device, Some(Device::Cpu));
    }
}
