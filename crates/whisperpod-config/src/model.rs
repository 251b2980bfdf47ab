use std::{fmt, str::FromStr};

use serde::Deserialize;

/// Model served when neither the config file nor `MODEL_NAME` names one
pub const DEFAULT_MODEL_NAME: &str = "openai/whisper-large-v3-turbo";

/// Identity and numeric precision of the transcription model
///
/// Resolved once at startup and fixed for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Model identifier, echoed back in every response
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Numeric precision the model is loaded with
    #[serde(default)]
    pub compute_type: ComputeType,
    /// Device the model runs on
    #[serde(default)]
    pub device: Device,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            compute_type: ComputeType::default(),
            device: Device::default(),
        }
    }
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

/// Error returned when a model option string is not recognized
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Quantization / precision mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeType {
    /// Let the backend choose the fastest supported type
    Auto,
    Int8,
    Int8Float16,
    Int8Float32,
    Int16,
    #[default]
    Float16,
    Bfloat16,
    Float32,
}

impl ComputeType {
    const ALL: &'static str = "auto, int8, int8_float16, int8_float32, int16, float16, bfloat16, float32";

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Int8 => "int8",
            Self::Int8Float16 => "int8_float16",
            Self::Int8Float32 => "int8_float32",
            Self::Int16 => "int16",
            Self::Float16 => "float16",
            Self::Bfloat16 => "bfloat16",
            Self::Float32 => "float32",
        }
    }
}

impl FromStr for ComputeType {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Self::Auto,
            "int8" => Self::Int8,
            "int8_float16" => Self::Int8Float16,
            "int8_float32" => Self::Int8Float32,
            "int16" => Self::Int16,
            "float16" => Self::Float16,
            "bfloat16" => Self::Bfloat16,
            "float32" => Self::Float32,
            _ => {
                return Err(ParseOptionError {
                    kind: "compute type",
                    value: s.to_string(),
                    expected: Self::ALL,
                });
            }
        };

        Ok(value)
    }
}

impl fmt::Display for ComputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inference device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Auto,
    #[default]
    Cuda,
    Cpu,
}

impl Device {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cuda => "cuda",
            Self::Cpu => "cpu",
        }
    }
}

impl FromStr for Device {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cuda" => Ok(Self::Cuda),
            "cpu" => Ok(Self::Cpu),
            _ => Err(ParseOptionError {
                kind: "device",
                value: s.to_string(),
                expected: "auto, cuda, cpu",
            }),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
