// External tool discovery (yt-dlp, ffmpeg)

use std::process::Command;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

lazy_static! {
    // "ffmpeg version 6.1.1-3ubuntu5 Copyright ..." / "ffmpeg version n7.0 ..."
    static ref FFMPEG_VERSION: Regex = Regex::new(r"ffmpeg version n?(\S+)").unwrap();
    // yt-dlp prints a bare date-based version, e.g. "2024.08.06"
    static ref YTDLP_VERSION: Regex = Regex::new(r"(\d{4}\.\d{2}\.\d{2}(?:\.\d+)?)").unwrap();
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version", // ffmpeg takes a single dash
        }
    }

    /// Pull the version number out of the tool's version output
    pub fn parse_version(&self, output: &str) -> Option<String> {
        let re: &Regex = match self {
            ToolType::YtDlp => &*YTDLP_VERSION,
            ToolType::Ffmpeg => &*FFMPEG_VERSION,
        };
        re.captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

#[derive(Debug, Default)]
pub struct ToolManager;

impl ToolManager {
    pub fn new() -> Self {
        Self
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let name = tool_type.as_str().to_string();
        let (path, version) = self.detect_tool(tool_type);

        ToolInfo {
            name,
            tool_type,
            version,
            is_available: path.is_some(),
            path,
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp),
            self.get_tool_info(ToolType::Ffmpeg),
        ]
    }

    /// Path to invoke the tool with; bare name when it was not found
    pub fn locate(&self, tool_type: ToolType) -> String {
        self.find_path(tool_type)
            .unwrap_or_else(|| tool_type.as_str().to_string())
    }

    fn detect_tool(&self, tool_type: ToolType) -> (Option<String>, Option<String>) {
        match self.find_path(tool_type) {
            Some(path) => {
                let version = self.get_version(&path, tool_type);
                (Some(path), version)
            }
            None => (None, None),
        }
    }

    fn find_path(&self, tool_type: ToolType) -> Option<String> {
        let binary_name = tool_type.as_str();

        // 1. Try common paths first
        let common_paths = [
            format!("/opt/homebrew/bin/{}", binary_name),
            format!("/usr/local/bin/{}", binary_name),
            format!("/usr/bin/{}", binary_name),
        ];

        for path in common_paths {
            if std::path::Path::new(&path).exists() {
                debug!("Found {} at {}", binary_name, path);
                return Some(path);
            }
        }

        // 2. Try PATH
        if let Ok(output) = Command::new("which").arg(binary_name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    debug!("Found {} via PATH at {}", binary_name, path);
                    return Some(path);
                }
            }
        }

        None
    }

    fn get_version(&self, path: &str, tool_type: ToolType) -> Option<String> {
        match Command::new(path).arg(tool_type.version_arg()).output() {
            Ok(output) if output.status.success() => {
                let out = String::from_utf8_lossy(&output.stdout);
                tool_type
                    .parse_version(&out)
                    .or_else(|| out.lines().next().map(|l| l.trim().to_string()))
            }
            _ => None,
        }
    }
}
