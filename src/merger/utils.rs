// Helper functions shared by resolver, muxer and orchestrator

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::merger::models::NetworkConfig;

/// Suffix appended to the sanitized title
pub const OUTPUT_SUFFIX: &str = "_merged.mp4";

/// Read a child pipe to the end on its own task
fn drain<R>(pipe: R, label: &'static str) -> JoinHandle<Result<Vec<u8>, String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut pipe = pipe;
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read {}: {}", label, e))?;
        Ok(buf)
    })
}

async fn collect(
    task: JoinHandle<Result<Vec<u8>, String>>,
    label: &str,
) -> Result<Vec<u8>, String> {
    task.await.map_err(|e| format!("{} task failed: {}", label, e))?
}

/// Run command with timeout, capturing stdout and stderr.
///
/// The child is killed when the timeout expires.
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<Output, String> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("Failed to start {}: {}", program, e))?;

    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(out), Some(err)) => (drain(out, "stdout"), drain(err, "stderr")),
        _ => return Err(format!("Failed to capture output of {}", program)),
    };

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(waited) => {
            let status = waited.map_err(|e| format!("Failed to wait for {}: {}", program, e))?;
            Ok(Output {
                status,
                stdout: collect(stdout, "stdout").await?,
                stderr: collect(stderr, "stderr").await?,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout.abort();
            stderr.abort();
            Err(format!("Timed out after {}s", timeout_secs))
        }
    }
}

/// Output file name derived from a title.
///
/// Strips `|` and `/`, turns spaces into underscores (a run of spaces
/// becomes one underscore) and appends the merge suffix. Nothing else is
/// sanitized.
pub fn output_file_name(title: &str) -> String {
    let stripped: String = title.chars().filter(|c| !matches!(c, '|' | '/')).collect();
    let base = stripped
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    format!("{}{}", base, OUTPUT_SUFFIX)
}

/// Build proxy arguments for yt-dlp
pub fn get_proxy_args(config: &NetworkConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    args
}

/// Build timeout arguments for yt-dlp
pub fn get_timeout_args(config: &NetworkConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(timeout) = config.timeout {
        args.push("--socket-timeout".to_string());
        args.push(timeout.to_string());
    }

    args
}

/// Last `max_lines` non-empty lines of process output
pub fn tail_lines(output: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(output);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name_example() {
        assert_eq!(output_file_name("Cloud | Raj/Talk"), "Cloud_RajTalk_merged.mp4");
    }

    #[test]
    fn test_output_name_keeps_other_characters() {
        assert_eq!(
            output_file_name("Ep. 1: \"Intro\""),
            "Ep._1:_\"Intro\"_merged.mp4"
        );
    }

    #[test]
    fn test_output_name_is_deterministic() {
        assert_eq!(output_file_name("a b|c"), output_file_name("a b|c"));
        // Distinct titles can collide
        assert_eq!(output_file_name("a/b"), output_file_name("ab"));
    }

    #[test]
    fn test_proxy_and_timeout_args() {
        let config = NetworkConfig {
            proxy: Some("socks5://127.0.0.1:1080".to_string()),
            timeout: Some(15),
        };
        assert_eq!(get_proxy_args(&config), vec!["--proxy", "socks5://127.0.0.1:1080"]);
        assert_eq!(get_timeout_args(&config), vec!["--socket-timeout", "15"]);
        assert!(get_proxy_args(&NetworkConfig::default()).is_empty());
    }

    #[test]
    fn test_tail_lines() {
        let out = b"one\ntwo\n\nthree\nfour\n";
        assert_eq!(tail_lines(out, 2), "three\nfour");
        assert_eq!(tail_lines(out, 10), "one\ntwo\nthree\nfour");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_output_captures_stdout() {
        let out = run_output_with_timeout("echo", vec!["hello".to_string()], 5)
            .await
            .unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_output_times_out() {
        let err = run_output_with_timeout("sleep", vec!["5".to_string()], 1)
            .await
            .unwrap_err();
        assert_eq!(err, "Timed out after 1s");
    }
}
