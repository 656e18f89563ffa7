use log::{debug, warn};
use std::ffi::OsString;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::errors::ToolError;

// @module: External process execution with timeouts

/// Maximum number of stderr lines kept in error messages
const STDERR_TAIL_LINES: usize = 8;

/// Run `tool` to completion and collect its output.
///
/// A non-zero exit status is returned as part of the output; callers decide
/// which codes count as failure.
pub async fn run_tool(tool: &str, args: &[OsString], timeout_secs: u64) -> Result<Output, ToolError> {
    debug!("Running {} {:?}", tool, args);

    let future = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let timeout_duration = Duration::from_secs(timeout_secs);
    tokio::select! {
        result = future => {
            result.map_err(|source| ToolError::Spawn { tool: tool.to_string(), source })
        },
        _ = tokio::time::sleep(timeout_duration) => {
            Err(ToolError::Timeout { tool: tool.to_string(), secs: timeout_secs })
        }
    }
}

/// Run `tool`, feeding every stdout line to `on_line` as it arrives.
///
/// Returns the exit code and the collected stderr.
pub async fn run_tool_streaming<F>(tool: &str, args: &[OsString], timeout_secs: u64, mut on_line: F) -> Result<(Option<i32>, String), ToolError>
where
    F: FnMut(&str) + Send,
{
    debug!("Running {} {:?}", tool, args);

    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Spawn { tool: tool.to_string(), source })?;

    let stdout = child.stdout.take().ok_or_else(|| ToolError::InvalidOutput {
        tool: tool.to_string(),
        message: "stdout was not captured".to_string(),
    })?;
    let stderr = child.stderr.take();

    // stderr is read alongside stdout, never after it
    let stderr_task = tokio::spawn(async move {
        let mut stderr_text = String::new();
        if let Some(stderr) = stderr {
            let mut stderr_lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = stderr_lines.next_line().await {
                stderr_text.push_str(&line);
                stderr_text.push('\n');
            }
        }
        stderr_text
    });

    let run = async {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await.map_err(|source| ToolError::Spawn {
            tool: tool.to_string(),
            source,
        })? {
            on_line(&line);
        }

        let stderr_text = stderr_task.await.unwrap_or_default();

        let status = child.wait().await.map_err(|source| ToolError::Spawn {
            tool: tool.to_string(),
            source,
        })?;
        Ok::<_, ToolError>((status.code(), stderr_text))
    };

    let timeout_duration = Duration::from_secs(timeout_secs);
    tokio::select! {
        result = run => result,
        _ = tokio::time::sleep(timeout_duration) => {
            warn!("{} exceeded {}s, killing it", tool, timeout_secs);
            Err(ToolError::Timeout { tool: tool.to_string(), secs: timeout_secs })
        }
    }
}

/// Build a `Failed` error from a process's stderr
pub fn failure(tool: &str, code: Option<i32>, stderr: &[u8]) -> ToolError {
    ToolError::Failed {
        tool: tool.to_string(),
        code,
        stderr: filter_stderr(&String::from_utf8_lossy(stderr)),
    }
}

/// Keep the last meaningful stderr lines, dropping blank lines and banners
pub fn filter_stderr(stderr: &str) -> String {
    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("mkvextract v") && !line.starts_with("mkvmerge v"))
        .collect();

    if meaningful.is_empty() {
        return "no error output".to_string();
    }

    let start = meaningful.len().saturating_sub(STDERR_TAIL_LINES);
    meaningful[start..].join("\n")
}
