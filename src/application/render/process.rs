//! Renderer subprocess lifecycle: spawn, feed stdin, relay stdout, reap.

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    process::Stdio,
    time::Instant,
};

use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use metrics::{counter, histogram};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};
use tracing::{Span, error, info, warn};

const READ_CHUNK_BYTES: usize = 64 * 1024;
const LOG_TARGET: &str = "application::render::process";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("renderer `{program}` not found: {source}")]
    NotFound { program: PathBuf, source: io::Error },
    #[error("renderer `{program}` is not executable: {source}")]
    PermissionDenied { program: PathBuf, source: io::Error },
    #[error("failed to spawn renderer `{program}`: {source}")]
    Spawn { program: PathBuf, source: io::Error },
    #[error("renderer {stream} pipe was not available")]
    MissingPipe { stream: &'static str },
}

impl LaunchError {
    fn from_spawn(program: &Path, source: io::Error) -> Self {
        let program = program.to_path_buf();
        match source.kind() {
            ErrorKind::NotFound => Self::NotFound { program, source },
            ErrorKind::PermissionDenied => Self::PermissionDenied { program, source },
            _ => Self::Spawn { program, source },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Spawn { .. } => "spawn",
            Self::MissingPipe { .. } => "missing_pipe",
        }
    }
}

/// An external renderer executable.
///
/// `label` names the renderer in logs and metrics.
#[derive(Debug, Clone)]
pub struct Renderer {
    program: PathBuf,
    label: &'static str,
}

impl Renderer {
    pub fn new(program: impl Into<PathBuf>, label: &'static str) -> Self {
        Self {
            program: program.into(),
            label,
        }
    }

    /// Start the renderer with `args`.
    ///
    /// When `input` is given it is written to the renderer's stdin, which is
    /// then closed; otherwise stdin is attached to the null device. The child
    /// is killed if the returned handle is dropped before it exits.
    ///
    /// The caller's span is kept for the lifetime of the process, so output
    /// relayed later is still logged under the request that started it.
    pub fn spawn<S: AsRef<str>>(
        &self,
        op: &'static str,
        args: &[S],
        input: Option<Bytes>,
    ) -> Result<RenderProcess, LaunchError> {
        self.launch(op, args, input)
            .inspect_err(|err| self.record_launch_failure(op, err))
    }

    fn launch<S: AsRef<str>>(
        &self,
        op: &'static str,
        args: &[S],
        input: Option<Bytes>,
    ) -> Result<RenderProcess, LaunchError> {
        let started_at = Instant::now();
        let args_display = args
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");

        let mut command = Command::new(&self.program);
        command
            .args(args.iter().map(AsRef::as_ref))
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|err| LaunchError::from_spawn(&self.program, err))?;

        let stdout = child
            .stdout
            .take()
            .ok_or(LaunchError::MissingPipe { stream: "stdout" })?;

        let feeder = match input {
            Some(html) => {
                let stdin = child
                    .stdin
                    .take()
                    .ok_or(LaunchError::MissingPipe { stream: "stdin" })?;
                Some(tokio::spawn(feed_stdin(stdin, html)))
            }
            None => None,
        };

        counter!(
            "htmlpress_render_started_total",
            "renderer" => self.label,
            "op" => op
        )
        .increment(1);
        info!(
            target = LOG_TARGET,
            op,
            renderer = self.label,
            program = %self.program.display(),
            pid = child.id().unwrap_or_default(),
            args = %args_display,
            "Renderer started"
        );

        Ok(RenderProcess {
            child,
            stdout,
            feeder,
            label: self.label,
            op,
            started_at,
            span: Span::current(),
        })
    }

    fn record_launch_failure(&self, op: &'static str, err: &LaunchError) {
        counter!(
            "htmlpress_render_launch_failed_total",
            "renderer" => self.label,
            "op" => op
        )
        .increment(1);
        error!(
            target = LOG_TARGET,
            op,
            renderer = self.label,
            program = %self.program.display(),
            result = "error",
            error_code = err.code(),
            error = %err,
            "Failed to launch renderer"
        );
    }
}

async fn feed_stdin(mut stdin: ChildStdin, html: Bytes) -> io::Result<()> {
    stdin.write_all(&html).await?;
    stdin.shutdown().await
}

/// A running renderer whose stdout has not been consumed yet.
#[derive(Debug)]
pub struct RenderProcess {
    child: Child,
    stdout: ChildStdout,
    feeder: Option<JoinHandle<io::Result<()>>>,
    label: &'static str,
    op: &'static str,
    started_at: Instant,
    span: Span,
}

impl RenderProcess {
    /// Relay stdout chunk by chunk, then wait for the process to exit.
    ///
    /// Failures after the first chunk can no longer reach the client, so they
    /// end the stream quietly and are only logged and counted.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        let RenderProcess {
            mut child,
            mut stdout,
            feeder,
            label,
            op,
            started_at,
            span,
        } = self;

        stream! {
            let mut buffer = BytesMut::with_capacity(READ_CHUNK_BYTES);
            let mut output_bytes = 0usize;
            let mut failed = false;

            loop {
                buffer.reserve(READ_CHUNK_BYTES);
                match stdout.read_buf(&mut buffer).await {
                    Ok(0) => break,
                    Ok(read) => {
                        output_bytes += read;
                        yield Ok::<_, io::Error>(buffer.split().freeze());
                    }
                    Err(err) => {
                        failed = true;
                        warn!(
                            parent: &span,
                            target = LOG_TARGET,
                            op,
                            renderer = label,
                            result = "error",
                            error_code = "read_stdout",
                            error = %err,
                            "Failed to read renderer output"
                        );
                        break;
                    }
                }
            }
            drop(stdout);

            if let Some(feeder) = feeder {
                let outcome = match feeder.await {
                    Ok(result) => result,
                    Err(join) => Err(io::Error::other(join)),
                };
                if let Err(err) = outcome {
                    failed = true;
                    warn!(
                        parent: &span,
                        target = LOG_TARGET,
                        op,
                        renderer = label,
                        result = "error",
                        error_code = "write_stdin",
                        error = %err,
                        "Failed to write document to renderer"
                    );
                }
            }

            let exit = child.wait().await;
            let elapsed_ms = started_at.elapsed().as_millis() as u64;
            match exit {
                Ok(status) if status.success() => {
                    info!(
                        parent: &span,
                        target = LOG_TARGET,
                        op,
                        renderer = label,
                        result = "ok",
                        elapsed_ms,
                        output_bytes,
                        "Renderer finished"
                    );
                }
                Ok(status) => {
                    failed = true;
                    warn!(
                        parent: &span,
                        target = LOG_TARGET,
                        op,
                        renderer = label,
                        result = "error",
                        error_code = "exit_status",
                        exit_code = status.code().map(i64::from).unwrap_or(-1),
                        elapsed_ms,
                        output_bytes,
                        "Renderer exited unsuccessfully after streaming began"
                    );
                }
                Err(err) => {
                    failed = true;
                    warn!(
                        parent: &span,
                        target = LOG_TARGET,
                        op,
                        renderer = label,
                        result = "error",
                        error_code = "wait",
                        error = %err,
                        elapsed_ms,
                        "Failed to wait for renderer"
                    );
                }
            }

            if failed {
                counter!("htmlpress_render_failed_total", "renderer" => label, "op" => op)
                    .increment(1);
            }
            histogram!("htmlpress_render_ms", "renderer" => label, "op" => op)
                .record(elapsed_ms as f64);
        }
    }
}
