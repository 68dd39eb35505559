//! Call-graph printers.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::profiler::profile::Profile;
use crate::profiler::RenderError;

/// Output format requested from a [`GraphRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphFormat {
    Gif,
    Pdf,
}

impl GraphFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphFormat::Gif => "gif",
            GraphFormat::Pdf => "pdf",
        }
    }
}

/// External renderer that lays out a DOT graph.
#[async_trait]
pub trait GraphRenderer: Send + Sync {
    async fn render(&self, dot: String, format: GraphFormat) -> Result<Bytes, RenderError>;
}

#[async_trait]
impl<G: GraphRenderer + ?Sized> GraphRenderer for Arc<G> {
    async fn render(&self, dot: String, format: GraphFormat) -> Result<Bytes, RenderError> {
        (**self).render(dot, format).await
    }
}

/// Graphviz `dot`, run as a child process per render.
#[derive(Clone, Debug)]
pub struct DotCommand {
    program: PathBuf,
}

impl DotCommand {
    /// Use `dot` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("dot")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DotCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphRenderer for DotCommand {
    async fn render(&self, dot: String, format: GraphFormat) -> Result<Bytes, RenderError> {
        debug!(program = %self.program.display(), format = format.as_str(), "spawning graph renderer");

        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", format.as_str()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // dot reads its whole input before writing anything.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(RenderError::Renderer {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(Bytes::from(output.stdout))
    }
}

/// Build a DOT call graph: one node per symbol labelled with its flat and
/// cumulative samples, one edge per caller/callee pair weighted by samples.
pub fn to_dot(profile: &Profile) -> String {
    let total = profile.total();
    let pct = |n: u64| {
        if total == 0 {
            0.0
        } else {
            n as f64 * 100.0 / total as f64
        }
    };

    let symbols = profile.symbols();
    let ids: BTreeMap<&str, usize> = symbols
        .iter()
        .enumerate()
        .map(|(id, s)| (s.name.as_str(), id))
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "digraph profile {{");
    let _ = writeln!(out, "  label=\"Total: {} samples\";", total);
    let _ = writeln!(out, "  node [shape=box, fontname=\"Helvetica\"];");

    for (id, symbol) in symbols.iter().enumerate() {
        let _ = writeln!(
            out,
            "  n{} [label=\"{}\\nflat {} ({:.1}%)\\ncum {} ({:.1}%)\"];",
            id,
            escape(&symbol.name),
            symbol.flat,
            pct(symbol.flat),
            symbol.cum,
            pct(symbol.cum)
        );
    }

    for ((caller, callee), count) in profile.edges() {
        if let (Some(from), Some(to)) = (ids.get(caller), ids.get(callee)) {
            let _ = writeln!(out, "  n{} -> n{} [label=\"{}\"];", from, to, count);
        }
    }

    out.push_str("}\n");
    out
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}
