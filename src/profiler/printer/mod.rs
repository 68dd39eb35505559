//! Output renderers for collected samples.
//!
//! | Printer | Content-Type | Produced by |
//! |---------|--------------|-------------|
//! | `text`  | `text/plain` | in-process flat report ([`text::report`]) |
//! | `gif`   | `image/gif`  | call graph through a [`GraphRenderer`] |
//! | `pdf`   | `application/pdf` | call graph through a [`GraphRenderer`], served as an attachment |
//!
//! `focus` and `ignore` are applied to the sample before any printer sees
//! it, so all three honour them identically.

mod graph;
pub mod text;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

pub use graph::{to_dot, DotCommand, GraphFormat, GraphRenderer};

use super::profile::Profile;
use super::RenderError;
use crate::core::Response;

/// Output format for a rendered profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Printer {
    /// Plain-text symbol report.
    #[default]
    Text,
    /// Call-graph raster image.
    Gif,
    /// Paginated call-graph document.
    Pdf,
}

impl Printer {
    /// Parse a printer name (`text`, `gif`, `pdf`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Printer::Text),
            "gif" => Some(Printer::Gif),
            "pdf" => Some(Printer::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Printer::Text => "text",
            Printer::Gif => "gif",
            Printer::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Printer::Text => "text/plain",
            Printer::Gif => "image/gif",
            Printer::Pdf => "application/pdf",
        }
    }

    pub fn content_disposition(&self) -> Option<&'static str> {
        match self {
            Printer::Pdf => Some(r#"attachment; filename="profile_data.pdf""#),
            _ => None,
        }
    }
}

impl fmt::Display for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to render and how.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    pub sample: &'a [u8],
    pub printer: Printer,
    pub focus: Option<&'a str>,
    pub ignore: Option<&'a str>,
}

/// A rendered profile ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedResponse {
    pub body: Bytes,
    pub content_type: &'static str,
    pub content_disposition: Option<&'static str>,
}

impl RenderedResponse {
    /// 200 response with Content-Type, Content-Length and, for documents,
    /// Content-Disposition.
    pub fn into_response(self) -> Response {
        let mut builder = Response::builder().content_type(self.content_type);
        if let Some(disposition) = self.content_disposition {
            builder = builder.content_disposition(disposition);
        }
        builder.body(self.body).build_with_length()
    }
}

/// Routes a sample to the printer a request asked for.
#[derive(Clone)]
pub struct PrinterDispatcher {
    graph: Arc<dyn GraphRenderer>,
}

impl PrinterDispatcher {
    pub fn new(graph: impl GraphRenderer + 'static) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }

    pub async fn render(&self, request: RenderRequest<'_>) -> Result<RenderedResponse, RenderError> {
        let profile = Profile::parse(request.sample)?.filter(request.focus, request.ignore);
        debug!(
            printer = %request.printer,
            focus = request.focus,
            ignore = request.ignore,
            samples = profile.total(),
            "rendering profile"
        );

        let body = match request.printer {
            Printer::Text => Bytes::from(text::report(&profile)),
            Printer::Gif => self.graph.render(to_dot(&profile), GraphFormat::Gif).await?,
            Printer::Pdf => self.graph.render(to_dot(&profile), GraphFormat::Pdf).await?,
        };

        Ok(RenderedResponse {
            body,
            content_type: request.printer.content_type(),
            content_disposition: request.printer.content_disposition(),
        })
    }
}
