use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use crate::style::{
	fixes::Fix,
	syntax::{self, NodeEvent, Program, Span},
};

/// Host file-kind convention: routable page entry files by file name.
pub(crate) const PAGE_FILE_NAMES: [&str; 2] = ["page.tsx", "page.jsx"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Severity {
	Warning,
	Error,
}
impl Severity {
	pub(crate) fn label(&self) -> &'static str {
		match self {
			Self::Warning => "warning",
			Self::Error => "error",
		}
	}
}

/// Static metadata exposed per rule: stable id, default severity, fixability,
/// and the message-template table keyed by message id.
#[derive(Debug)]
pub(crate) struct RuleMeta {
	pub(crate) id: &'static str,
	pub(crate) severity: Severity,
	pub(crate) fixable: bool,
	pub(crate) messages: &'static [(&'static str, &'static str)],
}
impl RuleMeta {
	pub(crate) fn message_template(&self, message_id: &str) -> Option<&'static str> {
		self.messages.iter().find(|(id, _)| *id == message_id).map(|(_, template)| *template)
	}
}

pub(crate) type MessageData = BTreeMap<&'static str, String>;

#[derive(Debug)]
pub(crate) struct Diagnostic {
	pub(crate) file: PathBuf,
	pub(crate) line: usize,
	pub(crate) meta: &'static RuleMeta,
	pub(crate) message_id: &'static str,
	pub(crate) data: MessageData,
	pub(crate) fix: Option<Fix>,
}
impl Diagnostic {
	pub(crate) fn message(&self) -> String {
		match self.meta.message_template(self.message_id) {
			Some(template) => fill_placeholders(template, &self.data),
			None => self.message_id.to_owned(),
		}
	}

	pub(crate) fn format(&self) -> String {
		format!(
			"{}:{}:1: [{}] {}{}",
			self.file.display(),
			self.line,
			self.meta.id,
			self.message(),
			if self.fix.is_some() { " (fixable)" } else { "" }
		)
	}
}

/// Per-file rule evaluator: `collect` consumes node-visit events in document
/// order, `finalize` runs once after the walk. Instances are created fresh for
/// every file, so per-file state never leaks across traversals.
pub(crate) trait Rule {
	fn meta(&self) -> &'static RuleMeta;

	fn collect(&mut self, event: &NodeEvent<'_>, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>);

	fn finalize(&mut self, _ctx: &AnalysisContext, _out: &mut Vec<Diagnostic>) {}
}

/// Immutable per-file input handed to every rule entry point.
#[derive(Debug)]
pub(crate) struct AnalysisContext {
	pub(crate) path: PathBuf,
	pub(crate) text: String,
	pub(crate) line_starts: Vec<usize>,
	pub(crate) program: Program,
	pub(crate) is_page_file: bool,
}
impl AnalysisContext {
	pub(crate) fn snippet(&self, span: Span) -> &str {
		span.text(&self.text)
	}

	pub(crate) fn line_of(&self, offset: usize) -> usize {
		line_from_offset(&self.line_starts, offset)
	}
}

#[derive(Debug, Clone)]
pub(crate) struct RunSummary {
	pub(crate) file_count: usize,
	pub(crate) violation_count: usize,
	pub(crate) error_count: usize,
	pub(crate) unfixable_count: usize,
	pub(crate) applied_fix_count: usize,
	pub(crate) output_lines: Vec<String>,
}

pub(crate) fn report(
	out: &mut Vec<Diagnostic>,
	ctx: &AnalysisContext,
	meta: &'static RuleMeta,
	anchor: Span,
	message_id: &'static str,
	data: MessageData,
	fix: Option<Fix>,
) {
	out.push(Diagnostic {
		file: ctx.path.clone(),
		line: ctx.line_of(anchor.start),
		meta,
		message_id,
		data,
		fix,
	});
}

pub(crate) fn fill_placeholders(template: &str, data: &MessageData) -> String {
	let mut message = template.to_owned();

	for (key, value) in data {
		message = message.replace(&format!("{{{key}}}"), value);
	}

	message
}

pub(crate) fn read_analysis_context(path: &Path) -> Option<AnalysisContext> {
	let text = fs::read_to_string(path).ok()?;

	analysis_context_from_text(path, text)
}

pub(crate) fn analysis_context_from_text(path: &Path, text: String) -> Option<AnalysisContext> {
	if text.is_empty() {
		return None;
	}

	let line_starts = build_line_starts(&text);
	let program = syntax::parse_program(&text);
	let is_page_file = path
		.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| PAGE_FILE_NAMES.contains(&name));

	Some(AnalysisContext { path: path.to_path_buf(), text, line_starts, program, is_page_file })
}

pub(crate) fn line_from_offset(line_starts: &[usize], offset: usize) -> usize {
	match line_starts.binary_search(&offset) {
		Ok(pos) => pos + 1,
		Err(pos) => pos,
	}
}

fn build_line_starts(text: &str) -> Vec<usize> {
	let mut starts = vec![0_usize];

	for (idx, ch) in text.char_indices() {
		if ch == '\n' {
			starts.push(idx + 1);
		}
	}

	starts
}
