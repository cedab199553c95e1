use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Required suffix for page-component names.
pub(crate) const PAGE_SUFFIX: &str = "Page";
/// Name used when no path segment carries semantic content.
pub(crate) const FALLBACK_PAGE_NAME: &str = "IndexPage";

const ROOT_MARKERS: [&str; 3] = ["app", "src", "pages"];

static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("Expected operation to succeed.")
});

/// Derives the canonical page-component name from the file path.
///
/// Directory segments are walked nearest to root; grouping markers
/// (`(marketing)`), dynamic markers (`[id]`) and root markers contribute no
/// semantic name and are skipped. The first semantic segment is split on
/// separator punctuation, title-cased, joined and suffixed. Pure function of
/// the path.
pub(crate) fn synthesize_page_name(path: &Path) -> String {
	let mut segments = directory_segments(path);

	segments.reverse();

	for segment in segments {
		if is_organizational_segment(&segment) {
			continue;
		}

		let joined = title_case_join(&segment);

		// A segment like `404` joins to nothing identifier-shaped.
		if joined.is_empty() || !IDENT_RE.is_match(&joined) {
			continue;
		}

		return format!("{joined}{PAGE_SUFFIX}");
	}

	FALLBACK_PAGE_NAME.to_owned()
}

/// Derives the route served by a page file from its directory position below
/// the `app` root: route groups in parentheses are elided and bracketed
/// dynamic segments become named parameters. `None` when the path carries no
/// route root, which suppresses route-based findings.
pub(crate) fn route_from_path(path: &Path) -> Option<String> {
	let segments = directory_segments(path);
	let root = segments.iter().rposition(|segment| segment == "app" || segment == "pages")?;
	let mut parts = Vec::new();

	for segment in &segments[root + 1..] {
		if is_group_segment(segment) {
			continue;
		}
		if let Some(param) = dynamic_segment_name(segment) {
			parts.push(format!(":{param}"));

			continue;
		}

		parts.push(segment.clone());
	}

	if parts.is_empty() { Some("/".to_owned()) } else { Some(format!("/{}", parts.join("/"))) }
}

pub(crate) fn title_case_join(segment: &str) -> String {
	segment
		.split(['-', '_', '.', ' '])
		.filter(|piece| !piece.is_empty())
		.map(title_case_piece)
		.collect()
}

fn title_case_piece(piece: &str) -> String {
	let mut chars = piece.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
		None => String::new(),
	}
}

fn directory_segments(path: &Path) -> Vec<String> {
	let dir = path.parent().unwrap_or(path);

	dir.components()
		.filter_map(|component| component.as_os_str().to_str())
		.filter(|segment| !segment.is_empty() && *segment != "/" && *segment != ".")
		.map(ToOwned::to_owned)
		.collect()
}

fn is_organizational_segment(segment: &str) -> bool {
	is_group_segment(segment)
		|| dynamic_segment_name(segment).is_some()
		|| ROOT_MARKERS.contains(&segment)
}

fn is_group_segment(segment: &str) -> bool {
	segment.starts_with('(') && segment.ends_with(')')
}

fn dynamic_segment_name(segment: &str) -> Option<&str> {
	let inner = segment.strip_prefix('[')?.strip_suffix(']')?;

	Some(inner.trim_start_matches('.'))
}
