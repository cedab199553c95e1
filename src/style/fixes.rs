use crate::{prelude::*, style::syntax::Span};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Edit {
	pub(crate) span: Span,
	pub(crate) replacement: String,
}
impl Edit {
	pub(crate) fn replace(span: Span, replacement: impl Into<String>) -> Self {
		Self { span, replacement: replacement.into() }
	}

	pub(crate) fn insert(offset: usize, text: impl Into<String>) -> Self {
		Self { span: Span::new(offset, offset), replacement: text.into() }
	}

	pub(crate) fn delete(span: Span) -> Self {
		Self { span, replacement: String::new() }
	}
}

/// Two edits conflict when their ranges overlap; merely touching ranges do
/// not. A zero-width insertion conflicts when it sits strictly inside another
/// edit's range, or when two non-identical insertions land on the same point
/// (their output order would be ambiguous).
fn conflicts(a: &Edit, b: &Edit) -> bool {
	if a.span.is_empty() && b.span.is_empty() {
		return a.span.start == b.span.start;
	}
	if a.span.is_empty() {
		return b.span.start < a.span.start && a.span.start < b.span.end;
	}
	if b.span.is_empty() {
		return a.span.start < b.span.start && b.span.start < a.span.end;
	}

	a.span.start < b.span.end && b.span.start < a.span.end
}

/// An atomic, ordered list of edits: applied together or not at all.
#[derive(Clone, Debug)]
pub(crate) struct Fix {
	edits: Vec<Edit>,
}
impl Fix {
	/// Validates in-order non-overlap at construction; a conflicting edit list
	/// yields no fix at all.
	pub(crate) fn new(mut edits: Vec<Edit>) -> Option<Self> {
		if edits.is_empty() {
			return None;
		}

		edits.sort_by(|a, b| a.span.start.cmp(&b.span.start).then(a.span.end.cmp(&b.span.end)));
		edits.dedup();

		for (idx, edit) in edits.iter().enumerate() {
			for other in &edits[idx + 1..] {
				if conflicts(edit, other) {
					return None;
				}
			}
		}

		Some(Self { edits })
	}

	pub(crate) fn single(edit: Edit) -> Self {
		Self { edits: vec![edit] }
	}

	pub(crate) fn edits(&self) -> &[Edit] {
		&self.edits
	}
}

/// Non-conflicting collection of edits from many fixes, applied in one pass.
#[derive(Debug, Default)]
pub(crate) struct EditSet {
	edits: Vec<Edit>,
}
impl EditSet {
	/// Adds all of a fix's edits or none of them. Identical duplicate edits
	/// (same span, same replacement) coalesce with an earlier fix instead of
	/// conflicting, so two fixes may inject the same import statement once.
	pub(crate) fn add_fix(&mut self, fix: &Fix) -> bool {
		let mut fresh: Vec<&Edit> = Vec::new();

		for edit in fix.edits() {
			if self.edits.iter().any(|existing| existing == edit) {
				continue;
			}
			if self.edits.iter().chain(fresh.iter().copied()).any(|existing| conflicts(existing, edit))
			{
				return false;
			}

			fresh.push(edit);
		}

		self.edits.extend(fresh.into_iter().cloned());

		true
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	pub(crate) fn len(&self) -> usize {
		self.edits.len()
	}

	/// Applies the set by concatenation: unedited prefix, replacement, gap,
	/// replacement, ..., unedited suffix. Re-validates bounds and non-overlap
	/// so a bad set fails loudly instead of corrupting the file.
	pub(crate) fn apply(&self, source: &str) -> Result<String> {
		let mut edits = self.edits.clone();

		edits.sort_by(|a, b| a.span.start.cmp(&b.span.start).then(a.span.end.cmp(&b.span.end)));

		let mut out = String::with_capacity(source.len());
		let mut cursor = 0_usize;

		for edit in &edits {
			if edit.span.start < cursor || edit.span.end < edit.span.start {
				return Err(eyre::eyre!(
					"Overlapping edit range {}..{} at cursor {}.",
					edit.span.start,
					edit.span.end,
					cursor
				));
			}
			if edit.span.end > source.len()
				|| !source.is_char_boundary(edit.span.start)
				|| !source.is_char_boundary(edit.span.end)
			{
				return Err(eyre::eyre!(
					"Invalid edit range {}..{} for text length {}.",
					edit.span.start,
					edit.span.end,
					source.len()
				));
			}

			out.push_str(&source[cursor..edit.span.start]);
			out.push_str(&edit.replacement);

			cursor = edit.span.end;
		}

		out.push_str(&source[cursor..]);

		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fix_rejects_overlapping_edits() {
		let edits = vec![
			Edit::replace(Span::new(0, 4), "aaaa"),
			Edit::replace(Span::new(2, 6), "bbbb"),
		];

		assert!(Fix::new(edits).is_none());
	}

	#[test]
	fn fix_accepts_touching_edits() {
		let edits =
			vec![Edit::replace(Span::new(0, 4), "aaaa"), Edit::replace(Span::new(4, 8), "bbbb")];

		assert!(Fix::new(edits).is_some());
	}

	#[test]
	fn apply_concatenates_prefix_gap_and_suffix() {
		let source = "one two three four";
		let fix = Fix::new(vec![
			Edit::replace(Span::new(4, 7), "2"),
			Edit::replace(Span::new(14, 18), "4"),
		])
		.expect("fix");
		let mut set = EditSet::default();

		assert!(set.add_fix(&fix));
		assert_eq!(set.apply(source).expect("apply"), "one 2 three 4");
	}

	#[test]
	fn conflicting_fix_is_dropped_whole() {
		let source = "abcdef";
		let first = Fix::new(vec![Edit::replace(Span::new(0, 3), "X")]).expect("fix");
		let second = Fix::new(vec![
			Edit::replace(Span::new(5, 6), "Y"),
			Edit::replace(Span::new(2, 4), "Z"),
		])
		.expect("fix");
		let mut set = EditSet::default();

		assert!(set.add_fix(&first));
		assert!(!set.add_fix(&second));
		assert_eq!(set.len(), 1);
		assert_eq!(set.apply(source).expect("apply"), "Xdef");
	}

	#[test]
	fn identical_insertions_coalesce_across_fixes() {
		let source = "const a = 1;\n";
		let import = "import type { NextPage } from \"next\";\n";
		let first = Fix::new(vec![Edit::insert(0, import)]).expect("fix");
		let second =
			Fix::new(vec![Edit::insert(0, import), Edit::replace(Span::new(6, 7), "b")]).expect("fix");
		let mut set = EditSet::default();

		assert!(set.add_fix(&first));
		assert!(set.add_fix(&second));
		assert_eq!(set.len(), 2);
		assert_eq!(
			set.apply(source).expect("apply"),
			"import type { NextPage } from \"next\";\nconst b = 1;\n"
		);
	}

	#[test]
	fn insertion_inside_replaced_range_conflicts() {
		let replace = Fix::new(vec![Edit::replace(Span::new(0, 10), "X")]).expect("fix");
		let insert = Fix::new(vec![Edit::insert(5, "Y")]).expect("fix");
		let mut set = EditSet::default();

		assert!(set.add_fix(&replace));
		assert!(!set.add_fix(&insert));
	}

	#[test]
	fn apply_rejects_out_of_bounds_edits() {
		let fix = Fix::new(vec![Edit::replace(Span::new(0, 99), "X")]).expect("fix");
		let mut set = EditSet::default();

		assert!(set.add_fix(&fix));
		assert!(set.apply("short").is_err());
	}

	#[test]
	fn unedited_text_is_preserved_byte_for_byte() {
		let source = "keep1 EDIT keep2 EDIT keep3";
		let fix = Fix::new(vec![
			Edit::replace(Span::new(6, 10), "a"),
			Edit::replace(Span::new(17, 21), "b"),
		])
		.expect("fix");
		let mut set = EditSet::default();

		assert!(set.add_fix(&fix));

		let rewritten = set.apply(source).expect("apply");

		assert_eq!(rewritten, "keep1 a keep2 b keep3");
		assert!(rewritten.starts_with("keep1 "));
		assert!(rewritten.ends_with(" keep3"));
	}
}
