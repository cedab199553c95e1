use crate::style::{
	shared::{self, AnalysisContext, Diagnostic, MessageData, Rule, RuleMeta, Severity},
	syntax::{Expr, NodeEvent, ObjectLit, unwrap_expr},
};

pub(crate) static INSERT_PAYLOADS_META: RuleMeta = RuleMeta {
	id: "TSX-STYLE-DB-001",
	severity: Severity::Error,
	fixable: false,
	messages: &[(
		"idOnInsert",
		"Do not set `id` in insert payloads. The database assigns document ids.",
	)],
};

const INSERT_METHOD: &str = "insert";
const ID_KEY: &str = "id";

/// Flags `id` properties in `*.insert(...)` payloads, one diagnostic per
/// offending object literal. Removing the property could change correctness,
/// so the rule is diagnostic-only.
#[derive(Default)]
pub(crate) struct InsertPayloads;
impl Rule for InsertPayloads {
	fn meta(&self) -> &'static RuleMeta {
		&INSERT_PAYLOADS_META
	}

	fn collect(&mut self, event: &NodeEvent<'_>, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		let NodeEvent::Call(call) = event else {
			return;
		};

		if !call.is_method_call() || call.callee_name() != Some(INSERT_METHOD) {
			return;
		}

		let Some(first_arg) = call.args.first() else {
			return;
		};

		match unwrap_expr(first_arg) {
			Expr::Object(object) => self.check_payload(object, ctx, out),
			Expr::Array(array) =>
				for element in &array.elements {
					if let Expr::Object(object) = unwrap_expr(element) {
						self.check_payload(object, ctx, out);
					}
				},
			_ => {},
		}
	}
}
impl InsertPayloads {
	fn check_payload(&self, object: &ObjectLit, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		if !object.has_key(ID_KEY) {
			return;
		}

		shared::report(out, ctx, self.meta(), object.span, "idOnInsert", MessageData::new(), None);
	}
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;
	use crate::style::{shared::analysis_context_from_text, syntax};

	fn check(text: &str) -> Vec<Diagnostic> {
		let ctx = analysis_context_from_text(Path::new("convex/posts.ts"), text.to_owned())
			.expect("context");
		let mut rule = InsertPayloads;
		let mut out = Vec::new();

		syntax::walk(&ctx.program, &mut |event| rule.collect(&event, &ctx, &mut out));
		rule.finalize(&ctx, &mut out);

		out
	}

	#[test]
	fn reports_id_in_single_insert_payload() {
		let text = "await db.insert({ id: 1, name: \"x\" });\n";
		let diagnostics = check(text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "idOnInsert");
		assert!(diagnostics[0].fix.is_none());
	}

	#[test]
	fn reports_each_offending_object_in_a_batch() {
		let text = "await db.insert([{ id: 1 }, { name: \"y\" }, { id: 3 }]);\n";
		let diagnostics = check(text);

		assert_eq!(diagnostics.len(), 2);
	}

	#[test]
	fn batch_diagnostic_is_anchored_at_the_offending_element() {
		let text = "await db.insert([{ id: 1 }, { name: \"y\" }]);\n";
		let diagnostics = check(text);
		let anchor = text.find("{ id: 1 }").expect("anchor offset");

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].line, 1);

		let ctx = analysis_context_from_text(Path::new("convex/posts.ts"), text.to_owned())
			.expect("context");

		assert_eq!(ctx.line_of(anchor), diagnostics[0].line);
	}

	#[test]
	fn quoted_id_keys_are_reported_too() {
		assert_eq!(check("db.insert({ \"id\": 7 });\n").len(), 1);
	}

	#[test]
	fn clean_payloads_and_other_methods_are_ignored() {
		assert!(check("await db.insert({ name: \"x\" });\n").is_empty());
		assert!(check("await db.update({ id: 1 });\n").is_empty());
		assert!(check("insert({ id: 1 });\n").is_empty());
	}

	#[test]
	fn nested_inserts_inside_bodies_are_found() {
		let text = "export const create = mutation(async (ctx) => {\n\tawait ctx.db.insert({ id: 9 });\n});\n";

		assert_eq!(check(text).len(), 1);
	}
}
