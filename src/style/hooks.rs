use crate::style::{
	fixes::{Edit, Fix},
	shared::{self, AnalysisContext, Diagnostic, MessageData, Rule, RuleMeta, Severity},
	syntax::{CallExpr, Expr, NodeEvent, Span, unwrap_expr},
};

pub(crate) static STATE_HOOKS_META: RuleMeta = RuleMeta {
	id: "TSX-STYLE-HOOK-001",
	severity: Severity::Error,
	fixable: true,
	messages: &[
		(
			"redundantLiteralType",
			"Drop the redundant `{type}` type argument; it is inferred from the initializer.",
		),
		(
			"redundantArrayType",
			"Drop the redundant `{type}` type argument; it is inferred from the empty array initializer.",
		),
		(
			"narrowUndefinedUnion",
			"Call `useState<{base}>()` instead of passing `undefined` explicitly.",
		),
		(
			"narrowNullUnion",
			"Prefer absent state: call `useState<{base}>()` instead of initializing with `null`.",
		),
	],
};

const HOOK_NAME: &str = "useState";
const PRIMITIVES: [&str; 6] = ["boolean", "string", "number", "bigint", "null", "undefined"];

/// Removes or narrows `useState` type arguments that restate the initializer:
/// literal initializers and empty typed arrays drop the whole type-argument
/// clause, two-member `undefined`/`null` unions narrow to the base member and
/// empty the argument list.
#[derive(Default)]
pub(crate) struct StateHooks;
impl Rule for StateHooks {
	fn meta(&self) -> &'static RuleMeta {
		&STATE_HOOKS_META
	}

	fn collect(&mut self, event: &NodeEvent<'_>, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		let NodeEvent::Call(call) = event else {
			return;
		};

		if call.callee_name() != Some(HOOK_NAME) {
			return;
		}

		let Some(type_args) = &call.type_args else {
			return;
		};

		if type_args.args.len() != 1 || call.args.len() != 1 {
			return;
		}

		let ty_text = type_args.args[0].span.text(&ctx.text);
		let init = unwrap_expr(&call.args[0]);
		let members = split_union(ty_text);

		match members.len() {
			1 => self.check_single_member(call, type_args.span, &members[0], init, ctx, out),
			2 => self.check_two_member_union(call, &members, init, ctx, out),
			// Wider unions are ambiguous about the base member.
			_ => {},
		}
	}
}
impl StateHooks {
	fn check_single_member(
		&self,
		call: &CallExpr,
		type_args_span: Span,
		member: &str,
		init: &Expr,
		ctx: &AnalysisContext,
		out: &mut Vec<Diagnostic>,
	) {
		let message_id = if is_primitive(member) && literal_matches_primitive(member, init, ctx) {
			"redundantLiteralType"
		} else if element_type(member).is_some_and(is_primitive) && is_empty_array(init) {
			"redundantArrayType"
		} else {
			return;
		};
		let fix = Fix::new(vec![Edit::delete(type_args_span)]);
		let mut data = MessageData::new();

		data.insert("type", member.to_owned());
		shared::report(out, ctx, self.meta(), call.span, message_id, data, fix);
	}

	fn check_two_member_union(
		&self,
		call: &CallExpr,
		members: &[String],
		init: &Expr,
		ctx: &AnalysisContext,
		out: &mut Vec<Diagnostic>,
	) {
		let (message_id, absent) = match init {
			Expr::Ident(ident) if ident.name == "undefined" => ("narrowUndefinedUnion", "undefined"),
			Expr::Null(_) => ("narrowNullUnion", "null"),
			_ => return,
		};
		let Some(base) = union_base(members, absent) else {
			return;
		};
		let Some(type_args) = &call.type_args else {
			return;
		};
		let fix = Fix::new(vec![
			Edit::replace(type_args.span, format!("<{base}>")),
			Edit::replace(call.args_span, "()"),
		]);
		let mut data = MessageData::new();

		data.insert("base", base.to_owned());
		shared::report(out, ctx, self.meta(), call.span, message_id, data, fix);
	}
}

/// Splits a type on top-level `|`, respecting bracket nesting.
fn split_union(ty_text: &str) -> Vec<String> {
	let bytes = ty_text.as_bytes();
	let mut members = Vec::new();
	let mut depth = 0_i32;
	let mut start = 0_usize;

	for (idx, ch) in bytes.iter().enumerate() {
		match ch {
			b'<' | b'(' | b'[' | b'{' => depth += 1,
			b'>' | b')' | b']' | b'}' => depth -= 1,
			b'|' if depth == 0 => {
				members.push(ty_text[start..idx].trim().to_owned());

				start = idx + 1;
			},
			_ => {},
		}
	}

	members.push(ty_text[start..].trim().to_owned());
	members.retain(|member| !member.is_empty());

	members
}

fn is_primitive(member: &str) -> bool {
	PRIMITIVES.contains(&member)
}

fn element_type(member: &str) -> Option<&str> {
	if let Some(base) = member.strip_suffix("[]") {
		return Some(base.trim());
	}

	member.strip_prefix("Array<")?.strip_suffix('>').map(str::trim)
}

fn union_base<'a>(members: &'a [String], absent: &str) -> Option<&'a str> {
	let (absent_members, base_members): (Vec<&String>, Vec<&String>) =
		members.iter().partition(|member| member.as_str() == absent);

	if absent_members.len() != 1 || base_members.len() != 1 {
		return None;
	}

	Some(base_members[0].as_str())
}

fn literal_matches_primitive(member: &str, init: &Expr, ctx: &AnalysisContext) -> bool {
	match member {
		"boolean" => matches!(init, Expr::Bool(_)),
		"string" => matches!(init, Expr::Str(_)),
		"number" => matches!(init, Expr::Num(span) if !span.text(&ctx.text).ends_with('n')),
		"bigint" => matches!(init, Expr::Num(span) if span.text(&ctx.text).ends_with('n')),
		"null" => matches!(init, Expr::Null(_)),
		"undefined" => matches!(init, Expr::Ident(ident) if ident.name == "undefined"),
		_ => false,
	}
}

fn is_empty_array(init: &Expr) -> bool {
	matches!(init, Expr::Array(array) if array.elements.is_empty())
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;
	use crate::style::{fixes::EditSet, shared::analysis_context_from_text, syntax};

	fn check(text: &str) -> Vec<Diagnostic> {
		let ctx = analysis_context_from_text(Path::new("app/counter.tsx"), text.to_owned())
			.expect("context");
		let mut rule = StateHooks;
		let mut out = Vec::new();

		syntax::walk(&ctx.program, &mut |event| rule.collect(&event, &ctx, &mut out));
		rule.finalize(&ctx, &mut out);

		out
	}

	fn fix(text: &str) -> String {
		let diagnostics = check(text);
		let mut set = EditSet::default();

		for diagnostic in &diagnostics {
			if let Some(fix) = &diagnostic.fix {
				set.add_fix(fix);
			}
		}

		set.apply(text).expect("apply")
	}

	#[test]
	fn boolean_literal_drops_the_type_argument() {
		let text = "const [open, setOpen] = useState<boolean>(false);\n";
		let diagnostics = check(text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "redundantLiteralType");
		assert_eq!(fix(text), "const [open, setOpen] = useState(false);\n");
	}

	#[test]
	fn string_number_and_null_literals_drop_the_type_argument() {
		assert_eq!(fix("const [s] = useState<string>(\"hi\");\n"), "const [s] = useState(\"hi\");\n");
		assert_eq!(fix("const [n] = useState<number>(0);\n"), "const [n] = useState(0);\n");
		assert_eq!(fix("const [x] = useState<null>(null);\n"), "const [x] = useState(null);\n");
	}

	#[test]
	fn empty_array_of_primitives_drops_the_type_argument() {
		let text = "const [items, setItems] = useState<string[]>([]);\n";
		let diagnostics = check(text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "redundantArrayType");
		assert_eq!(fix(text), "const [items, setItems] = useState([]);\n");
		assert_eq!(fix("const [ns] = useState<Array<number>>([]);\n"), "const [ns] = useState([]);\n");
	}

	#[test]
	fn undefined_union_narrows_and_empties_the_call() {
		let text = "const [count, setCount] = useState<number | undefined>(undefined);\n";
		let diagnostics = check(text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "narrowUndefinedUnion");
		assert_eq!(fix(text), "const [count, setCount] = useState<number>();\n");
	}

	#[test]
	fn null_union_narrows_toward_absent_state() {
		let text = "const [user, setUser] = useState<User | null>(null);\n";
		let diagnostics = check(text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "narrowNullUnion");
		assert_eq!(fix(text), "const [user, setUser] = useState<User>();\n");
	}

	#[test]
	fn wider_unions_are_left_alone() {
		assert!(check("const [v] = useState<number | string | undefined>(undefined);\n").is_empty());
	}

	#[test]
	fn mismatched_literals_are_left_alone() {
		assert!(check("const [v] = useState<boolean>(compute());\n").is_empty());
		assert!(check("const [v] = useState<string>(0);\n").is_empty());
		assert!(check("const [v] = useState<Item[]>([seed]);\n").is_empty());
	}

	#[test]
	fn member_form_callee_is_matched() {
		let text = "const [v, setV] = React.useState<boolean>(true);\n";

		assert_eq!(check(text).len(), 1);
		assert_eq!(fix(text), "const [v, setV] = React.useState(true);\n");
	}

	#[test]
	fn fixes_are_idempotent() {
		for text in [
			"const [open] = useState<boolean>(false);\n",
			"const [count] = useState<number | undefined>(undefined);\n",
			"const [user] = useState<User | null>(null);\n",
		] {
			let rewritten = fix(text);

			assert!(check(&rewritten).is_empty(), "expected no findings in {rewritten:?}");
		}
	}
}
