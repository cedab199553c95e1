use regex::Regex;

use crate::style::{
	shared::AnalysisContext,
	syntax::{ArrowBody, Block, Expr, Ident, ImportSpecifier, ParamList, Span, Stmt},
};

/// Outcome of resolving a declaration's references within one file.
///
/// Resolution is conservative: when any other declaration in the file binds
/// the same name, the result reports the shadow instead of guessing which
/// occurrences belong to which binding, and the caller picks a rewrite that
/// does not touch references.
#[derive(Debug)]
pub(crate) enum Resolution {
	References(Vec<Span>),
	Shadowed,
}

/// Ordered identifier references bound to `declaration`, excluding the
/// declaration site itself. Structured expressions are walked directly;
/// opaque JSX/raw spans are scanned for word-boundary occurrences with
/// string literals masked out.
pub(crate) fn resolve_references(ctx: &AnalysisContext, declaration: &Ident) -> Resolution {
	let mut collector = Collector {
		name: declaration.name.as_str(),
		declaration_span: declaration.span,
		source: &ctx.text,
		references: Vec::new(),
		shadowed: false,
	};

	for stmt in &ctx.program.statements {
		collector.stmt(stmt);
	}

	if collector.shadowed {
		return Resolution::Shadowed;
	}

	let mut references = collector.references;

	references.sort_by_key(|span| span.start);
	references.dedup();

	Resolution::References(references)
}

struct Collector<'a> {
	name: &'a str,
	declaration_span: Span,
	source: &'a str,
	references: Vec<Span>,
	shadowed: bool,
}
impl Collector<'_> {
	fn stmt(&mut self, stmt: &Stmt) {
		match stmt {
			Stmt::Import(decl) =>
				for specifier in &decl.specifiers {
					let binding = match specifier {
						ImportSpecifier::Named(named) =>
							named.local.as_ref().unwrap_or(&named.imported),
						ImportSpecifier::Default(ident) | ImportSpecifier::Namespace(ident) =>
							ident,
					};

					if binding.name == self.name && binding.span != self.declaration_span {
						self.shadowed = true;
					}
				},
			Stmt::Var(decl) => {
				if let Some(name) = &decl.name
					&& name.name == self.name
					&& name.span != self.declaration_span
				{
					self.shadowed = true;
				}
				if let Some(init) = &decl.init {
					self.expr(init);
				}
			},
			Stmt::Fn(decl) => {
				if let Some(name) = &decl.name
					&& name.name == self.name
					&& name.span != self.declaration_span
				{
					self.shadowed = true;
				}

				self.params(&decl.params);
				self.block(&decl.body);
			},
			Stmt::ExportDefaultExpr(decl) => self.expr(&decl.expr),
			Stmt::Return(ret) =>
				if let Some(argument) = &ret.argument {
					self.expr(argument);
				},
			Stmt::Expr(stmt) => self.expr(&stmt.expr),
			Stmt::Raw(span) => self.scan_span(*span),
		}
	}

	fn block(&mut self, block: &Block) {
		for stmt in &block.statements {
			self.stmt(stmt);
		}
	}

	fn params(&mut self, params: &ParamList) {
		for param in &params.params {
			if let Some(name) = &param.name
				&& name.name == self.name
			{
				self.shadowed = true;
			}
		}
	}

	fn expr(&mut self, expr: &Expr) {
		match expr {
			Expr::Ident(ident) =>
				if ident.name == self.name && ident.span != self.declaration_span {
					self.references.push(ident.span);
				},
			Expr::Call(call) => {
				self.expr(&call.callee);

				for arg in &call.args {
					self.expr(arg);
				}
			},
			// A member property is not a reference to the binding.
			Expr::Member(member) => self.expr(&member.object),
			Expr::Object(object) =>
				for prop in &object.properties {
					if let Some(value) = &prop.value {
						self.expr(value);
					}
				},
			Expr::Array(array) =>
				for element in &array.elements {
					self.expr(element);
				},
			Expr::Arrow(arrow) => {
				self.params(&arrow.params);

				match &arrow.body {
					ArrowBody::Block(block) => self.block(block),
					ArrowBody::Expr(expr) => self.expr(expr),
				}
			},
			Expr::FnExpr(func) => {
				self.params(&func.params);
				self.block(&func.body);
			},
			Expr::Await(awaited) => self.expr(&awaited.expr),
			Expr::Paren(paren) => self.expr(&paren.expr),
			Expr::Template(template) =>
				for expr in &template.exprs {
					self.expr(expr);
				},
			Expr::Jsx(span) | Expr::Raw(span) => self.scan_span(*span),
			Expr::Str(_) | Expr::Num(_) | Expr::Bool(_) | Expr::Null(_) => {},
		}
	}

	fn scan_span(&mut self, span: Span) {
		let snippet = span.text(self.source);

		if snippet.is_empty() || !snippet.contains(self.name) {
			return;
		}

		let masked = mask_string_literals(snippet);
		let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(self.name)))
			.expect("Expected operation to succeed.");

		for found in pattern.find_iter(&masked) {
			// `.name` is a property access, not a reference.
			if found.start() > 0 && masked.as_bytes()[found.start() - 1] == b'.' {
				continue;
			}

			self.references.push(Span::new(span.start + found.start(), span.start + found.end()));
		}
	}
}

/// Blanks out quoted and template-literal content, preserving byte offsets.
fn mask_string_literals(text: &str) -> String {
	let bytes = text.as_bytes();
	let mut out = bytes.to_vec();
	let mut idx = 0_usize;
	let mut quote: Option<u8> = None;

	while idx < bytes.len() {
		let ch = bytes[idx];

		match quote {
			Some(open) => {
				if ch == b'\\' {
					if idx + 1 < out.len() {
						out[idx + 1] = b' ';
					}

					out[idx] = b' ';
					idx += 2;

					continue;
				}
				if ch == open {
					quote = None;
				} else {
					out[idx] = b' ';
				}

				idx += 1;
			},
			None => {
				if matches!(ch, b'"' | b'\'' | b'`') {
					quote = Some(ch);
				}

				idx += 1;
			},
		}
	}

	String::from_utf8(out).unwrap_or_else(|_| " ".repeat(bytes.len()))
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;
	use crate::style::shared::analysis_context_from_text;
	use crate::style::syntax::{NamedSpecifier, Stmt};

	fn import_binding(ctx: &AnalysisContext) -> Ident {
		let Some(Stmt::Import(decl)) = ctx.program.statements.first() else {
			panic!("expected import");
		};
		let ImportSpecifier::Named(NamedSpecifier { imported, local, .. }) = &decl.specifiers[0]
		else {
			panic!("expected named specifier");
		};

		local.as_ref().unwrap_or(imported).clone()
	}

	#[test]
	fn finds_references_in_document_order_excluding_declaration() {
		let text = "import { Home } from \"lucide-react\";\n\nconst header = <Home size={16} />;\nconst body = render(Home);\n";
		let ctx = analysis_context_from_text(Path::new("app/view.tsx"), text.to_owned())
			.expect("context");
		let declaration = import_binding(&ctx);
		let Resolution::References(references) = resolve_references(&ctx, &declaration) else {
			panic!("expected references");
		};

		assert_eq!(references.len(), 2);
		assert!(references[0].start < references[1].start);

		for reference in &references {
			assert_eq!(reference.text(text), "Home");
			assert_ne!(*reference, declaration.span);
		}
	}

	#[test]
	fn string_contents_are_not_references() {
		let text = "import { Home } from \"lucide-react\";\n\nconst label = \"Home\";\nconst view = <Home aria-label=\"Home icon\" />;\n";
		let ctx = analysis_context_from_text(Path::new("app/view.tsx"), text.to_owned())
			.expect("context");
		let declaration = import_binding(&ctx);
		let Resolution::References(references) = resolve_references(&ctx, &declaration) else {
			panic!("expected references");
		};

		assert_eq!(references.len(), 1);
		assert_eq!(references[0].text(text), "Home");
	}

	#[test]
	fn member_property_is_not_a_reference() {
		let text = "import { Home } from \"lucide-react\";\n\nconst icon = icons.Home;\nuse(Home);\n";
		let ctx = analysis_context_from_text(Path::new("app/view.tsx"), text.to_owned())
			.expect("context");
		let declaration = import_binding(&ctx);
		let Resolution::References(references) = resolve_references(&ctx, &declaration) else {
			panic!("expected references");
		};

		assert_eq!(references.len(), 1);
	}

	#[test]
	fn shadowing_declaration_is_reported() {
		let text = "import { Home } from \"lucide-react\";\n\nconst render = () => {\n\tconst Home = localOverride();\n\treturn Home;\n};\n";
		let ctx = analysis_context_from_text(Path::new("app/view.tsx"), text.to_owned())
			.expect("context");
		let declaration = import_binding(&ctx);

		assert!(matches!(resolve_references(&ctx, &declaration), Resolution::Shadowed));
	}

	#[test]
	fn shadowing_parameter_is_reported() {
		let text = "import { Home } from \"lucide-react\";\n\nconst pick = (Home: IconType) => Home;\n";
		let ctx = analysis_context_from_text(Path::new("app/view.tsx"), text.to_owned())
			.expect("context");
		let declaration = import_binding(&ctx);

		assert!(matches!(resolve_references(&ctx, &declaration), Resolution::Shadowed));
	}
}
