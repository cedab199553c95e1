use crate::style::{
	names, pages,
	shared::{self, AnalysisContext, Diagnostic, MessageData, Rule, RuleMeta, Severity},
	syntax::{ArrowBody, Block, Expr, NodeEvent, Span, Stmt, VarDecl, VarKind, unwrap_expr},
};

pub(crate) static REDIRECT_PAGES_META: RuleMeta = RuleMeta {
	id: "TSX-STYLE-PAGE-002",
	severity: Severity::Warning,
	fixable: false,
	messages: &[
		(
			"redirectOnlyPage",
			"This page only redirects to `{destination}`. Serve `{route}` as a static redirect from the routing config instead.",
		),
		(
			"redirectConfigExample",
			"Example redirect entry: { source: \"{route}\", destination: \"{destination}\", permanent: false }.",
		),
	],
};

const REDIRECT_CALLEE: &str = "redirect";

#[derive(Debug, Default, Eq, PartialEq)]
enum Destination {
	#[default]
	NotSeen,
	Extracted(String),
	Unextractable,
}

/// Suggests replacing pages whose components only redirect with a static
/// config redirect. Phase one accumulates redirect calls, destinations and
/// page-component body shapes; phase two combines them with the file's derived
/// route. Deliberately never fixable: the only-redirect body classification
/// tolerates an early return, which over-approximates static behavior.
#[derive(Default)]
pub(crate) struct RedirectPages {
	saw_redirect: bool,
	destination: Destination,
	component_anchor: Option<Span>,
	all_bodies_redirect_only: bool,
	component_count: usize,
}
impl Rule for RedirectPages {
	fn meta(&self) -> &'static RuleMeta {
		&REDIRECT_PAGES_META
	}

	fn collect(&mut self, event: &NodeEvent<'_>, ctx: &AnalysisContext, _out: &mut Vec<Diagnostic>) {
		if !ctx.is_page_file {
			return;
		}

		match event {
			NodeEvent::Call(call) => {
				if !matches!(&call.callee, Expr::Ident(ident) if ident.name == REDIRECT_CALLEE) {
					return;
				}

				self.saw_redirect = true;

				let extracted = call.args.first().and_then(extract_destination);

				self.destination = match (std::mem::take(&mut self.destination), extracted) {
					(Destination::NotSeen, Some(destination)) =>
						Destination::Extracted(destination),
					(Destination::Extracted(existing), Some(destination))
						if existing == destination =>
						Destination::Extracted(existing),
					// No argument, complex interpolation, or disagreeing
					// destinations suppress the finding.
					_ => Destination::Unextractable,
				};
			},
			NodeEvent::Var { decl, top_level: true } => {
				let Some(body) = page_component_body(decl, ctx) else {
					return;
				};

				if self.component_count == 0 {
					self.all_bodies_redirect_only = true;
				}

				self.component_count += 1;
				self.component_anchor.get_or_insert(decl.span);
				self.all_bodies_redirect_only &= body;
			},
			_ => {},
		}
	}

	fn finalize(&mut self, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		if !ctx.is_page_file
			|| !self.saw_redirect
			|| self.component_count == 0
			|| !self.all_bodies_redirect_only
		{
			return;
		}

		let Destination::Extracted(destination) = &self.destination else {
			return;
		};
		let Some(route) = names::route_from_path(&ctx.path) else {
			return;
		};
		let Some(anchor) = self.component_anchor else {
			return;
		};
		let mut data = MessageData::new();

		data.insert("route", route.clone());
		data.insert("destination", destination.clone());
		shared::report(out, ctx, self.meta(), anchor, "redirectOnlyPage", data.clone(), None);
		shared::report(out, ctx, self.meta(), anchor, "redirectConfigExample", data, None);
	}
}

/// Classifies a typed-and-suffixed page component's body; `None` when the
/// declaration is not a page component at all.
fn page_component_body(decl: &VarDecl, ctx: &AnalysisContext) -> Option<bool> {
	if decl.kind != VarKind::Const {
		return None;
	}

	let name = decl.name.as_ref()?;

	if !name.name.ends_with(names::PAGE_SUFFIX) {
		return None;
	}

	let ann = decl.type_ann.as_ref()?;

	if !pages::is_page_typed(Some(ann.ty.span.text(&ctx.text).trim())) {
		return None;
	}

	match decl.init.as_ref().map(unwrap_expr)? {
		Expr::Arrow(arrow) => match &arrow.body {
			ArrowBody::Block(block) => Some(is_redirect_only_block(block)),
			ArrowBody::Expr(expr) => Some(is_redirect_call(expr)),
		},
		Expr::FnExpr(func) => Some(is_redirect_only_block(&func.body)),
		_ => Some(false),
	}
}

/// An only-redirect body: at most two top-level statements, every statement a
/// declaration, a return, or a redirect call, with the redirect in the last
/// one.
fn is_redirect_only_block(block: &Block) -> bool {
	if block.statements.is_empty() || block.statements.len() > 2 {
		return false;
	}

	for stmt in &block.statements {
		match stmt {
			Stmt::Var(_) | Stmt::Return(_) => {},
			Stmt::Expr(stmt) if is_redirect_call(&stmt.expr) => {},
			_ => return false,
		}
	}

	match block.statements.last() {
		Some(Stmt::Return(ret)) =>
			ret.argument.as_ref().is_some_and(|argument| is_redirect_call(argument)),
		Some(Stmt::Expr(stmt)) => is_redirect_call(&stmt.expr),
		_ => false,
	}
}

fn is_redirect_call(expr: &Expr) -> bool {
	match unwrap_expr(expr) {
		Expr::Call(call) =>
			matches!(&call.callee, Expr::Ident(ident) if ident.name == REDIRECT_CALLEE),
		Expr::Await(awaited) => is_redirect_call(&awaited.expr),
		_ => false,
	}
}

/// Extracts the redirect destination: a string literal verbatim, a template
/// without interpolation verbatim, or a template whose interpolations are all
/// bare identifiers (named path parameters) or member reads off an awaited
/// call (`:id`-style parameters). Anything else is unextractable.
fn extract_destination(arg: &Expr) -> Option<String> {
	match unwrap_expr(arg) {
		Expr::Str(lit) => Some(lit.value.clone()),
		Expr::Template(template) => {
			if template.exprs.is_empty() {
				return template.quasis.first().cloned();
			}

			let mut destination = template.quasis.first().cloned().unwrap_or_default();

			for (idx, expr) in template.exprs.iter().enumerate() {
				let parameter = interpolation_parameter(expr)?;

				destination.push(':');
				destination.push_str(parameter);
				destination.push_str(template.quasis.get(idx + 1).map_or("", String::as_str));
			}

			Some(destination)
		},
		_ => None,
	}
}

fn interpolation_parameter(expr: &Expr) -> Option<&str> {
	match unwrap_expr(expr) {
		Expr::Ident(ident) => Some(ident.name.as_str()),
		Expr::Member(member) => {
			// `(await loadParams()).id` — a member read off an awaited call.
			let object = unwrap_expr(&member.object);
			let Expr::Await(awaited) = object else {
				return None;
			};

			match unwrap_expr(&awaited.expr) {
				Expr::Call(_) | Expr::Ident(_) => Some(member.property.name.as_str()),
				_ => None,
			}
		},
		_ => None,
	}
}
