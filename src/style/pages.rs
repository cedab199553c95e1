use crate::style::{
	fixes::{Edit, Fix},
	names,
	shared::{self, AnalysisContext, Diagnostic, MessageData, Rule, RuleMeta, Severity},
	syntax::{
		Expr, ImportSpecifier, NodeEvent, ParamList, Span, VarDecl, VarKind, unwrap_expr,
	},
};

pub(crate) static PAGE_COMPONENTS_META: RuleMeta = RuleMeta {
	id: "TSX-STYLE-PAGE-001",
	severity: Severity::Error,
	fixable: true,
	messages: &[
		(
			"defaultFunctionDeclaration",
			"Declare the page component as a typed constant with a separate `export default`.",
		),
		(
			"inlineExport",
			"Do not export the page component inline. Default-export it at the end of the file.",
		),
		("placeholderName", "Give the page component a descriptive name like `{name}`."),
		("missingPageType", "Annotate the page component with `{type}`."),
		("notArrowFunction", "Declare the page component as an arrow function."),
		("mutableBinding", "Declare the page component with `const`."),
	],
};

pub(crate) const PAGE_TYPE: &str = "NextPage";
pub(crate) const PAGE_TYPE_MODULE: &str = "next";
const PAGE_TYPE_IMPORT: &str = "import type { NextPage } from \"next\";";

pub(crate) fn is_page_typed(ty: Option<&str>) -> bool {
	ty.is_some_and(|ty| ty == PAGE_TYPE || ty.starts_with("NextPage<"))
}

#[derive(Debug)]
struct FnInfo {
	span: Span,
	is_async: bool,
	name: Option<String>,
	params_span: Span,
	body_span: Span,
	first_param_type: Option<String>,
}

#[derive(Debug)]
struct DefaultExportInfo {
	referenced: Option<(Span, String)>,
}

#[derive(Debug)]
enum InitInfo {
	Arrow,
	FnExpr { is_async: bool, params_span: Span, body_span: Span },
	Other,
	None,
}

#[derive(Debug)]
struct ConstInfo {
	export_span: Option<Span>,
	kind: VarKind,
	kind_span: Span,
	name: String,
	name_span: Span,
	ann: Option<(Span, String)>,
	init: InitInfo,
	init_span: Option<Span>,
	first_param_type: Option<String>,
}
impl ConstInfo {
	fn is_function_valued(&self) -> bool {
		matches!(self.init, InitInfo::Arrow | InitInfo::FnExpr { .. })
	}
}

/// Canonical page-component pattern over page entry files.
///
/// `collect` records the page-type import, default-export forms and top-level
/// declarations; every diagnostic is emitted from `finalize` because "does a
/// default export exist" and "is the type import present" are whole-file
/// facts.
#[derive(Default)]
pub(crate) struct PageComponents {
	has_page_type_import: bool,
	default_exports: Vec<DefaultExportInfo>,
	default_fns: Vec<FnInfo>,
	consts: Vec<ConstInfo>,
}
impl Rule for PageComponents {
	fn meta(&self) -> &'static RuleMeta {
		&PAGE_COMPONENTS_META
	}

	fn collect(&mut self, event: &NodeEvent<'_>, ctx: &AnalysisContext, _out: &mut Vec<Diagnostic>) {
		if !ctx.is_page_file {
			return;
		}

		match event {
			NodeEvent::Import(decl) =>
				if decl.source.value == PAGE_TYPE_MODULE
					&& decl.specifiers.iter().any(|specifier| {
						matches!(
							specifier,
							ImportSpecifier::Named(named) if named.imported.name == PAGE_TYPE
						)
					}) {
					self.has_page_type_import = true;
				},
			NodeEvent::Fn(decl) if decl.export_default => self.default_fns.push(FnInfo {
				span: decl.span,
				is_async: decl.is_async,
				name: decl.name.as_ref().map(|ident| ident.name.clone()),
				params_span: decl.params.span,
				body_span: decl.body.span,
				first_param_type: first_param_type(&decl.params, ctx),
			}),
			NodeEvent::ExportDefault(decl) => {
				let referenced = match unwrap_expr(&decl.expr) {
					Expr::Ident(ident) => Some((ident.span, ident.name.clone())),
					_ => None,
				};

				self.default_exports.push(DefaultExportInfo { referenced });
			},
			NodeEvent::Var { decl, top_level: true } => self.record_const(decl, ctx),
			_ => {},
		}
	}

	fn finalize(&mut self, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		if !ctx.is_page_file {
			return;
		}

		let has_default_export = !self.default_exports.is_empty() || !self.default_fns.is_empty();

		for info in &self.default_fns {
			self.report_default_fn(info, ctx, out);
		}
		for info in &self.consts {
			if !info.name.ends_with(names::PAGE_SUFFIX) {
				continue;
			}

			if info.kind != VarKind::Const {
				self.report_mutable_binding(info, ctx, out);

				continue;
			}
			if info.export_span.is_some() {
				if info.is_function_valued() {
					self.report_inline_export(info, has_default_export, ctx, out);
				}

				continue;
			}
			if info.name == names::PAGE_SUFFIX {
				if info.is_function_valued() || is_page_typed(type_text(info)) {
					self.report_placeholder_name(info, ctx, out);
				}

				continue;
			}
			if info.is_function_valued() && !is_page_typed(type_text(info)) {
				self.report_missing_type(info, ctx, out);
			}
			if matches!(info.init, InitInfo::FnExpr { .. } | InitInfo::Other) {
				self.report_not_arrow(info, ctx, out);
			}
		}
	}
}
impl PageComponents {
	fn record_const(&mut self, decl: &VarDecl, ctx: &AnalysisContext) {
		let Some(name) = &decl.name else {
			return;
		};
		let (init, init_span, first_param_type) = match decl.init.as_ref().map(unwrap_expr) {
			None => (InitInfo::None, None, None),
			Some(expr @ Expr::Arrow(arrow)) =>
				(InitInfo::Arrow, Some(expr.span()), first_param_type(&arrow.params, ctx)),
			Some(expr @ Expr::FnExpr(func)) => (
				InitInfo::FnExpr {
					is_async: func.is_async,
					params_span: func.params.span,
					body_span: func.body.span,
				},
				Some(expr.span()),
				first_param_type(&func.params, ctx),
			),
			Some(expr) => (InitInfo::Other, Some(expr.span()), None),
		};

		self.consts.push(ConstInfo {
			export_span: decl.export_span,
			kind: decl.kind,
			kind_span: decl.kind_span,
			name: name.name.clone(),
			name_span: name.span,
			ann: decl
				.type_ann
				.as_ref()
				.map(|ann| (ann.span, ann.ty.span.text(&ctx.text).trim().to_owned())),
			init,
			init_span,
			first_param_type,
		});
	}

	fn report_default_fn(&self, info: &FnInfo, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		let name = match &info.name {
			Some(existing) if existing.ends_with(names::PAGE_SUFFIX) => existing.clone(),
			_ => names::synthesize_page_name(&ctx.path),
		};
		let generic = generic_from_param(info.first_param_type.as_deref());
		let async_prefix = if info.is_async { "async " } else { "" };
		let params = ctx.snippet(info.params_span);
		let body = ctx.snippet(info.body_span);
		let fix = if params.is_empty() || body.is_empty() {
			// Locating the tokens failed; keep the diagnostic, drop the fix.
			None
		} else {
			let mut edits = Vec::new();

			if !self.has_page_type_import {
				edits.push(page_type_import_edit(ctx));
			}

			edits.push(Edit::replace(
				info.span,
				format!(
					"const {name}: {PAGE_TYPE}{generic} = {async_prefix}{params} => {body};\nexport default {name};"
				),
			));

			Fix::new(edits)
		};
		let mut data = MessageData::new();

		data.insert("name", name);
		shared::report(out, ctx, self.meta(), info.span, "defaultFunctionDeclaration", data, fix);
	}

	fn report_inline_export(
		&self,
		info: &ConstInfo,
		has_default_export: bool,
		ctx: &AnalysisContext,
		out: &mut Vec<Diagnostic>,
	) {
		let export_span = info.export_span.unwrap_or(info.kind_span);
		let mut edits = vec![Edit::delete(Span::new(export_span.start, info.kind_span.start))];

		if !has_default_export
			&& let Some(end) = ctx.program.last_statement_end()
		{
			edits.push(Edit::insert(end, format!("\n\nexport default {};", info.name)));
		}

		let mut data = MessageData::new();

		data.insert("name", info.name.clone());
		shared::report(out, ctx, self.meta(), export_span, "inlineExport", data, Fix::new(edits));
	}

	fn report_placeholder_name(
		&self,
		info: &ConstInfo,
		ctx: &AnalysisContext,
		out: &mut Vec<Diagnostic>,
	) {
		let synthesized = names::synthesize_page_name(&ctx.path);
		let fix = if synthesized == info.name {
			None
		} else {
			let mut edits = vec![Edit::replace(info.name_span, synthesized.clone())];

			for export in &self.default_exports {
				if let Some((span, referenced)) = &export.referenced
					&& referenced == &info.name
				{
					edits.push(Edit::replace(*span, synthesized.clone()));
				}
			}

			Fix::new(edits)
		};
		let mut data = MessageData::new();

		data.insert("name", synthesized);
		shared::report(out, ctx, self.meta(), info.name_span, "placeholderName", data, fix);
	}

	fn report_missing_type(
		&self,
		info: &ConstInfo,
		ctx: &AnalysisContext,
		out: &mut Vec<Diagnostic>,
	) {
		let generic = generic_from_param(info.first_param_type.as_deref());
		let annotation = format!(": {PAGE_TYPE}{generic}");
		let mut edits = Vec::new();

		if !self.has_page_type_import {
			edits.push(page_type_import_edit(ctx));
		}

		match &info.ann {
			Some((span, _)) => edits.push(Edit::replace(*span, annotation)),
			None => edits.push(Edit::insert(info.name_span.end, annotation)),
		}

		let mut data = MessageData::new();

		data.insert("type", PAGE_TYPE.to_owned());
		shared::report(out, ctx, self.meta(), info.name_span, "missingPageType", data, Fix::new(edits));
	}

	fn report_not_arrow(&self, info: &ConstInfo, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		let fix = match (&info.init, info.init_span) {
			(InitInfo::FnExpr { is_async, params_span, body_span }, Some(init_span)) => {
				let params = ctx.snippet(*params_span);
				let body = ctx.snippet(*body_span);
				let async_prefix = if *is_async { "async " } else { "" };

				if params.is_empty() || body.is_empty() {
					None
				} else {
					Fix::new(vec![Edit::replace(
						init_span,
						format!("{async_prefix}{params} => {body}"),
					)])
				}
			},
			_ => None,
		};
		let mut data = MessageData::new();

		data.insert("name", info.name.clone());
		shared::report(out, ctx, self.meta(), info.name_span, "notArrowFunction", data, fix);
	}

	fn report_mutable_binding(
		&self,
		info: &ConstInfo,
		ctx: &AnalysisContext,
		out: &mut Vec<Diagnostic>,
	) {
		let fix = Fix::new(vec![Edit::replace(info.kind_span, VarKind::Const.keyword())]);
		let mut data = MessageData::new();

		data.insert("name", info.name.clone());
		shared::report(out, ctx, self.meta(), info.kind_span, "mutableBinding", data, fix);
	}
}

fn type_text(info: &ConstInfo) -> Option<&str> {
	info.ann.as_ref().map(|(_, ty)| ty.as_str())
}

fn generic_from_param(first_param_type: Option<&str>) -> String {
	first_param_type.map(|ty| format!("<{ty}>")).unwrap_or_default()
}

fn first_param_type(params: &ParamList, ctx: &AnalysisContext) -> Option<String> {
	let ann = params.params.first()?.type_ann.as_ref()?;
	let text = ann.ty.span.text(&ctx.text).trim();

	if text.is_empty() { None } else { Some(text.to_owned()) }
}

fn page_type_import_edit(ctx: &AnalysisContext) -> Edit {
	match ctx.program.last_import_end() {
		Some(end) => Edit::insert(end, format!("\n{PAGE_TYPE_IMPORT}")),
		None => Edit::insert(0, format!("{PAGE_TYPE_IMPORT}\n\n")),
	}
}
