use crate::style::{
	bindings::{self, Resolution},
	fixes::{Edit, Fix},
	shared::{self, AnalysisContext, Diagnostic, MessageData, Rule, RuleMeta, Severity},
	syntax::{ImportDecl, ImportSpecifier, NamedSpecifier, NodeEvent},
};

pub(crate) static WRAPPED_IMPORTS_META: RuleMeta = RuleMeta {
	id: "TSX-STYLE-IMPORT-001",
	severity: Severity::Error,
	fixable: true,
	messages: &[
		("wrapFactory", "Import `{symbol}` from the `{wrapper}` wrapper instead of `{module}`."),
		(
			"serverOnlyClient",
			"Do not construct `{symbol}` from `{module}` directly. Wire the shared server client from `{wrapper}` instead.",
		),
	],
};

pub(crate) static ICON_IMPORTS_META: RuleMeta = RuleMeta {
	id: "TSX-STYLE-ICON-001",
	severity: Severity::Error,
	fixable: true,
	messages: &[(
		"iconSuffix",
		"Import the `{expected}` export from `{module}` instead of `{actual}`.",
	)],
};

struct FactoryModule {
	module: &'static str,
	wrapper: &'static str,
	symbols: &'static [&'static str],
}

const FACTORY_MODULES: [FactoryModule; 1] = [FactoryModule {
	module: "next/font/google",
	wrapper: "@/lib/fonts",
	symbols: &["Inter", "Roboto", "Geist", "Geist_Mono"],
}];

struct ServerOnlyClient {
	module: &'static str,
	symbol: &'static str,
	wrapper: &'static str,
}

const SERVER_ONLY_CLIENTS: [ServerOnlyClient; 1] = [ServerOnlyClient {
	module: "convex/browser",
	symbol: "ConvexHttpClient",
	wrapper: "@/lib/convex-server",
}];

/// The wrapper implementations themselves may import the wrapped modules.
const WRAPPER_IMPL_DIRS: [&str; 2] = ["lib/fonts", "lib/convex"];

const ICON_MODULE: &str = "lucide-react";
const ICON_SUFFIX: &str = "Icon";

/// Enforces wrapped third-party imports: factory symbols get a source-string
/// rewrite to the in-repo wrapper, the server-only client is diagnostic-only.
#[derive(Default)]
pub(crate) struct WrappedImports;
impl Rule for WrappedImports {
	fn meta(&self) -> &'static RuleMeta {
		&WRAPPED_IMPORTS_META
	}

	fn collect(&mut self, event: &NodeEvent<'_>, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		let NodeEvent::Import(decl) = event else {
			return;
		};

		// Type-only imports carry no runtime dependency on the module.
		if decl.type_only || is_wrapper_implementation(ctx) {
			return;
		}

		if let Some(factory) =
			FACTORY_MODULES.iter().find(|factory| factory.module == decl.source.value)
		{
			self.check_factory_import(decl, factory, ctx, out);
		}

		for client in &SERVER_ONLY_CLIENTS {
			if client.module != decl.source.value {
				continue;
			}

			for specifier in &decl.specifiers {
				let ImportSpecifier::Named(named) = specifier else {
					continue;
				};

				if named.imported.name != client.symbol {
					continue;
				}

				let mut data = MessageData::new();

				data.insert("symbol", client.symbol.to_owned());
				data.insert("module", client.module.to_owned());
				data.insert("wrapper", client.wrapper.to_owned());

				// The right substitution needs call-site wiring; no autofix.
				shared::report(
					out,
					ctx,
					self.meta(),
					named.imported.span,
					"serverOnlyClient",
					data,
					None,
				);
			}
		}
	}
}
impl WrappedImports {
	fn check_factory_import(
		&self,
		decl: &ImportDecl,
		factory: &FactoryModule,
		ctx: &AnalysisContext,
		out: &mut Vec<Diagnostic>,
	) {
		let named = decl
			.specifiers
			.iter()
			.filter_map(|specifier| match specifier {
				ImportSpecifier::Named(named) => Some(named),
				_ => None,
			})
			.collect::<Vec<_>>();
		let flagged = named
			.iter()
			.filter(|named| factory.symbols.contains(&named.imported.name.as_str()))
			.copied()
			.collect::<Vec<_>>();

		if flagged.is_empty() {
			return;
		}

		// The fix rewrites only the source string, so it is offered only when
		// every specifier of the statement lives on the wrapper module too.
		let all_mapped =
			named.len() == decl.specifiers.len() && flagged.len() == named.len();
		let fix = if all_mapped {
			Fix::new(vec![Edit::replace(decl.source.span, format!("\"{}\"", factory.wrapper))])
		} else {
			None
		};

		for named in flagged {
			let mut data = MessageData::new();

			data.insert("symbol", named.imported.name.clone());
			data.insert("module", factory.module.to_owned());
			data.insert("wrapper", factory.wrapper.to_owned());

			shared::report(
				out,
				ctx,
				self.meta(),
				named.imported.span,
				"wrapFactory",
				data,
				fix.clone(),
			);
		}
	}
}

/// Requires icon-library imports to use the suffixed export names; unaliased
/// imports have every same-name reference renamed within the same fix.
#[derive(Default)]
pub(crate) struct IconImports;
impl Rule for IconImports {
	fn meta(&self) -> &'static RuleMeta {
		&ICON_IMPORTS_META
	}

	fn collect(&mut self, event: &NodeEvent<'_>, ctx: &AnalysisContext, out: &mut Vec<Diagnostic>) {
		let NodeEvent::Import(decl) = event else {
			return;
		};

		if decl.source.value != ICON_MODULE {
			return;
		}

		for specifier in &decl.specifiers {
			let ImportSpecifier::Named(named) = specifier else {
				continue;
			};

			if named.imported.name.ends_with(ICON_SUFFIX) {
				continue;
			}

			let expected = format!("{}{ICON_SUFFIX}", named.imported.name);
			let fix = build_icon_fix(ctx, named, &expected);
			let mut data = MessageData::new();

			data.insert("expected", expected);
			data.insert("actual", named.imported.name.clone());
			data.insert("module", ICON_MODULE.to_owned());

			shared::report(out, ctx, self.meta(), named.imported.span, "iconSuffix", data, fix);
		}
	}
}

fn build_icon_fix(
	ctx: &AnalysisContext,
	named: &NamedSpecifier,
	expected: &str,
) -> Option<Fix> {
	// An alias keeps the local name under caller control; rename the imported
	// name only.
	if named.local.is_some() {
		return Fix::new(vec![Edit::replace(named.imported.span, expected)]);
	}

	match bindings::resolve_references(ctx, &named.imported) {
		Resolution::References(references) => {
			let mut edits = vec![Edit::replace(named.span, expected)];

			for reference in references {
				edits.push(Edit::replace(reference, expected));
			}

			Fix::new(edits)
		},
		// A shadowed name cannot be renamed safely; alias it instead.
		Resolution::Shadowed => Fix::new(vec![Edit::replace(
			named.span,
			format!("{expected} as {}", named.imported.name),
		)]),
	}
}

fn is_wrapper_implementation(ctx: &AnalysisContext) -> bool {
	let path = ctx.path.to_string_lossy().replace('\\', "/");

	WRAPPER_IMPL_DIRS.iter().any(|dir| path.contains(&format!("{dir}/")))
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;
	use crate::style::{fixes::EditSet, shared::analysis_context_from_text, syntax};

	fn check_wrapped(path: &str, text: &str) -> Vec<Diagnostic> {
		run_rule(&mut WrappedImports, path, text)
	}

	fn check_icons(text: &str) -> Vec<Diagnostic> {
		run_rule(&mut IconImports, "app/view.tsx", text)
	}

	fn run_rule(rule: &mut dyn Rule, path: &str, text: &str) -> Vec<Diagnostic> {
		let ctx = analysis_context_from_text(Path::new(path), text.to_owned()).expect("context");
		let mut out = Vec::new();

		syntax::walk(&ctx.program, &mut |event| rule.collect(&event, &ctx, &mut out));
		rule.finalize(&ctx, &mut out);

		out
	}

	fn apply_fixes(text: &str, diagnostics: &[Diagnostic]) -> String {
		let mut set = EditSet::default();

		for diagnostic in diagnostics {
			if let Some(fix) = &diagnostic.fix {
				set.add_fix(fix);
			}
		}

		set.apply(text).expect("apply")
	}

	#[test]
	fn factory_import_rewrites_source_string_only() {
		let text = "import { Inter } from \"next/font/google\";\n";
		let diagnostics = check_wrapped("app/layout.tsx", text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "wrapFactory");
		assert!(diagnostics[0].fix.is_some());

		let rewritten = apply_fixes(text, &diagnostics);

		assert_eq!(rewritten, "import { Inter } from \"@/lib/fonts\";\n");
	}

	#[test]
	fn factory_fix_is_idempotent() {
		let text = "import { Inter, Roboto } from \"next/font/google\";\n";
		let diagnostics = check_wrapped("app/layout.tsx", text);

		assert_eq!(diagnostics.len(), 2);

		let rewritten = apply_fixes(text, &diagnostics);

		assert_eq!(rewritten, "import { Inter, Roboto } from \"@/lib/fonts\";\n");
		assert!(check_wrapped("app/layout.tsx", &rewritten).is_empty());
	}

	#[test]
	fn unmapped_sibling_specifier_suppresses_the_fix() {
		let text = "import { Inter, preloadFont } from \"next/font/google\";\n";
		let diagnostics = check_wrapped("app/layout.tsx", text);

		assert_eq!(diagnostics.len(), 1);
		assert!(diagnostics[0].fix.is_none());
	}

	#[test]
	fn server_only_client_reports_without_fix() {
		let text = "import { ConvexHttpClient } from \"convex/browser\";\n";
		let diagnostics = check_wrapped("app/actions.ts", text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "serverOnlyClient");
		assert!(diagnostics[0].fix.is_none());
		assert!(diagnostics[0].message().contains("@/lib/convex-server"));
	}

	#[test]
	fn wrapper_implementation_paths_are_exempt() {
		let text = "import { Inter } from \"next/font/google\";\n";

		assert!(check_wrapped("lib/fonts/index.ts", text).is_empty());
		assert!(check_wrapped("src/lib/convex/client.ts", "import { ConvexHttpClient } from \"convex/browser\";\n").is_empty());
	}

	#[test]
	fn icon_import_renames_specifier_and_references() {
		let text = "import { Home } from \"lucide-react\";\n\nconst view = <Home size={16} />;\nconst other = wrap(Home);\n";
		let diagnostics = check_icons(text);

		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].message_id, "iconSuffix");

		let rewritten = apply_fixes(text, &diagnostics);

		assert_eq!(
			rewritten,
			"import { HomeIcon } from \"lucide-react\";\n\nconst view = <HomeIcon size={16} />;\nconst other = wrap(HomeIcon);\n"
		);
		assert!(check_icons(&rewritten).is_empty());
	}

	#[test]
	fn aliased_icon_import_renames_only_the_imported_name() {
		let text = "import { Home as HouseGlyph } from \"lucide-react\";\n\nconst view = <HouseGlyph />;\n";
		let diagnostics = check_icons(text);

		assert_eq!(diagnostics.len(), 1);

		let rewritten = apply_fixes(text, &diagnostics);

		assert_eq!(
			rewritten,
			"import { HomeIcon as HouseGlyph } from \"lucide-react\";\n\nconst view = <HouseGlyph />;\n"
		);
		assert!(check_icons(&rewritten).is_empty());
	}

	#[test]
	fn shadowed_icon_binding_falls_back_to_alias() {
		let text = "import { Home } from \"lucide-react\";\n\nconst pick = (Home: unknown) => Home;\n";
		let diagnostics = check_icons(text);

		assert_eq!(diagnostics.len(), 1);

		let rewritten = apply_fixes(text, &diagnostics);

		assert!(rewritten.contains("import { HomeIcon as Home } from \"lucide-react\";"));
		assert!(rewritten.contains("(Home: unknown) => Home"));
		assert!(check_icons(&rewritten).is_empty());
	}

	#[test]
	fn suffixed_icon_imports_are_clean() {
		assert!(check_icons("import { HomeIcon, UserIcon } from \"lucide-react\";\n").is_empty());
	}

	#[test]
	fn other_modules_are_ignored() {
		assert!(check_icons("import { Home } from \"./icons\";\n").is_empty());
		assert!(check_wrapped("app/a.ts", "import { Inter } from \"@/lib/fonts\";\n").is_empty());
	}
}
