mod bindings;
mod fixes;
mod hooks;
mod imports;
mod names;
mod pages;
mod payloads;
mod redirects;
mod shared;
mod syntax;

pub(crate) use shared::RunSummary;

use std::{
	fs,
	path::{Path, PathBuf},
	process::Command,
};

use rayon::prelude::*;

use crate::prelude::*;
use fixes::EditSet;
use shared::{AnalysisContext, Diagnostic, Rule, RuleMeta, Severity};

const FILE_BATCH_SIZE: usize = 64;
const MAX_FIX_PASSES: usize = 8;

static RULE_METAS: [&RuleMeta; 6] = [
	&imports::WRAPPED_IMPORTS_META,
	&payloads::INSERT_PAYLOADS_META,
	&imports::ICON_IMPORTS_META,
	&hooks::STATE_HOOKS_META,
	&pages::PAGE_COMPONENTS_META,
	&redirects::REDIRECT_PAGES_META,
];

#[derive(Debug)]
struct FileFixOutcome {
	path: PathBuf,
	rewritten_text: Option<String>,
	applied_count: usize,
}

pub(crate) fn run_check(requested_files: &[PathBuf]) -> Result<RunSummary> {
	let files = resolve_files(requested_files)?;
	let mut diagnostics: Vec<Diagnostic> = Vec::new();

	for batch in files.chunks(FILE_BATCH_SIZE) {
		let batch_results = batch
			.par_iter()
			.map(|file| match shared::read_analysis_context(file) {
				Some(ctx) => collect_diagnostics(&ctx),
				None => Vec::new(),
			})
			.collect::<Vec<_>>();

		for result in batch_results {
			diagnostics.extend(result);
		}
	}

	diagnostics.sort_by(|a, b| {
		a.file.cmp(&b.file).then(a.line.cmp(&b.line)).then(a.meta.id.cmp(b.meta.id))
	});

	let error_count =
		diagnostics.iter().filter(|diagnostic| diagnostic.meta.severity == Severity::Error).count();
	let unfixable_count = diagnostics.iter().filter(|diagnostic| diagnostic.fix.is_none()).count();
	let output_lines = diagnostics.into_iter().map(|diagnostic| diagnostic.format()).collect::<Vec<_>>();
	let violation_count = output_lines.len();

	Ok(RunSummary {
		file_count: files.len(),
		violation_count,
		error_count,
		unfixable_count,
		applied_fix_count: 0,
		output_lines,
	})
}

pub(crate) fn run_fix(requested_files: &[PathBuf]) -> Result<RunSummary> {
	let files = resolve_files(requested_files)?;
	let mut total_applied = 0_usize;

	for batch in files.chunks(FILE_BATCH_SIZE) {
		let outcomes = batch
			.par_iter()
			.map(|file| {
				let Ok(original) = fs::read_to_string(file) else {
					return FileFixOutcome {
						path: file.clone(),
						rewritten_text: None,
						applied_count: 0,
					};
				};
				let (text, applied_count) = fix_text(file, &original);

				FileFixOutcome {
					path: file.clone(),
					rewritten_text: (applied_count > 0 && text != original).then_some(text),
					applied_count,
				}
			})
			.collect::<Vec<_>>();

		for outcome in outcomes {
			total_applied += outcome.applied_count;

			if let Some(text) = outcome.rewritten_text {
				fs::write(&outcome.path, text)?;
			}
		}
	}

	let checked = run_check(requested_files)?;

	Ok(RunSummary { applied_fix_count: total_applied, ..checked })
}

pub(crate) fn print_rules() {
	for meta in RULE_METAS {
		println!(
			"{}\t{}\t{}",
			meta.id,
			meta.severity.label(),
			if meta.fixable { "fixable" } else { "manual" }
		);

		for (message_id, template) in meta.messages {
			println!("\t{message_id}\t{template}");
		}
	}
}

/// Fresh rule instances for one file traversal; per-file state never outlives
/// it.
fn all_rules() -> Vec<Box<dyn Rule>> {
	vec![
		Box::new(imports::WrappedImports),
		Box::new(payloads::InsertPayloads),
		Box::new(imports::IconImports),
		Box::new(hooks::StateHooks),
		Box::new(pages::PageComponents::default()),
		Box::new(redirects::RedirectPages::default()),
	]
}

fn collect_diagnostics(ctx: &AnalysisContext) -> Vec<Diagnostic> {
	let mut rules = all_rules();
	let mut diagnostics = Vec::new();

	syntax::walk(&ctx.program, &mut |event| {
		for rule in &mut rules {
			rule.collect(&event, ctx, &mut diagnostics);
		}
	});

	for rule in &mut rules {
		rule.finalize(ctx, &mut diagnostics);
	}

	diagnostics.sort_by(|a, b| a.line.cmp(&b.line).then(a.meta.id.cmp(b.meta.id)));

	diagnostics
}

fn fix_text(path: &Path, original: &str) -> (String, usize) {
	let mut text = original.to_owned();
	let mut applied_count = 0_usize;

	for _ in 0..MAX_FIX_PASSES {
		let Some(ctx) = shared::analysis_context_from_text(path, text.clone()) else {
			break;
		};
		let diagnostics = collect_diagnostics(&ctx);
		let mut set = EditSet::default();

		for diagnostic in &diagnostics {
			if let Some(fix) = &diagnostic.fix {
				set.add_fix(fix);
			}
		}

		if set.is_empty() {
			break;
		}

		// A bad edit set drops this pass, never the file.
		let Ok(rewritten) = set.apply(&text) else {
			break;
		};

		if rewritten == text {
			break;
		}

		applied_count += set.len();
		text = rewritten;
	}

	(text, applied_count)
}

fn resolve_files(requested_files: &[PathBuf]) -> Result<Vec<PathBuf>> {
	if !requested_files.is_empty() {
		return Ok(requested_files
			.iter()
			.filter(|file| has_source_extension(file))
			.cloned()
			.collect());
	}

	git_ls_source_files()
}

fn has_source_extension(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| matches!(ext, "ts" | "tsx" | "jsx"))
}

fn git_ls_source_files() -> Result<Vec<PathBuf>> {
	let output = Command::new("git")
		.args(["ls-files", "*.ts", "*.tsx", "*.jsx"])
		.output()
		.map_err(|err| eyre::eyre!("Failed to run git ls-files: {err}."))?;

	if !output.status.success() {
		return Err(eyre::eyre!("git ls-files failed with status {}.", output.status));
	}

	let stdout = String::from_utf8(output.stdout)?;
	let mut files = Vec::new();

	for line in stdout.lines() {
		if !line.is_empty() {
			files.push(PathBuf::from(line));
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_walk_feeds_every_rule() {
		let text = "import { Home } from \"lucide-react\";\nimport { Inter } from \"next/font/google\";\n\nexport default function Home2() {\n\tconst [open, setOpen] = useState<boolean>(false);\n\tdb.insert({ id: 1 });\n\treturn <Home />;\n}\n";
		let ctx = shared::analysis_context_from_text(Path::new("app/deals/page.tsx"), text.to_owned())
			.expect("context");
		let diagnostics = collect_diagnostics(&ctx);
		let rules = diagnostics.iter().map(|diagnostic| diagnostic.meta.id).collect::<Vec<_>>();

		assert!(rules.contains(&"TSX-STYLE-ICON-001"));
		assert!(rules.contains(&"TSX-STYLE-IMPORT-001"));
		assert!(rules.contains(&"TSX-STYLE-HOOK-001"));
		assert!(rules.contains(&"TSX-STYLE-DB-001"));
		assert!(rules.contains(&"TSX-STYLE-PAGE-001"));
	}

	#[test]
	fn rerunning_a_file_yields_identical_diagnostics() {
		let text = "import { Home } from \"lucide-react\";\n\nconst [a] = useState<number>(1);\n";
		let path = Path::new("app/view.tsx");
		let first = collect_diagnostics(
			&shared::analysis_context_from_text(path, text.to_owned()).expect("context"),
		);
		let second = collect_diagnostics(
			&shared::analysis_context_from_text(path, text.to_owned()).expect("context"),
		);
		let format = |diagnostics: &[Diagnostic]| {
			diagnostics.iter().map(Diagnostic::format).collect::<Vec<_>>()
		};

		assert_eq!(format(&first), format(&second));
	}

	#[test]
	fn fix_passes_converge_to_a_clean_file() {
		let text = "import { Home } from \"lucide-react\";\n\nexport default function Settings() {\n\treturn <Home />;\n}\n";
		let (fixed, applied) = fix_text(Path::new("app/settings/page.tsx"), text);

		assert!(applied >= 2);
		assert!(fixed.contains("import { HomeIcon } from \"lucide-react\";"));
		assert!(fixed.contains("import type { NextPage } from \"next\";"));
		assert!(fixed.contains("const SettingsPage: NextPage = () => {"));
		assert!(fixed.contains("export default SettingsPage;"));
		assert!(fixed.contains("<HomeIcon />"));

		let ctx = shared::analysis_context_from_text(Path::new("app/settings/page.tsx"), fixed)
			.expect("context");

		assert!(collect_diagnostics(&ctx).is_empty());
	}

	#[test]
	fn fixing_needs_multiple_passes_for_layered_violations() {
		let text = "import type { NextPage } from \"next\";\n\nlet Page: NextPage = () => {\n\treturn <x />;\n};\n\nexport default Page;\n";
		let (fixed, _applied) = fix_text(Path::new("app/deals/page.tsx"), text);

		assert!(fixed.contains("const DealsPage: NextPage = () => {"));
		assert!(fixed.contains("export default DealsPage;"));
		assert!(!fixed.contains("let "));

		let ctx = shared::analysis_context_from_text(Path::new("app/deals/page.tsx"), fixed)
			.expect("context");

		assert!(collect_diagnostics(&ctx).is_empty());
	}

	#[test]
	fn unfixable_diagnostics_survive_fixing() {
		let text = "import { ConvexHttpClient } from \"convex/browser\";\n\nconst client = db.insert({ id: 1 });\n";
		let path = Path::new("app/actions.ts");
		let (fixed, applied) = fix_text(path, text);

		assert_eq!(applied, 0);
		assert_eq!(fixed, text);

		let ctx = shared::analysis_context_from_text(path, fixed).expect("context");
		let diagnostics = collect_diagnostics(&ctx);

		assert_eq!(diagnostics.len(), 2);
		assert!(diagnostics.iter().all(|diagnostic| diagnostic.fix.is_none()));
	}

	#[test]
	fn source_extension_filter_keeps_tsx_family_only() {
		assert!(has_source_extension(Path::new("app/page.tsx")));
		assert!(has_source_extension(Path::new("lib/db.ts")));
		assert!(has_source_extension(Path::new("legacy/page.jsx")));
		assert!(!has_source_extension(Path::new("README.md")));
		assert!(!has_source_extension(Path::new("styles/site.css")));
	}
}
