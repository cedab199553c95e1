use std::{
	fs,
	path::PathBuf,
	process::Command,
	time::{SystemTime, UNIX_EPOCH},
};

fn create_temp_project_root() -> PathBuf {
	let stamp = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock.").as_nanos();
	let root = std::env::temp_dir().join(format!("tstyle-page-fix-{stamp}"));
	let _ = fs::remove_dir_all(&root);

	fs::create_dir_all(root.join("app/blog-posts")).expect("Create route dir.");
	fs::write(root.join(".gitignore"), "/node_modules\n").expect("Write gitignore.");

	root
}

#[test]
fn default_function_page_is_rewritten_to_the_canonical_pattern() {
	let temp_dir = create_temp_project_root();
	let source = r#"export default function Home() {
	return <x />;
}
"#;

	fs::write(temp_dir.join("app/blog-posts/page.tsx"), source).expect("write page");

	let output =
		Command::new("git").current_dir(&temp_dir).args(["init"]).output().expect("git init");

	assert!(output.status.success());

	let output = Command::new("git")
		.current_dir(&temp_dir)
		.args(["add", "app/blog-posts/page.tsx"])
		.output()
		.expect("git add");

	assert!(output.status.success());

	let output = Command::new(env!("CARGO_BIN_EXE_tstyle"))
		.current_dir(&temp_dir)
		.arg("fix")
		.output()
		.expect("run tstyle");

	assert!(
		output.status.success(),
		"expected tstyle fix to succeed, stderr: {}",
		String::from_utf8_lossy(&output.stderr)
	);

	let rewritten =
		fs::read_to_string(temp_dir.join("app/blog-posts/page.tsx")).expect("read page");

	assert!(rewritten.contains("import type { NextPage } from \"next\";"));
	assert!(rewritten.contains("const BlogPostsPage: NextPage = () => {"));
	assert!(rewritten.contains("export default BlogPostsPage;"));
	assert!(!rewritten.contains("export default function"));

	// A second fix run must be a no-op.
	let output = Command::new(env!("CARGO_BIN_EXE_tstyle"))
		.current_dir(&temp_dir)
		.arg("fix")
		.output()
		.expect("run tstyle");

	assert!(output.status.success());

	let stdout = String::from_utf8_lossy(&output.stdout);

	assert!(stdout.contains("Applied 0 fix(es)."));
	assert_eq!(
		fs::read_to_string(temp_dir.join("app/blog-posts/page.tsx")).expect("read page"),
		rewritten
	);
}
