use std::error::Error;

use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn Error>> {
	let mut emitter = Emitter::default();
	let cargo = CargoBuilder::default().target_triple(true).build()?;

	emitter.add_instructions(&cargo)?;

	// Fall back when building outside a git checkout, e.g. from a crates.io tarball.
	if emitter.add_instructions(&GitclBuilder::default().sha(true).build()?).is_err() {
		println!("cargo:rustc-env=VERGEN_GIT_SHA=crates.io");
	}

	emitter.emit()?;

	Ok(())
}
