use vergen::{BuildBuilder, Emitter};
use vergen_git2::Git2Builder;

// `lumon --version` reports the git describe string and build date.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_date(true).build()?;
    let mut emitter = Emitter::default();
    emitter.add_instructions(&build)?;

    // Source tarballs from crates.io carry no git metadata.
    match Git2Builder::default().describe(true, true, None).sha(true).build() {
        Ok(git2) => {
            emitter.add_instructions(&git2)?;
        }
        Err(_) => {
            println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
        }
    }

    emitter.emit()?;
    Ok(())
}
