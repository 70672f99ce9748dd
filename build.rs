use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// Ship src/config.toml next to the built executable so the bot finds
// its connection settings at runtime.
fn main() {
    let manifest_dir = match env::var_os("CARGO_MANIFEST_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => return,
    };
    let out_dir = match env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => return,
    };

    // OUT_DIR is three levels below the directory holding the binary.
    let exe_dir = out_dir
        .parent()
        .and_then(Path::parent)
        .and_then(Path::parent);
    let exe_dir = match exe_dir {
        Some(dir) => dir,
        None => return,
    };

    let source = manifest_dir.join("src").join("config.toml");
    let destination = exe_dir.join("config.toml");
    match fs::copy(&source, &destination) {
        Ok(_) => println!("Copied {:?} to {:?}", source, destination),
        Err(e) => println!("Failed to copy {:?} to {:?}: {:?}", source, destination, e),
    }
}
