use std::fs;
use std::io::{self, Read, Write};

pub mod check;
pub mod run;

/// Load program text from `--file` (`-` meaning stdin) or from the
/// concatenated positional arguments. Returns the exit code on failure.
pub fn load_source(program: &str, file: Option<String>, code: Vec<String>) -> Result<String, i32> {
    match file {
        Some(path) if path == "-" => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source).map_err(|e| {
                eprintln!("{program}: failed reading program from stdin: {e}");
                let _ = io::stderr().flush();
                1
            })?;
            Ok(source)
        }
        Some(path) => fs::read_to_string(&path).map_err(|e| {
            eprintln!("{program}: failed to read program file {path} as UTF-8: {e}");
            let _ = io::stderr().flush();
            1
        }),
        None => Ok(code.join("")),
    }
}
