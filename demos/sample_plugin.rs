//! Minimal plugin: lists every collected file in `<output_base>/goir-files.txt`.

use std::fs;
use std::process::ExitCode;

use goir::sdk::{output_path, Plugin};

const LISTING: &str = "goir-files.txt";

fn main() -> ExitCode {
    Plugin::new("goir-sample-plugin").init(|data| {
        let names: Vec<&str> = data
            .packages
            .iter()
            .flat_map(|pkg| pkg.files.iter().map(|f| f.name.as_str()))
            .collect();
        fs::create_dir_all(&data.output_base)?;
        fs::write(output_path(data, LISTING), names.join("\n"))
    })
}
