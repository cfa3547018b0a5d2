use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(next_help_heading = "INPUT OPTIONS")]
pub struct InputOptions {
    /// Where to search for the raw input files
    #[clap(long, default_value = ".", value_parser = existing_directory)]
    pub input_directory: PathBuf,

    /// Pattern used to select input files under the input directory
    #[clap(long, default_value = "*fastq.gz")]
    pub input_pattern: String,
}

fn existing_directory(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(format!("{value} is not an existing directory"))
    }
}
