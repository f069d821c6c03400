use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::io;

/// Reads a corpus file and returns one document per line.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/emails.txt` + `"bin"` → `data/emails.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_the_extension() {
		let output = build_output_path("data/emails.txt", "bin").unwrap();
		assert_eq!(output, PathBuf::from("data/emails.bin"));
	}

	#[test]
	fn output_path_without_filename_is_rejected() {
		assert!(build_output_path("..", "bin").is_err());
	}
}
