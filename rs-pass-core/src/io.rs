use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Folder holding `lexicon.json`, `templates.json` and `mutators.json`.
pub const DEFAULT_DATA_FOLDER: &str = "./data";

/// Extension of the compiled lexicon written next to its JSON source.
pub const CACHE_EXTENSION: &str = "bin";

/// Reads a whole data file into a `String`. The error names the file.
pub(crate) fn read_to_string<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let filename = filename.as_ref();
	fs::read_to_string(filename)
		.map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", filename.display())))
}

/// Where the compiled form of a lexicon lives: same folder and stem as the
/// JSON source, `.bin` extension.
pub(crate) fn cache_path<P: AsRef<Path>>(source: P) -> io::Result<PathBuf> {
	let source = source.as_ref();
	match source.file_name() {
		Some(_) => Ok(source.with_extension(CACHE_EXTENSION)),
		None => Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("{}: lexicon path has no file name", source.display()),
		)),
	}
}

/// Resolves the data folder given on a command line.
///
/// No argument means [`DEFAULT_DATA_FOLDER`]. `"."` is expanded to the working
/// directory so log lines show where the data came from.
pub fn data_folder(arg: Option<&str>) -> PathBuf {
	match arg {
		None => PathBuf::from(DEFAULT_DATA_FOLDER),
		Some("." | "./") => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
		Some(folder) => PathBuf::from(folder),
	}
}
