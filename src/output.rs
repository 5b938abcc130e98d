use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

pub(crate) const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// Where step outputs go: the runner's output file, or workflow commands on
/// stdout for runners that predate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputTarget {
    File(PathBuf),
    Legacy,
}

impl OutputTarget {
    pub(crate) fn from_env() -> Self {
        Self::from_var(std::env::var_os(GITHUB_OUTPUT))
    }

    fn from_var(value: Option<OsString>) -> Self {
        match value {
            Some(path) if !path.is_empty() => OutputTarget::File(PathBuf::from(path)),
            _ => OutputTarget::Legacy,
        }
    }

    /// Writes every pair. The output file must already exist: the runner
    /// creates it, and a missing one means we are not where we think we are.
    pub(crate) fn set_outputs(&self, outputs: &[(&str, String)]) -> io::Result<()> {
        match self {
            OutputTarget::File(path) => {
                let mut f = OpenOptions::new().append(true).open(path)?;
                write_file_lines(&mut f, outputs)
            }
            OutputTarget::Legacy => write_legacy_lines(&mut io::stdout().lock(), outputs),
        }
    }
}

fn write_file_lines<W: Write>(w: &mut W, outputs: &[(&str, String)]) -> io::Result<()> {
    for (key, value) in outputs {
        writeln!(w, "{key}={value}")?;
    }
    w.flush()
}

fn write_legacy_lines<W: Write>(w: &mut W, outputs: &[(&str, String)]) -> io::Result<()> {
    for (key, value) in outputs {
        writeln!(w, "::set-output name={key}::{value}")?;
    }
    w.flush()
}
