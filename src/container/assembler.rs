// Sat Jan 17 2026 - Alex

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;
use thiserror::Error;

/// File name the rendered prologue tells the assembler to create.
pub const OUTPUT_FILE: &str = "code_out.bin";
const SOURCE_FILE: &str = "code.asm";

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Failed to run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },

    #[error("Assembler workspace error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns rendered block source back into machine code.
pub trait Assembler {
    fn assemble(&self, source: &str) -> Result<Vec<u8>, AssembleError>;
}

/// Runs the external `armips` assembler in a scratch directory.
#[derive(Debug, Clone)]
pub struct ArmipsAssembler {
    program: PathBuf,
}

impl ArmipsAssembler {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl Default for ArmipsAssembler {
    fn default() -> Self {
        Self::new("armips")
    }
}

impl Assembler for ArmipsAssembler {
    fn assemble(&self, source: &str) -> Result<Vec<u8>, AssembleError> {
        let workspace = TempDir::new()?;
        fs::write(workspace.path().join(SOURCE_FILE), source)?;

        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .arg(SOURCE_FILE)
            .current_dir(workspace.path())
            .output()
            .map_err(|source| AssembleError::Launch {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(AssembleError::Failed {
                program,
                status: output.status.to_string(),
                output: text.trim().to_string(),
            });
        }

        Ok(fs::read(workspace.path().join(OUTPUT_FILE))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_a_launch_error() {
        let assembler = ArmipsAssembler::new("/nonexistent/armips-for-tests");
        let err = assembler.assemble(".close").unwrap_err();
        assert!(matches!(err, AssembleError::Launch { .. }));
        assert!(err.to_string().contains("armips-for-tests"));
    }

    #[test]
    fn test_default_program() {
        assert_eq!(ArmipsAssembler::default().program(), std::path::Path::new("armips"));
    }
}
