use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::TriageError;

#[derive(Debug, Clone)]
pub struct ClassifierRequest {
    pub input: PathBuf,
    pub database: PathBuf,
    pub threads: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifierOutput {
    pub output: PathBuf,
    pub report: PathBuf,
}

impl ClassifierOutput {
    pub fn for_input(input: &Path) -> Self {
        let stem = fasta_stem(input);
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        Self {
            output: dir.join(format!("{stem}_kraken2.out")),
            report: dir.join(format!("{stem}_kraken2.report")),
        }
    }

    pub fn remove(&self) -> Result<(), TriageError> {
        for path in [&self.output, &self.report] {
            if path.exists() {
                fs::remove_file(path).map_err(|err| {
                    TriageError::Filesystem(format!("remove {}: {err}", path.display()))
                })?;
            }
        }
        Ok(())
    }
}

pub trait ClassifierClient {
    fn classify(&self, request: &ClassifierRequest) -> Result<ClassifierOutput, TriageError>;
    fn tool_version(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct Kraken2Client {
    executable: Option<PathBuf>,
}

impl Kraken2Client {
    pub fn new() -> Self {
        Self {
            executable: find_in_path("kraken2"),
        }
    }

    pub fn with_executable(executable: PathBuf) -> Self {
        Self {
            executable: Some(executable),
        }
    }

    fn require_executable(&self) -> Result<&PathBuf, TriageError> {
        self.executable
            .as_ref()
            .ok_or_else(|| TriageError::MissingTool("kraken2".to_string()))
    }

    fn command_args(request: &ClassifierRequest, output: &ClassifierOutput) -> Vec<String> {
        vec![
            "--db".to_string(),
            request.database.to_string_lossy().to_string(),
            "--threads".to_string(),
            request.threads.to_string(),
            "--output".to_string(),
            output.output.to_string_lossy().to_string(),
            "--report".to_string(),
            output.report.to_string_lossy().to_string(),
            "--confidence".to_string(),
            request.confidence.to_string(),
            "--use-names".to_string(),
            request.input.to_string_lossy().to_string(),
        ]
    }
}

impl Default for Kraken2Client {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierClient for Kraken2Client {
    fn classify(&self, request: &ClassifierRequest) -> Result<ClassifierOutput, TriageError> {
        let program = self.require_executable()?;
        let output = ClassifierOutput::for_input(&request.input);
        let args = Self::command_args(request, &output);
        info!(
            database = %request.database.display(),
            confidence = request.confidence,
            threads = request.threads,
            "running kraken2"
        );
        debug!(program = %program.display(), ?args, "kraken2 command");

        let result = Command::new(program).args(&args).output();
        let failure = match result {
            Ok(result) if result.status.success() => return Ok(output),
            Ok(result) => {
                let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
                if stderr.trim().is_empty() {
                    format!("{} exited with {}", program.display(), result.status)
                } else {
                    stderr
                }
            }
            Err(err) => err.to_string(),
        };

        if let Err(err) = output.remove() {
            warn!(error = %err, "failed to remove partial kraken2 output");
        }
        Err(TriageError::ClassifierFailed(failure))
    }

    fn tool_version(&self) -> Option<String> {
        let program = self.executable.as_ref()?;
        let output = Command::new(program).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
    }
}

fn fasta_stem(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "contigs".to_string());
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    for ext in [".fasta", ".fna", ".fa"] {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    name.to_string()
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_in_dirs(name, std::env::split_paths(&path_var))
}

fn find_in_dirs<I>(name: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .flat_map(|dir| [dir.join(name), dir.join(format!("{name}.exe"))])
        .find(|candidate| candidate.is_file())
}
