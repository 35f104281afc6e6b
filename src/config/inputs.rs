//! Input list handling.
//!
//! Three plain-text files feed a scan: hosts, users, and passwords. One
//! entry per line, `#` starts a comment. Absent files are synthesized
//! with a commented placeholder and a few common fallback values so a
//! first run produces something editable rather than an error.

use crate::error::{ConfigError, ConfigResult};
use std::fs;
use std::path::{Path, PathBuf};

const HOSTS_TEMPLATE: &str = "# Add IP addresses, hostnames, or CIDR ranges, one per line\n";

const USERS_TEMPLATE: &str = "\
# Add usernames, one per line
admin
mail
test
user
";

const PASSWORDS_TEMPLATE: &str = "\
# Add passwords, one per line
password
123456
admin
test
";

/// Locations of the three input lists.
#[derive(Debug, Clone)]
pub struct InputFiles {
    pub hosts: PathBuf,
    pub users: PathBuf,
    pub passwords: PathBuf,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            hosts: PathBuf::from("hosts.txt"),
            users: PathBuf::from("users.txt"),
            passwords: PathBuf::from("passwords.txt"),
        }
    }
}

/// The loaded input lists.
#[derive(Debug, Clone)]
pub struct InputSet {
    pub hosts: Vec<String>,
    pub users: Vec<String>,
    pub passwords: Vec<String>,
}

/// Synthesize any missing input file with its template.
pub fn ensure_input_files(files: &InputFiles) -> ConfigResult<()> {
    for (path, template) in [
        (&files.hosts, HOSTS_TEMPLATE),
        (&files.users, USERS_TEMPLATE),
        (&files.passwords, PASSWORDS_TEMPLATE),
    ] {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "input file missing, creating template");
            fs::write(path, template).map_err(|e| ConfigError::WriteFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        }
    }
    Ok(())
}

/// Load all three lists.
pub fn load_inputs(files: &InputFiles) -> ConfigResult<InputSet> {
    let inputs = InputSet {
        hosts: load_list(&files.hosts)?,
        users: load_list(&files.users)?,
        passwords: load_list(&files.passwords)?,
    };

    tracing::info!(
        hosts = inputs.hosts.len(),
        users = inputs.users.len(),
        passwords = inputs.passwords.len(),
        "loaded input lists"
    );

    Ok(inputs)
}

fn load_list(path: &Path) -> ConfigResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files_in(dir: &tempfile::TempDir) -> InputFiles {
        InputFiles {
            hosts: dir.path().join("hosts.txt"),
            users: dir.path().join("users.txt"),
            passwords: dir.path().join("passwords.txt"),
        }
    }

    #[test]
    fn test_synthesizes_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(&dir);

        ensure_input_files(&files).unwrap();

        assert!(files.hosts.exists());
        let inputs = load_inputs(&files).unwrap();
        // Hosts template is comment-only; credential templates carry fallbacks.
        assert!(inputs.hosts.is_empty());
        assert_eq!(inputs.users, vec!["admin", "mail", "test", "user"]);
        assert_eq!(inputs.passwords.len(), 4);
    }

    #[test]
    fn test_comments_and_blanks_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(&dir);
        fs::write(
            &files.hosts,
            "# comment\n\nmail.example.com\n  192.0.2.7  \n# trailing\n",
        )
        .unwrap();
        fs::write(&files.users, "admin\n").unwrap();
        fs::write(&files.passwords, "secret\n").unwrap();

        let inputs = load_inputs(&files).unwrap();
        assert_eq!(inputs.hosts, vec!["mail.example.com", "192.0.2.7"]);
    }

    #[test]
    fn test_existing_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(&dir);
        fs::write(&files.hosts, "mail.example.com\n").unwrap();

        ensure_input_files(&files).unwrap();

        let content = fs::read_to_string(&files.hosts).unwrap();
        assert_eq!(content, "mail.example.com\n");
    }

    #[test]
    fn test_unreadable_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = files_in(&dir);
        files.users = dir.path().join("missing").join("users.txt");
        fs::write(&files.hosts, "h\n").unwrap();
        fs::write(&files.passwords, "p\n").unwrap();

        assert!(matches!(
            load_inputs(&files),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
